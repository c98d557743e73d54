use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::*;

/// Arguments for running the layerboard editor API
#[derive(Debug, Clone, Parser)]
#[command(name = "layerboard serve", about = "Start the layerboard editor API server.")]
pub struct ServeArgs {
    /// Document to load into the root diagram on startup.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5151)]
    pub port: u16,

    /// Directory with a built web UI to serve next to the API.
    #[arg(long = "ui-dir")]
    pub ui_dir: Option<PathBuf>,

    /// JSON file with editor settings.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub struct ServeState {
    editor: RwLock<Editor>,
}

impl ServeState {
    pub fn new(editor: Editor) -> Arc<Self> {
        Arc::new(Self {
            editor: RwLock::new(editor),
        })
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Response of every mutating route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Applied {
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    snapshot: Snapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewNode {
    #[serde(default)]
    diagram: Option<DiagramId>,
    /// World position; the view centre when absent.
    #[serde(default)]
    position: Option<Point>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodePatch {
    #[serde(default)]
    position: Option<Point>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    style: Option<NodeStyle>,
    /// An empty string clears the description.
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NewEdge {
    from: NodeId,
    to: NodeId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgePatch {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    style: Option<EdgeStyle>,
    #[serde(default)]
    bidirectional: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StartConnection {
    from: NodeId,
    cursor: Point,
}

#[derive(Debug, Deserialize)]
struct CursorUpdate {
    cursor: Point,
}

#[derive(Debug, Default, Deserialize)]
struct FinishConnection {
    #[serde(default)]
    to: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
enum SelectionRequest {
    Nodes { ids: Vec<NodeId> },
    Edge { id: EdgeId },
    Marquee { from: Point, to: Point },
    All,
    None,
}

#[derive(Debug, Deserialize)]
struct ZoomRequest {
    #[serde(default)]
    zoom: Option<f32>,
    #[serde(default)]
    direction: Option<ZoomDirection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WheelRequest {
    cursor: Point,
    delta_y: f32,
}

#[derive(Debug, Deserialize)]
struct PanRequest {
    delta: Point,
}

pub fn router(state: Arc<ServeState>) -> Router {
    Router::new()
        .route("/api/diagram", get(get_diagram))
        .route("/api/document", get(get_document).put(put_document))
        .route("/api/nodes", post(post_node))
        .route("/api/nodes/:id", axum::routing::patch(patch_node).delete(delete_node))
        .route("/api/nodes/:id/expand", post(expand_node))
        .route("/api/edges", post(post_edge))
        .route("/api/edges/:id", axum::routing::patch(patch_edge).delete(delete_edge))
        .route("/api/edges/:id/reverse", post(reverse_edge))
        .route("/api/connection/start", post(start_connection))
        .route("/api/connection/update", post(update_connection))
        .route("/api/connection/finish", post(finish_connection))
        .route("/api/connection/cancel", post(cancel_connection))
        .route("/api/navigation/collapse", post(collapse))
        .route("/api/navigation/:id", put(navigate))
        .route("/api/selection", put(put_selection).delete(delete_selection))
        .route("/api/viewport/zoom", post(zoom))
        .route("/api/viewport/wheel", post(wheel))
        .route("/api/viewport/pan", post(pan))
        .route("/api/viewport/reset", post(reset_viewport))
        .route("/api/viewport/fit", post(fit_viewport))
        .route("/api/viewport/screen", post(resize_screen))
        .with_state(state)
}

/// Serves files from `root` for every path the API does not route. Unknown
/// paths get `index.html` so client-side routes load the UI.
pub fn with_static_ui(app: Router, root: PathBuf) -> Router {
    let index = root.join("index.html");
    if !index.is_file() {
        warn!(path = %index.display(), "UI directory has no index.html");
    }
    let static_dir = ServeDir::new(root)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));
    app.fallback_service(static_dir)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = EditorConfig::load_or_default(args.config.as_deref())?;
    let mut editor = Editor::new(config);

    if let Some(input) = &args.input {
        let contents = fs::read_to_string(input)
            .with_context(|| format!("failed to read '{}'", input.display()))?;
        editor
            .import_document(&contents)
            .with_context(|| format!("failed to load '{}'", input.display()))?;
    }

    let mut app = router(ServeState::new(editor));

    if let Some(root) = args.ui_dir {
        app = with_static_ui(app, root);
    }

    let app = app.layer(CorsLayer::permissive());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {addr}"))?;

    info!(%addr, "editor API listening");
    println!("layerboard server listening on http://{addr}");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("HTTP server error")?;

    info!("editor API stopped");
    Ok(())
}

fn editor_error(err: EditorError) -> (StatusCode, String) {
    let status = match &err {
        EditorError::NotFound { .. } => StatusCode::NOT_FOUND,
        EditorError::InvalidEndpoints { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EditorError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
    };
    if status != StatusCode::NOT_FOUND {
        warn!(error = %err, "rejected command");
    }
    (status, err.to_string())
}

fn applied(editor: &Editor, created: Option<String>) -> ApiResult<Applied> {
    let snapshot = editor.snapshot().map_err(editor_error)?;
    Ok(Json(Applied { created, snapshot }))
}

async fn get_diagram(State(state): State<Arc<ServeState>>) -> ApiResult<Snapshot> {
    let editor = state.editor.read().await;
    editor.snapshot().map(Json).map_err(editor_error)
}

async fn get_document(State(state): State<Arc<ServeState>>) -> ApiResult<ExportDocument> {
    let editor = state.editor.read().await;
    editor.export_document().map(Json).map_err(editor_error)
}

async fn put_document(State(state): State<Arc<ServeState>>, body: String) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.import_document(&body).map_err(editor_error)?;
    applied(&editor, None)
}

async fn post_node(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<NewNode>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    let id = match request.position {
        Some(position) => {
            let diagram = request
                .diagram
                .unwrap_or_else(|| editor.current_id().clone());
            let label = request
                .label
                .unwrap_or_else(|| DEFAULT_NODE_LABEL.to_string());
            editor.add_node(&diagram, position, label)
        }
        None => editor.add_node_at_view_center(request.label),
    }
    .map_err(editor_error)?;
    applied(&editor, Some(id.to_string()))
}

async fn patch_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(node_id): AxumPath<String>,
    Json(patch): Json<NodePatch>,
) -> ApiResult<Applied> {
    let node_id = NodeId::from(node_id);
    let mut editor = state.editor.write().await;

    // Probe first so a bad id leaves the node untouched.
    if !editor
        .store()
        .current()
        .map_err(editor_error)?
        .contains_node(node_id.as_str())
    {
        return Err(editor_error(EditorError::not_found(EntityKind::Node, &node_id)));
    }

    if let Some(position) = patch.position {
        editor.move_node(&node_id, position).map_err(editor_error)?;
    }
    if let Some(label) = patch.label {
        editor.rename_node(&node_id, label).map_err(editor_error)?;
    }
    if let Some(size) = patch.size {
        editor.resize_node(&node_id, size).map_err(editor_error)?;
    }
    if let Some(style) = &patch.style {
        editor.style_node(&node_id, style).map_err(editor_error)?;
    }
    if let Some(description) = patch.description {
        editor
            .describe_node(&node_id, Some(description))
            .map_err(editor_error)?;
    }
    if let Some(tags) = patch.tags {
        editor.set_node_tags(&node_id, tags).map_err(editor_error)?;
    }
    applied(&editor, None)
}

async fn delete_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(node_id): AxumPath<String>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .delete_node(&NodeId::from(node_id))
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn expand_node(
    State(state): State<Arc<ServeState>>,
    AxumPath(node_id): AxumPath<String>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    let child = editor
        .expand_node(&NodeId::from(node_id))
        .map_err(editor_error)?;
    applied(&editor, Some(child.to_string()))
}

async fn post_edge(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<NewEdge>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    let id = editor
        .add_edge(&request.from, &request.to)
        .map_err(editor_error)?;
    applied(&editor, Some(id.to_string()))
}

async fn patch_edge(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
    Json(patch): Json<EdgePatch>,
) -> ApiResult<Applied> {
    let edge_id = EdgeId::from(edge_id);
    let mut editor = state.editor.write().await;

    if !editor
        .store()
        .current()
        .map_err(editor_error)?
        .contains_edge(edge_id.as_str())
    {
        return Err(editor_error(EditorError::not_found(EntityKind::Edge, &edge_id)));
    }

    if let Some(label) = patch.label {
        editor.set_edge_label(&edge_id, label).map_err(editor_error)?;
    }
    if let Some(style) = &patch.style {
        editor.style_edge(&edge_id, style).map_err(editor_error)?;
    }
    if let Some(bidirectional) = patch.bidirectional {
        editor
            .set_edge_bidirectional(&edge_id, bidirectional)
            .map_err(editor_error)?;
    }
    applied(&editor, None)
}

async fn reverse_edge(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .reverse_edge(&EdgeId::from(edge_id))
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn delete_edge(
    State(state): State<Arc<ServeState>>,
    AxumPath(edge_id): AxumPath<String>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .delete_edge(&EdgeId::from(edge_id))
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn start_connection(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<StartConnection>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .start_connecting(&request.from, request.cursor)
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn update_connection(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<CursorUpdate>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.update_connecting(request.cursor);
    applied(&editor, None)
}

async fn finish_connection(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<FinishConnection>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    let created = editor.finish_connecting(request.to.as_ref());
    applied(&editor, created.map(|id| id.to_string()))
}

async fn cancel_connection(State(state): State<Arc<ServeState>>) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.cancel_connecting();
    applied(&editor, None)
}

async fn collapse(State(state): State<Arc<ServeState>>) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.collapse();
    applied(&editor, None)
}

async fn navigate(
    State(state): State<Arc<ServeState>>,
    AxumPath(diagram_id): AxumPath<String>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .navigate_to(&DiagramId::from(diagram_id))
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn put_selection(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    match request {
        SelectionRequest::Nodes { ids } => editor.set_selected_nodes(ids),
        SelectionRequest::Edge { id } => editor.set_selected_edge(Some(&id)),
        SelectionRequest::Marquee { from, to } => editor.select_in_marquee(from, to).map(|_| ()),
        SelectionRequest::All => editor.select_all(),
        SelectionRequest::None => {
            editor.clear_selection();
            Ok(())
        }
    }
    .map_err(editor_error)?;
    applied(&editor, None)
}

async fn delete_selection(State(state): State<Arc<ServeState>>) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.delete_selection().map_err(editor_error)?;
    applied(&editor, None)
}

async fn zoom(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<ZoomRequest>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    match (request.zoom, request.direction) {
        (Some(zoom), _) => editor.set_zoom(zoom).map(|_| ()),
        (None, Some(ZoomDirection::In)) => editor.zoom_in().map(|_| ()),
        (None, Some(ZoomDirection::Out)) => editor.zoom_out().map(|_| ()),
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "expected 'zoom' or 'direction'".to_string(),
            ));
        }
    }
    .map_err(editor_error)?;
    applied(&editor, None)
}

async fn wheel(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<WheelRequest>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor
        .wheel(request.cursor, request.delta_y)
        .map_err(editor_error)?;
    applied(&editor, None)
}

async fn pan(
    State(state): State<Arc<ServeState>>,
    Json(request): Json<PanRequest>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.pan_by(request.delta).map_err(editor_error)?;
    applied(&editor, None)
}

async fn reset_viewport(State(state): State<Arc<ServeState>>) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.reset_zoom().map_err(editor_error)?;
    applied(&editor, None)
}

async fn fit_viewport(State(state): State<Arc<ServeState>>) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.fit_to_view().map_err(editor_error)?;
    applied(&editor, None)
}

async fn resize_screen(
    State(state): State<Arc<ServeState>>,
    Json(size): Json<Size>,
) -> ApiResult<Applied> {
    let mut editor = state.editor.write().await;
    editor.set_screen_size(size);
    applied(&editor, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn app() -> Router {
        router(ServeState::new(Editor::default()))
    }

    async fn add_node(app: &Router, x: f32, y: f32, label: &str) -> String {
        let (status, body) = call(
            app,
            "POST",
            "/api/nodes",
            Some(json!({ "position": { "x": x, "y": y }, "label": label })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["created"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn connection_drag_over_http_creates_an_edge() {
        let app = app();
        let a = add_node(&app, 100.0, 100.0, "A").await;
        let b = add_node(&app, 300.0, 100.0, "B").await;

        let (status, _) = call(
            &app,
            "POST",
            "/api/connection/start",
            Some(json!({ "from": a, "cursor": { "x": 100, "y": 100 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = call(
            &app,
            "POST",
            "/api/connection/update",
            Some(json!({ "cursor": { "x": 250, "y": 110 } })),
        )
        .await;
        assert_eq!(body["snapshot"]["pending"]["source"], json!(a));

        let (_, body) = call(&app, "POST", "/api/connection/finish", Some(json!({ "to": b }))).await;
        assert!(body["created"].is_string());
        let edge = &body["snapshot"]["edges"][0];
        assert_eq!(edge["from"], json!(a));
        assert_eq!(edge["to"], json!(b));
        assert_eq!(edge["start"], json!({ "x": 180.0, "y": 100.0 }));
        assert!(body["snapshot"]["pending"].is_null());
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let app = app();
        let a = add_node(&app, 0.0, 0.0, "A").await;

        let (status, _) = call(&app, "DELETE", "/api/nodes/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "POST", "/api/edges", Some(json!({ "from": a, "to": a }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let request = Request::builder()
            .method("PUT")
            .uri("/api/document")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn expand_and_collapse_move_through_the_hierarchy() {
        let app = app();
        let a = add_node(&app, 0.0, 0.0, "Service").await;

        let (_, body) = call(&app, "POST", &format!("/api/nodes/{a}/expand"), None).await;
        let child = body["created"].as_str().unwrap().to_string();
        assert_eq!(body["snapshot"]["diagram"], json!(child));
        assert_eq!(body["snapshot"]["name"], json!("Service"));
        assert_eq!(body["snapshot"]["breadcrumb"].as_array().unwrap().len(), 2);

        let (_, body) = call(&app, "POST", "/api/navigation/collapse", None).await;
        assert_eq!(body["snapshot"]["diagram"], json!("root"));

        let (status, body) = call(&app, "PUT", &format!("/api/navigation/{child}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["snapshot"]["diagram"], json!(child));
    }

    #[tokio::test]
    async fn zoom_requests_are_clamped() {
        let app = app();
        let (_, body) = call(&app, "POST", "/api/viewport/zoom", Some(json!({ "zoom": 50 }))).await;
        assert_eq!(body["snapshot"]["viewport"]["zoom"], json!(MAX_ZOOM));

        let (status, _) = call(&app, "POST", "/api/viewport/zoom", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, "POST", "/api/viewport/reset", None).await;
        assert_eq!(body["snapshot"]["viewport"]["zoom"], json!(1.0));
    }

    #[tokio::test]
    async fn patch_node_applies_every_field() {
        let app = app();
        let a = add_node(&app, 0.0, 0.0, "A").await;

        let (status, body) = call(
            &app,
            "PATCH",
            &format!("/api/nodes/{a}"),
            Some(json!({
                "position": { "x": 10, "y": 20 },
                "label": "Renamed",
                "description": "owns billing",
                "tags": ["core", "core", ""],
                "style": { "color": "#336699" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let node = &body["snapshot"]["nodes"][0];
        assert_eq!(node["label"], json!("Renamed"));
        assert_eq!(node["position"], json!({ "x": 10.0, "y": 20.0 }));
        assert_eq!(node["description"], json!("owns billing"));
        assert_eq!(node["tags"], json!(["core"]));
        assert_eq!(node["style"]["color"], json!("#336699"));
    }

    #[tokio::test]
    async fn marquee_selection_then_delete() {
        let app = app();
        add_node(&app, 0.0, 0.0, "A").await;
        add_node(&app, 500.0, 0.0, "B").await;

        let (_, body) = call(
            &app,
            "PUT",
            "/api/selection",
            Some(json!({ "mode": "marquee", "from": { "x": -50, "y": -50 }, "to": { "x": 50, "y": 50 } })),
        )
        .await;
        assert_eq!(body["snapshot"]["selection"]["type"], json!("nodes"));

        let (_, body) = call(&app, "DELETE", "/api/selection", None).await;
        let nodes = body["snapshot"]["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["label"], json!("B"));
    }

    async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn ui_dir_serves_files_and_falls_back_to_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<main>layerboard</main>").unwrap();
        fs::write(dir.path().join("app.js"), "console.log('ui');").unwrap();
        let app = with_static_ui(app(), dir.path().to_path_buf());

        let (status, body) = get_text(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<main>layerboard</main>");

        let (status, body) = get_text(&app, "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log('ui');");

        let (status, body) = get_text(&app, "/boards/42/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<main>layerboard</main>");

        let (status, snapshot) = call(&app, "GET", "/api/diagram", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["diagram"], json!("root"));
    }
}
