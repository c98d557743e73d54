use anyhow::Result;
use layerboard::{DiagramId, Editor, EditorConfig, EditorError, Point, Selection, ZoomDirection};

fn editor() -> Editor {
    Editor::new(EditorConfig {
        node_width: 160.0,
        node_height: 80.0,
        min_zoom: 0.1,
        max_zoom: 5.0,
        zoom_step: 1.05,
        screen_width: 1280.0,
        screen_height: 800.0,
    })
}

#[test]
fn connect_drag_creates_one_edge_between_facing_borders() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let a = editor.add_node(&root, Point::new(100.0, 100.0), "A")?;
    let b = editor.add_node(&root, Point::new(300.0, 100.0), "B")?;

    editor.start_connecting(&a, Point::new(100.0, 100.0))?;
    editor.update_connecting(Point::new(290.0, 105.0));
    let edge = editor.finish_connecting(Some(&b)).expect("edge should be created");

    let diagram = editor.store().current()?;
    assert_eq!(diagram.edge_count(), 1);
    let stored = diagram.edge(edge.as_str()).expect("edge stored");
    assert_eq!((&stored.from, &stored.to), (&a, &b));
    assert_eq!(stored.label, "");
    assert!(editor.store().pending().is_none());

    let (start, end) = diagram.edge_endpoints(edge.as_str()).expect("endpoints");
    assert_eq!(start, Point::new(180.0, 100.0));
    assert_eq!(end, Point::new(220.0, 100.0));
    Ok(())
}

#[test]
fn finishing_over_empty_canvas_creates_nothing() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let a = editor.add_node(&root, Point::ORIGIN, "A")?;

    editor.start_connecting(&a, Point::ORIGIN)?;
    editor.update_connecting(Point::new(600.0, 600.0));
    assert!(editor.finish_connecting(None).is_none());
    assert_eq!(editor.store().current()?.edge_count(), 0);
    assert!(!editor.store().is_connecting());
    Ok(())
}

#[test]
fn deleting_a_node_leaves_only_valid_edges() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let ids: Vec<_> = (0..4)
        .map(|i| editor.add_node(&root, Point::new(i as f32 * 200.0, 0.0), format!("N{i}")))
        .collect::<Result<_, _>>()?;

    for (from, to) in [(0, 1), (1, 2), (2, 3), (3, 0), (1, 3)] {
        editor.add_edge(&ids[from], &ids[to])?;
    }
    editor.delete_node(&ids[1])?;

    let diagram = editor.store().current()?;
    assert_eq!(diagram.edge_count(), 2);
    assert!(diagram.dangling_edges().is_empty());
    assert!(diagram.edges().iter().all(|edge| !edge.touches(ids[1].as_str())));
    Ok(())
}

#[test]
fn expanding_twice_reuses_the_child_diagram() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let node = editor.add_node(&root, Point::ORIGIN, "Billing")?;

    let first = editor.expand_node(&node)?;
    editor.add_node(&first, Point::new(10.0, 10.0), "Invoice")?;
    editor.collapse();
    let second = editor.expand_node(&node)?;

    assert_eq!(first, second);
    assert_eq!(editor.store().diagram_count(), 2);
    assert_eq!(editor.store().current()?.node_count(), 1);

    let crumbs = editor.breadcrumb();
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[1].name.as_deref(), Some("Billing"));
    Ok(())
}

#[test]
fn zoom_toward_cursor_keeps_world_point_fixed() -> Result<()> {
    let mut editor = editor();
    editor.pan_by(Point::new(-140.0, 35.0))?;
    let cursor = Point::new(512.0, 384.0);

    for _ in 0..10 {
        let before = editor.screen_to_world(cursor)?;
        editor.zoom_toward_cursor(cursor, ZoomDirection::In)?;
        let after = editor.screen_to_world(cursor)?;
        assert!((before.x - after.x).abs() < 1e-2);
        assert!((before.y - after.y).abs() < 1e-2);
    }

    assert_eq!(editor.set_zoom(0.01)?, 0.1);
    Ok(())
}

#[test]
fn selection_is_either_nodes_or_an_edge() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let a = editor.add_node(&root, Point::ORIGIN, "A")?;
    let b = editor.add_node(&root, Point::new(300.0, 0.0), "B")?;
    let edge = editor.add_edge(&a, &b)?;

    editor.set_selected_nodes(vec![a.clone(), b.clone()])?;
    editor.set_selected_edge(Some(&edge))?;
    assert_eq!(editor.store().selection(), &Selection::Edge(edge.clone()));

    editor.set_selected_nodes(vec![a.clone()])?;
    assert!(editor.store().selection().edge_id().is_none());
    assert!(editor.store().selection().contains_node(a.as_str()));
    Ok(())
}

#[test]
fn failed_import_keeps_the_previous_diagram() -> Result<()> {
    let mut editor = editor();
    let root = DiagramId::root();
    let a = editor.add_node(&root, Point::ORIGIN, "A")?;
    let b = editor.add_node(&root, Point::new(300.0, 0.0), "B")?;
    editor.add_edge(&a, &b)?;
    let before = editor.export_document()?;

    for text in [
        "definitely not json",
        r#"{ "nodes": 1, "edges": [] }"#,
        r#"{ "nodes": [], "edges": [ { "id": "e", "from": "x", "to": "y" } ] }"#,
    ] {
        let err = editor.import_document(text).unwrap_err();
        assert!(matches!(err, EditorError::InvalidFormat(_)));
        assert_eq!(editor.export_document()?, before);
    }
    Ok(())
}

#[test]
fn exported_document_imports_into_a_fresh_editor() -> Result<()> {
    let mut source = editor();
    let root = DiagramId::root();
    let a = source.add_node(&root, Point::new(-50.0, 20.0), "A")?;
    let b = source.add_node(&root, Point::new(250.0, 20.0), "B")?;
    let edge = source.add_edge(&a, &b)?;
    source.set_edge_label(&edge, "depends on")?;
    source.set_edge_bidirectional(&edge, true)?;

    let json = source.export_document()?.to_json()?;
    let mut target = editor();
    target.import_document(&json)?;

    assert_eq!(target.export_document()?, source.export_document()?);
    Ok(())
}

#[test]
fn zoom_out_from_the_minimum_stays_clamped() -> Result<()> {
    let mut editor = editor();
    editor.set_zoom(0.1)?;
    let viewport = editor.zoom_out()?;
    assert_eq!(viewport.zoom, 0.1);
    Ok(())
}
