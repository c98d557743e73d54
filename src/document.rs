//! JSON export/import of a single diagram's nodes and edges.
//!
//! Nested diagrams are not part of the document; importing only replaces the
//! contents of the current diagram.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagram::{Diagram, Edge, EdgeId, EdgeStyle, Node, NodeId, NodeStyle};
use crate::error::{EditorError, Result};
use crate::utils::{sanitize_length, sanitize_point};
use crate::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    pub position: Point,
    /// Absent on import means the configured node size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEdge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default, skip_serializing_if = "EdgeStyle::is_empty")]
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub nodes: Vec<DocumentNode>,
    pub edges: Vec<DocumentEdge>,
}

impl From<&Node> for DocumentNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            position: node.position,
            size: Some(node.size),
            description: node.description.clone(),
            tags: node.tags.clone(),
            style: node.style.clone(),
        }
    }
}

impl From<&Edge> for DocumentEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            label: edge.label.clone(),
            bidirectional: edge.bidirectional,
            style: edge.style.clone(),
        }
    }
}

impl ExportDocument {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram.nodes().map(DocumentNode::from).collect(),
            edges: diagram.edges().iter().map(DocumentEdge::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| EditorError::invalid_format(err.to_string()))
    }

    /// Parses and validates a document.
    ///
    /// Rejects text that is not JSON, a missing or non-array `nodes`/`edges`,
    /// entries that do not deserialize, duplicate ids, self-loops and edges
    /// whose endpoints are not among the nodes.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| EditorError::invalid_format(format!("not valid JSON: {err}")))?;

        let Value::Object(mut fields) = value else {
            return Err(EditorError::invalid_format("expected a JSON object"));
        };

        let nodes = entries::<DocumentNode>(fields.remove("nodes"), "nodes")?;
        let edges = entries::<DocumentEdge>(fields.remove("edges"), "edges")?;

        let document = Self { nodes, edges };
        document.validate()?;
        Ok(document)
    }

    fn validate(&self) -> Result<()> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(EditorError::invalid_format(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(EditorError::invalid_format(format!(
                    "duplicate edge id '{}'",
                    edge.id
                )));
            }
            if edge.from == edge.to {
                return Err(EditorError::invalid_format(format!(
                    "edge '{}' connects node '{}' to itself",
                    edge.id, edge.from
                )));
            }
            for endpoint in [&edge.from, &edge.to] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(EditorError::invalid_format(format!(
                        "edge '{}' references unknown node '{}'",
                        edge.id, endpoint
                    )));
                }
            }
        }

        Ok(())
    }

    /// Builds store records; child links are attached by the store.
    pub(crate) fn into_records(self, fallback: Size) -> (Vec<Node>, Vec<Edge>) {
        let nodes = self
            .nodes
            .into_iter()
            .map(|entry| {
                let size = entry.size.map_or(fallback, |size| {
                    Size::new(
                        sanitize_length(size.width, fallback.width),
                        sanitize_length(size.height, fallback.height),
                    )
                });
                let mut node = Node::new(entry.id, entry.label, sanitize_point(entry.position), size);
                node.description = entry.description;
                node.tags = entry.tags;
                node.style = entry.style;
                node
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|entry| {
                let mut edge = Edge::new(entry.id, entry.from, entry.to);
                edge.label = entry.label;
                edge.bidirectional = entry.bidirectional;
                edge.style = entry.style;
                edge
            })
            .collect();

        (nodes, edges)
    }
}

fn entries<T: DeserializeOwned>(value: Option<Value>, field: &str) -> Result<Vec<T>> {
    let Some(Value::Array(items)) = value else {
        return Err(EditorError::invalid_format(format!(
            "'{field}' must be an array"
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|err| {
                EditorError::invalid_format(format!("{field}[{index}]: {err}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramId;

    fn sample_json() -> &'static str {
        r#"{
            "nodes": [
                { "id": "a", "label": "A", "position": { "x": 100, "y": 100 } },
                { "id": "b", "label": "B", "position": { "x": 300, "y": 100 },
                  "size": { "width": 200, "height": 90 } }
            ],
            "edges": [
                { "id": "e1", "from": "a", "to": "b", "label": "calls" }
            ]
        }"#
    }

    #[test]
    fn parse_fills_optional_fields() {
        let document = ExportDocument::parse(sample_json()).unwrap();
        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.nodes[0].size, None);
        assert_eq!(document.nodes[1].size, Some(Size::new(200.0, 90.0)));
        assert_eq!(document.edges[0].label, "calls");
        assert!(!document.edges[0].bidirectional);
    }

    #[test]
    fn export_matches_diagram_contents() {
        let (nodes, edges) = ExportDocument::parse(sample_json())
            .unwrap()
            .into_records(Size::default());
        let mut diagram = Diagram::new(DiagramId::root());
        diagram.replace_contents(nodes, edges);

        let exported = ExportDocument::from_diagram(&diagram);
        let ids: Vec<&str> = exported.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(exported.edges[0].from.as_str(), "a");

        let json = exported.to_json().unwrap();
        assert!(!json.contains("child"));
    }

    #[test]
    fn rejects_non_json_and_wrong_shapes() {
        for text in [
            "not json",
            "[]",
            r#"{ "edges": [] }"#,
            r#"{ "nodes": {}, "edges": [] }"#,
            r#"{ "nodes": [], "edges": "none" }"#,
            r#"{ "nodes": [ { "id": "a" } ], "edges": [] }"#,
        ] {
            let err = ExportDocument::parse(text).unwrap_err();
            assert!(
                matches!(err, EditorError::InvalidFormat(_)),
                "{text} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_graph_invariant_violations() {
        let duplicate = r#"{ "nodes": [
            { "id": "a", "position": { "x": 0, "y": 0 } },
            { "id": "a", "position": { "x": 1, "y": 1 } } ], "edges": [] }"#;
        let self_loop = r#"{ "nodes": [ { "id": "a", "position": { "x": 0, "y": 0 } } ],
            "edges": [ { "id": "e", "from": "a", "to": "a" } ] }"#;
        let dangling = r#"{ "nodes": [ { "id": "a", "position": { "x": 0, "y": 0 } } ],
            "edges": [ { "id": "e", "from": "a", "to": "ghost" } ] }"#;

        for (text, needle) in [
            (duplicate, "duplicate node id"),
            (self_loop, "to itself"),
            (dangling, "unknown node 'ghost'"),
        ] {
            let err = ExportDocument::parse(text).unwrap_err();
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn degenerate_sizes_fall_back() {
        let text = r#"{ "nodes": [ { "id": "a", "position": { "x": 0, "y": 0 },
            "size": { "width": 0, "height": -5 } } ], "edges": [] }"#;
        let (nodes, _) = ExportDocument::parse(text)
            .unwrap()
            .into_records(Size::new(120.0, 60.0));
        assert_eq!(nodes[0].size, Size::new(120.0, 60.0));
    }

    #[test]
    fn missing_size_uses_the_configured_size() {
        let (nodes, _) = ExportDocument::parse(sample_json())
            .unwrap()
            .into_records(Size::new(120.0, 60.0));
        assert_eq!(nodes[0].size, Size::new(120.0, 60.0));
        assert_eq!(nodes[1].size, Size::new(200.0, 90.0));
    }
}
