#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use layerboard::{DiagramId, Editor, Point};
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_build_and_snapshot() {
        let mut editor = Editor::default();
        let root = DiagramId::root();
        let a = editor
            .add_node(&root, Point::new(100.0, 100.0), "Start")
            .expect("Failed to add node");
        let b = editor
            .add_node(&root, Point::new(300.0, 100.0), "Finish")
            .expect("Failed to add node");
        editor.add_edge(&a, &b).expect("Failed to add edge");

        let snapshot = editor.snapshot().expect("Failed to snapshot");
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges[0].start, Point::new(180.0, 100.0));
    }

    #[wasm_bindgen_test]
    fn test_document_round_trip() {
        let mut editor = Editor::default();
        editor
            .import_document(
                r#"{ "nodes": [ { "id": "a", "label": "A", "position": { "x": 0, "y": 0 } } ],
                     "edges": [] }"#,
            )
            .expect("Failed to import document");

        let document = editor.export_document().expect("Failed to export");
        assert_eq!(document.nodes.len(), 1);
        assert_eq!(document.nodes[0].label, "A");
    }

    #[wasm_bindgen_test]
    fn test_identifiers_are_generated() {
        let mut editor = Editor::default();
        let root = DiagramId::root();
        let first = editor.add_node(&root, Point::ORIGIN, "A").expect("add");
        let second = editor.add_node(&root, Point::ORIGIN, "B").expect("add");
        assert_ne!(first, second);
    }
}
