//! End-to-end payload import: JSON payload in, internal mesh out.

use fem_io::{GmshPayload, import_mesh};
use fem_model::{ElementOrder, ElementSide};

/// Two linear quads side by side on [0,2] x [0,1], with physical boundary
/// groups for the bottom and top edges.
fn two_quad_payload() -> GmshPayload {
    let json = r#"{
        "nodesXCoordinates": [0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
        "nodesYCoordinates": [0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        "nodalNumbering": {
            "quadElements": [[1, 2, 5, 4], [2, 3, 6, 5]],
            "triangleElements": []
        },
        "physicalPropMap": [
            {"tag": 1, "dimension": 1, "name": "bottom"},
            {"tag": 2, "dimension": 1, "name": "top"},
            {"tag": 3, "dimension": 2, "name": "domain"}
        ],
        "boundaryNodePairs": {
            "1": [[1, 2], [2, 3]],
            "2": [[4, 5], [5, 6]]
        },
        "elementTypes": {"3": 2, "1": 4}
    }"#;
    GmshPayload::from_json(json).expect("payload parses")
}

#[test]
fn imports_linear_quads_with_boundaries() {
    let mesh = import_mesh(&two_quad_payload()).expect("import succeeds");

    assert_eq!(mesh.element_order, ElementOrder::Linear);
    assert_eq!(mesh.total_nodes(), 6);
    assert_eq!(mesh.total_elements(), 2);

    // Internal layout BL, TL, BR, TR
    assert_eq!(mesh.nop[0], vec![1, 4, 2, 5]);
    assert_eq!(mesh.nop[1], vec![2, 5, 3, 6]);

    let bottom = &mesh.boundary_elements[&1];
    assert_eq!(bottom.len(), 2);
    assert!(bottom.iter().all(|b| b.side == ElementSide::Bottom));
    assert_eq!(bottom[0].element, 0);
    assert_eq!(bottom[1].element, 1);

    let top = &mesh.boundary_elements[&2];
    assert_eq!(top.len(), 2);
    assert!(top.iter().all(|b| b.side == ElementSide::Top));
}

#[test]
fn boundary_side_classification_round_trips() {
    // Every resolved (element, side) pair must list exactly the nodes the
    // payload declared for that boundary entry.
    let payload = two_quad_payload();
    let mesh = import_mesh(&payload).expect("import succeeds");

    for (tag, pairs) in &payload.boundary_node_pairs {
        let tag: usize = tag.parse().unwrap();
        let entries = &mesh.boundary_elements[&tag];
        for (entry, declared) in entries.iter().zip(pairs) {
            let side_nodes: Vec<usize> = entry
                .side
                .local_nodes(mesh.dimension, mesh.element_order)
                .iter()
                .map(|&l| mesh.nop[entry.element][l])
                .collect();
            for node in declared {
                assert!(
                    side_nodes.contains(node),
                    "node {node} missing from side {:?} of element {}",
                    entry.side,
                    entry.element
                );
            }
        }
    }
}

#[test]
fn unresolved_pairs_leave_the_boundary_incomplete() {
    let mut payload = two_quad_payload();
    // Node 99 exists in no element; the entry is dropped with an error log.
    payload
        .boundary_node_pairs
        .insert("1".to_string(), vec![vec![1, 2], vec![2, 99]]);

    let mesh = import_mesh(&payload).expect("import still succeeds");
    assert_eq!(mesh.boundary_elements[&1].len(), 1);
}

#[test]
fn group_without_node_data_is_skipped() {
    let mut payload = two_quad_payload();
    payload.boundary_node_pairs.remove("2");

    let mesh = import_mesh(&payload).expect("import succeeds");
    assert!(!mesh.boundary_elements.contains_key(&2));
    assert!(mesh.boundary_elements.contains_key(&1));
}
