//! Property tests for the structured mesh generator.

use fem_model::{Dimension, ElementOrder, MeshConfig, StructuredMesh};
use proptest::prelude::*;

fn orders() -> impl Strategy<Value = ElementOrder> {
    prop_oneof![Just(ElementOrder::Linear), Just(ElementOrder::Quadratic)]
}

proptest! {
    #[test]
    fn node_and_element_counts_1d(
        order in orders(),
        nex in 1usize..24,
        max_x in 0.1f64..50.0,
    ) {
        let config = MeshConfig::one_dimensional(order, nex, max_x);
        let mesh = StructuredMesh::generate(&config).unwrap();

        let k = order.nodes_per_direction();
        prop_assert_eq!(mesh.total_nodes(), k * nex + 1);
        prop_assert_eq!(mesh.total_elements(), nex);
        prop_assert!(mesh.nodes_y.is_empty());
    }

    #[test]
    fn node_and_element_counts_2d(
        order in orders(),
        nex in 1usize..12,
        ney in 1usize..12,
        max_x in 0.1f64..10.0,
        max_y in 0.1f64..10.0,
    ) {
        let config = MeshConfig::two_dimensional(order, nex, ney, max_x, max_y);
        let mesh = StructuredMesh::generate(&config).unwrap();

        let k = order.nodes_per_direction();
        prop_assert_eq!(mesh.total_nodes(), (k * nex + 1) * (k * ney + 1));
        prop_assert_eq!(mesh.total_elements(), nex * ney);
        prop_assert_eq!(mesh.nodes_y.len(), mesh.nodes_x.len());
    }

    #[test]
    fn numbering_entries_are_valid_node_indices(
        order in orders(),
        nex in 1usize..8,
        ney in 1usize..8,
    ) {
        let config = MeshConfig::two_dimensional(order, nex, ney, 4.0, 2.0);
        let mesh = StructuredMesh::generate(&config).unwrap();
        let total = mesh.total_nodes();

        for nodes in &mesh.nop {
            prop_assert_eq!(nodes.len(), order.nodes_per_element(Dimension::TwoD));
            for &n in nodes {
                prop_assert!(n >= 1 && n <= total);
            }
        }
    }

    #[test]
    fn every_boundary_tag_has_the_expected_count(
        order in orders(),
        nex in 1usize..8,
        ney in 1usize..8,
    ) {
        let config = MeshConfig::two_dimensional(order, nex, ney, 1.0, 1.0);
        let mesh = StructuredMesh::generate(&config).unwrap();

        prop_assert_eq!(mesh.boundary_elements[&0].len(), nex);
        prop_assert_eq!(mesh.boundary_elements[&1].len(), ney);
        prop_assert_eq!(mesh.boundary_elements[&2].len(), nex);
        prop_assert_eq!(mesh.boundary_elements[&3].len(), ney);
    }
}
