//! # Property-Based Tests
//!
//! Proptest invariants over connectivity, reconciliation, and the snapshot
//! byte format.

use erdview_core::{
    CatalogColumn, CatalogTable, Column, Diagram, Edge, EdgeId, Node, NodeId, Position,
    Reconciler, TableData, TableGroup, connected_ids, diagram_from_bytes, diagram_to_bytes,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// GENERATORS
// =============================================================================

/// Small pool of node names so generated edges actually connect.
fn node_name() -> impl Strategy<Value = String> {
    (0u8..12).prop_map(|i| format!("table_{i}"))
}

fn edge_list() -> impl Strategy<Value = Vec<Edge>> {
    vec((node_name(), node_name()), 0..24).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (source, target))| Edge {
                id: EdgeId::new(format!("e{i}")),
                source: NodeId::new(source),
                target: NodeId::new(target),
                source_handle: None,
                target_handle: None,
                label: String::new(),
            })
            .collect()
    })
}

fn catalog() -> impl Strategy<Value = Vec<CatalogTable>> {
    vec((node_name(), vec("[a-z]{1,8}", 0..5)), 0..8).prop_map(|tables| {
        // Deduplicate names: catalog names are globally unique upstream.
        let mut seen = BTreeSet::new();
        tables
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .map(|(name, columns)| CatalogTable {
                name,
                columns: columns
                    .into_iter()
                    .map(|c| CatalogColumn {
                        name: c,
                        ty: String::new(),
                        pk: false,
                        fk: None,
                    })
                    .collect(),
            })
            .collect()
    })
}

fn diagram_with(names: &[String]) -> Diagram {
    let mut diagram = Diagram::new();
    for (i, name) in names.iter().enumerate() {
        let node = Node::new(
            NodeId::new(name.clone()),
            Position::new(i as f64 * 30.0, i as f64 * 20.0),
            TableData {
                table_name: name.clone(),
                group: TableGroup::Basic,
                columns: vec![Column::primary_key("id", "bigint")],
                sample_rows: Vec::new(),
            },
        );
        if let Ok(next) = diagram.with_node(node) {
            diagram = next;
        }
    }
    diagram
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Without a hovered node there is never a highlight set.
    #[test]
    fn no_hover_no_highlight(edges in edge_list()) {
        prop_assert_eq!(connected_ids(None, &edges), None);
    }

    /// The hovered node is always a member of its own connectivity set.
    #[test]
    fn hovered_always_member(edges in edge_list(), name in node_name()) {
        let hovered = NodeId::new(name);
        let set = connected_ids(Some(&hovered), &edges);
        prop_assert!(set.map(|s| s.contains(&hovered)).unwrap_or(false));
    }

    /// Connectivity is symmetric under edge direction: for every edge (a, b),
    /// hovering a reaches b and hovering b reaches a.
    #[test]
    fn connectivity_symmetric(edges in edge_list()) {
        for edge in &edges {
            let from_source = connected_ids(Some(&edge.source), &edges)
                .map(|s| s.contains(&edge.target));
            let from_target = connected_ids(Some(&edge.target), &edges)
                .map(|s| s.contains(&edge.source));
            prop_assert_eq!(from_source, Some(true));
            prop_assert_eq!(from_target, Some(true));
        }
    }

    /// Membership in each other's sets is mutual for ALL node pairs, not just
    /// edge endpoints.
    #[test]
    fn reachability_is_mutual(edges in edge_list(), a in node_name(), b in node_name()) {
        let a = NodeId::new(a);
        let b = NodeId::new(b);
        let a_reaches_b = connected_ids(Some(&a), &edges)
            .map(|s| s.contains(&b))
            .unwrap_or(false);
        let b_reaches_a = connected_ids(Some(&b), &edges)
            .map(|s| s.contains(&a))
            .unwrap_or(false);
        prop_assert_eq!(a_reaches_b, b_reaches_a);
    }

    /// Reconciling twice with the same catalog is a fixpoint.
    #[test]
    fn reconcile_idempotent(tables in catalog(), existing in vec(node_name(), 0..6)) {
        let mut seen = BTreeSet::new();
        let unique: Vec<String> = existing.into_iter().filter(|n| seen.insert(n.clone())).collect();
        let diagram = diagram_with(&unique);

        let (once, _) = Reconciler::reconcile(&diagram, &tables);
        let (twice, summary) = Reconciler::reconcile(&once, &tables);

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(summary.created, 0);
        prop_assert_eq!(summary.skipped, 0);
    }

    /// Reconciliation never creates or removes edges and never removes nodes.
    #[test]
    fn reconcile_only_grows_nodes(tables in catalog(), existing in vec(node_name(), 0..6)) {
        let mut seen = BTreeSet::new();
        let unique: Vec<String> = existing.into_iter().filter(|n| seen.insert(n.clone())).collect();
        let diagram = diagram_with(&unique);

        let (next, _) = Reconciler::reconcile(&diagram, &tables);

        prop_assert_eq!(next.edge_count(), diagram.edge_count());
        prop_assert!(next.node_count() >= diagram.node_count());
        for node in diagram.nodes() {
            prop_assert!(next.contains_node(&node.id));
        }
    }

    /// Every catalog-synthesized node lands strictly right of the prior
    /// layout, so new nodes never overlap old ones.
    #[test]
    fn reconcile_places_new_nodes_clear_of_old(tables in catalog()) {
        let diagram = diagram_with(&["alpha".to_string(), "beta".to_string()]);
        let max_x = diagram.max_position().x;

        let (next, _) = Reconciler::reconcile(&diagram, &tables);

        for node in next.nodes() {
            if !diagram.contains_node(&node.id) {
                prop_assert!(node.position.x > max_x);
            }
        }
    }

    /// The snapshot byte format roundtrips every reconciled diagram exactly.
    #[test]
    fn snapshot_roundtrip(tables in catalog()) {
        let (diagram, _) = Reconciler::reconcile(&Diagram::new(), &tables);

        let bytes = diagram_to_bytes(&diagram).expect("serialize");
        let restored = diagram_from_bytes(&bytes).expect("deserialize");
        prop_assert_eq!(&restored, &diagram);

        let again = diagram_to_bytes(&restored).expect("reserialize");
        prop_assert_eq!(bytes, again);
    }
}
