//! # Connectivity Engine
//!
//! Computes the set of node ids transitively connected to a hovered node,
//! treating edges as undirected. The result drives hover highlighting only;
//! it never feeds back into diagram state.
//!
//! The algorithm is a fixpoint over repeated full edge scans rather than an
//! indexed BFS: no adjacency structure is built or maintained, which keeps
//! the hot path allocation-light for the graphs this system actually sees
//! (dozens of tables). Worst case is O(V·E).

use crate::types::{Edge, NodeId};
use std::collections::BTreeSet;

/// The set of node ids reachable from `hovered` across the given edges,
/// including `hovered` itself.
///
/// Returns `None` when nothing is hovered: the render layer then applies no
/// highlighting at all, which is distinct from "only the hovered node is
/// connected".
#[must_use]
pub fn connected_ids(hovered: Option<&NodeId>, edges: &[Edge]) -> Option<BTreeSet<NodeId>> {
    let hovered = hovered?;
    let mut set = BTreeSet::new();
    set.insert(hovered.clone());

    let mut changed = true;
    while changed {
        changed = false;
        for edge in edges {
            if set.contains(&edge.source) || set.contains(&edge.target) {
                if !set.contains(&edge.source) {
                    set.insert(edge.source.clone());
                    changed = true;
                }
                if !set.contains(&edge.target) {
                    set.insert(edge.target.clone());
                    changed = true;
                }
            }
        }
    }

    Some(set)
}

/// An edge is emphasized iff BOTH endpoints are in the connected set.
#[must_use]
pub fn edge_connected(edge: &Edge, set: &BTreeSet<NodeId>) -> bool {
    set.contains(&edge.source) && set.contains(&edge.target)
}

// =============================================================================
// TESTS
// =============================================================================
