//! # Diagram Store
//!
//! The canonical node/edge container for erdview.
//!
//! A `Diagram` is an immutable snapshot: every mutation entry point is a pure
//! transformation that returns a new snapshot, leaving the original intact.
//! The `EditorSession` swaps whole snapshots, so each committed user gesture
//! is exactly one observable state transition (and one durable write).
//!
//! Node order is insertion/arrival order. Layout heuristics (the `+80/+80`
//! add-table offset, the catalog cascade) depend on it, so nodes live in a
//! `Vec` rather than an ordered map; uniqueness is enforced at creation.

use crate::types::{Column, Edge, EdgeId, ErdError, Node, NodeId, Position, TableGroup};
use serde::{Deserialize, Serialize};

// =============================================================================
// CHANGE SETS
// =============================================================================

/// A structural node change reported by the render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeChange {
    /// One drag step: move a node to a new position.
    Position { id: NodeId, position: Position },
    /// Remove a node. Incident edges are NOT removed (see module docs on
    /// dangling edges).
    Remove { id: NodeId },
}

/// A structural edge change reported by the render layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeChange {
    /// Remove an edge.
    Remove { id: EdgeId },
}

// =============================================================================
// DIAGRAM
// =============================================================================

/// An immutable snapshot of the full diagram state.
///
/// Not serializable directly: persistence goes through `DiagramSnapshot`,
/// whose load path re-validates id uniqueness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagram {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Create an empty diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagram from already-validated parts.
    ///
    /// Duplicate node or edge ids are rejected; this is the load path, and a
    /// corrupt snapshot must not produce an ambiguous diagram.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, ErdError> {
        let mut diagram = Self::new();
        for node in nodes {
            diagram = diagram.with_node(node)?;
        }
        for edge in edges {
            if diagram.edges.iter().any(|e| e.id == edge.id) {
                return Err(ErdError::DuplicateEdge(edge.id));
            }
            // Dangling endpoints are tolerated on load: a stored snapshot may
            // legitimately contain edges whose nodes were deleted later.
            diagram.edges.push(edge);
        }
        Ok(diagram)
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    /// All nodes in arrival order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in arrival order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// Check whether a node with the given id exists.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Check whether an edge with the given id exists.
    #[must_use]
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The most recently added node, if any. Anchor for the add-table offset.
    #[must_use]
    pub fn last_node(&self) -> Option<&Node> {
        self.nodes.last()
    }

    /// Componentwise maximum of all node positions, with 0 as the floor.
    /// Anchor for the catalog placement cascade.
    #[must_use]
    pub fn max_position(&self) -> Position {
        let x = self.nodes.iter().map(|n| n.position.x).fold(0.0, f64::max);
        let y = self.nodes.iter().map(|n| n.position.y).fold(0.0, f64::max);
        Position::new(x, y)
    }

    // -------------------------------------------------------------------------
    // Pure transformations
    // -------------------------------------------------------------------------

    /// Apply a render-layer node change-set, returning the new snapshot.
    ///
    /// Unknown ids are ignored. Removing a node never removes its incident
    /// edges; those edges dangle until explicitly deleted.
    #[must_use]
    pub fn with_node_changes(&self, changes: &[NodeChange]) -> Self {
        let mut next = self.clone();
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(node) = next.nodes.iter_mut().find(|n| &n.id == id) {
                        node.position = *position;
                    }
                }
                NodeChange::Remove { id } => {
                    next.nodes.retain(|n| &n.id != id);
                }
            }
        }
        next
    }

    /// Apply a render-layer edge change-set, returning the new snapshot.
    #[must_use]
    pub fn with_edge_changes(&self, changes: &[EdgeChange]) -> Self {
        let mut next = self.clone();
        for change in changes {
            match change {
                EdgeChange::Remove { id } => {
                    next.edges.retain(|e| &e.id != id);
                }
            }
        }
        next
    }

    /// Append a node, returning the new snapshot.
    ///
    /// Rejects duplicate ids: catalog ids and user-chosen ids share one
    /// namespace, and collisions must never silently overwrite.
    pub fn with_node(&self, node: Node) -> Result<Self, ErdError> {
        if self.contains_node(&node.id) {
            return Err(ErdError::DuplicateNode(node.id));
        }
        let mut next = self.clone();
        next.nodes.push(node);
        Ok(next)
    }

    /// Append an edge, returning the new snapshot.
    ///
    /// Both endpoints must exist at creation time and the edge id must be
    /// fresh. (Endpoints may disappear later; that is tolerated.)
    pub fn with_edge(&self, edge: Edge) -> Result<Self, ErdError> {
        if self.contains_edge(&edge.id) {
            return Err(ErdError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(ErdError::MissingEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        let mut next = self.clone();
        next.edges.push(edge);
        Ok(next)
    }

    /// Overwrite the editable table fields of an existing node, returning the
    /// new snapshot. Id and position are immutable through this path.
    pub fn with_updated_table(
        &self,
        id: &NodeId,
        table_name: String,
        group: TableGroup,
        columns: Vec<Column>,
    ) -> Result<Self, ErdError> {
        let mut next = self.clone();
        let node = next
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| ErdError::NodeNotFound(id.clone()))?;
        node.data.table_name = table_name;
        node.data.group = group;
        node.data.columns = columns;
        Ok(next)
    }

    /// Replace the column list of an existing node, returning the new
    /// snapshot. Used by catalog reconciliation; every other field of the
    /// node is left untouched.
    pub fn with_replaced_columns(
        &self,
        id: &NodeId,
        columns: Vec<Column>,
    ) -> Result<Self, ErdError> {
        let mut next = self.clone();
        let node = next
            .nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| ErdError::NodeNotFound(id.clone()))?;
        node.data.columns = columns;
        Ok(next)
    }
}

// =============================================================================
// TESTS
// =============================================================================
