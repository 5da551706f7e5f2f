//! # Core Type Definitions
//!
//! This module contains all core types for the erdview diagram engine:
//! - Diagram identifiers (`NodeId`, `EdgeId`)
//! - Table structure (`Column`, `TableData`, `TableGroup`, `Node`, `Edge`)
//! - View preferences (`DisplaySize`)
//! - Sync state (`SyncStatus`, `SyncState`)
//! - Error types (`ErdError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Implement `Ord` where they serve as map/set keys
//! - Carry no clocks, counters, or randomness
//! - Serialize with stable field names matching the durable-state shape

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// DIAGRAM IDENTIFIERS
// =============================================================================

/// Unique identifier for a node (one database table) in the diagram.
///
/// Catalog-originated nodes reuse the table name as their id; user-created
/// nodes carry a user-chosen string. Both share one namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an edge (one relationship line) in the diagram.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// Canvas position of a node, in render-layer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position shifted by the given offsets.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

// =============================================================================
// TABLE STRUCTURE
// =============================================================================

/// Color/grouping bucket a table belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TableGroup {
    /// Core CRM entities (rendered green).
    #[default]
    Basic,
    /// Financial entities (rendered blue).
    Financial,
}

impl TableGroup {
    /// Stable lowercase name, as stored and displayed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Financial => "financial",
        }
    }
}

impl std::str::FromStr for TableGroup {
    type Err = ErdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "financial" => Ok(Self::Financial),
            other => Err(ErdError::InvalidGroup(other.to_string())),
        }
    }
}

/// One column of a table.
///
/// `fk` holds a free-form reference label ("customer.id"); it is user- or
/// catalog-supplied and never validated against the rest of the diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub pk: bool,
    pub fk: Option<String>,
}

impl Column {
    /// Create a plain (non-key) column.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            pk: false,
            fk: None,
        }
    }

    /// Create a primary-key column.
    #[must_use]
    pub fn primary_key(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            pk: true,
            fk: None,
        }
    }

    /// Create a foreign-key column referencing `target` (a display label,
    /// not a checked reference).
    #[must_use]
    pub fn foreign_key(
        name: impl Into<String>,
        ty: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            pk: false,
            fk: Some(target.into()),
        }
    }
}

/// One row of illustrative sample data, keyed by column label.
pub type SampleRow = BTreeMap<String, String>;

/// Table payload of a node: everything except identity and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    /// Display label; editable, distinct from the node id.
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub group: TableGroup,
    pub columns: Vec<Column>,
    #[serde(rename = "sampleData")]
    pub sample_rows: Vec<SampleRow>,
}

// =============================================================================
// NODE & EDGE
// =============================================================================

/// Node kind tag. The diagram currently renders exactly one kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum NodeKind {
    #[serde(rename = "tableNode")]
    #[default]
    Table,
}

/// A diagram node representing one database table.
///
/// The id is immutable once created; everything under `data` may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: TableData,
}

impl Node {
    /// Create a table node.
    #[must_use]
    pub fn new(id: NodeId, position: Position, data: TableData) -> Self {
        Self {
            id,
            kind: NodeKind::Table,
            position,
            data,
        }
    }
}

/// A directed relationship line between two nodes.
///
/// Endpoints are held by id only (weak references). An edge may outlive the
/// nodes it names; resolution happens at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(rename = "targetHandle")]
    pub target_handle: Option<String>,
    pub label: String,
}

// =============================================================================
// DISPLAY SIZE
// =============================================================================

/// Rendering size of table entities, persisted independently of the diagram.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySize {
    Small,
    #[default]
    Medium,
    Large,
}

impl DisplaySize {
    /// Stable lowercase name, as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// How many columns a node body shows before truncating.
    #[must_use]
    pub const fn column_limit(self) -> usize {
        match self {
            Self::Small => 5,
            Self::Medium => 12,
            Self::Large => usize::MAX,
        }
    }

    /// Parse a stored value, falling back to Medium for anything invalid.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl std::str::FromStr for DisplaySize {
    type Err = ErdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            other => Err(ErdError::InvalidDisplaySize(other.to_string())),
        }
    }
}

// =============================================================================
// SYNC STATE
// =============================================================================

/// Outcome bucket of the last catalog reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// No sync attempted yet.
    #[default]
    Idle,
    /// A fetch is in flight; further triggers are refused.
    Loading,
    /// The catalog was fetched and merged (possibly a no-op).
    Ok,
    /// The fetch or parse failed; the diagram was left untouched.
    Error,
}

/// Transient description of the last catalog sync. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    pub status: SyncStatus,
    pub message: String,
}

impl SyncState {
    /// True while a fetch is in flight.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.status == SyncStatus::Loading
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the diagram engine.
///
/// - No silent failures at the store level
/// - The core never panics; all errors are recoverable
/// - Gesture-level validation (blank form fields) blocks without erroring
#[derive(Debug, Error)]
pub enum ErdError {
    /// The requested node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node with this id already exists.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge with this id already exists.
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// An edge was created against a node that does not exist.
    #[error("edge {edge} references missing node {node}")]
    MissingEndpoint { edge: EdgeId, node: NodeId },

    /// An unrecognized table group name.
    #[error("invalid table group: {0:?}")]
    InvalidGroup(String),

    /// An unrecognized display size name.
    #[error("invalid display size: {0:?}")]
    InvalidDisplaySize(String),

    /// A serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A deserialization error occurred.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_size_parse_or_default_falls_back() {
        assert_eq!(DisplaySize::parse_or_default("small"), DisplaySize::Small);
        assert_eq!(DisplaySize::parse_or_default("large"), DisplaySize::Large);
        assert_eq!(DisplaySize::parse_or_default("huge"), DisplaySize::Medium);
        assert_eq!(DisplaySize::parse_or_default(""), DisplaySize::Medium);
    }

    #[test]
    fn display_size_column_limits_ordered() {
        assert!(DisplaySize::Small.column_limit() < DisplaySize::Medium.column_limit());
        assert!(DisplaySize::Medium.column_limit() < DisplaySize::Large.column_limit());
    }

    #[test]
    fn table_group_roundtrip() {
        for group in [TableGroup::Basic, TableGroup::Financial] {
            assert_eq!(group.as_str().parse::<TableGroup>().ok(), Some(group));
        }
        assert!("premium".parse::<TableGroup>().is_err());
    }

    #[test]
    fn column_serde_uses_wire_names() {
        let col = Column::foreign_key("customer_id", "bigint", "customer.id");
        let json = serde_json::to_value(&col).expect("serialize");
        assert_eq!(json["type"], "bigint");
        assert_eq!(json["fk"], "customer.id");
        assert_eq!(json["pk"], false);
    }

    #[test]
    fn node_serde_uses_wire_names() {
        let node = Node::new(
            NodeId::new("customer"),
            Position::new(10.0, 20.0),
            TableData {
                table_name: "Customer".to_string(),
                group: TableGroup::Basic,
                columns: vec![Column::primary_key("id", "bigint")],
                sample_rows: Vec::new(),
            },
        );
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "tableNode");
        assert_eq!(json["data"]["tableName"], "Customer");
        assert_eq!(json["data"]["group"], "basic");
    }

    #[test]
    fn sync_state_in_flight_only_while_loading() {
        let mut sync = SyncState::default();
        assert!(!sync.in_flight());
        sync.status = SyncStatus::Loading;
        assert!(sync.in_flight());
        sync.status = SyncStatus::Error;
        assert!(!sync.in_flight());
    }
}
