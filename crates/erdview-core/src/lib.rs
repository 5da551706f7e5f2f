//! # erdview-core
//!
//! The deterministic diagram engine for erdview - THE LOGIC.
//!
//! This crate implements the core of the ERD viewer/editor: the canonical
//! node/edge store, the hover-connectivity engine, the catalog reconciler,
//! the edit-mode session, and the durable persistence formats. The render
//! layer and every network/async concern live in the app binary.
//!
//! ## Architectural Constraints
//!
//! - The session is the ONLY place where diagram state exists (stateful)
//! - Every mutation entry point is a pure snapshot transformation
//! - No async, no network dependencies (pure Rust)
//! - No clocks and no randomness: identical inputs produce identical state

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod connectivity;
pub mod defaults;
pub mod editor;
pub mod formats;
pub mod graph;
pub mod primitives;
pub mod reconcile;
pub mod storage;
pub mod types;
pub mod view;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Column, DisplaySize, Edge, EdgeId, ErdError, Node, NodeId, NodeKind, Position, SampleRow,
    SyncState, SyncStatus, TableData, TableGroup,
};

// =============================================================================
// RE-EXPORTS: Diagram Engine
// =============================================================================

pub use catalog::{Catalog, CatalogColumn, CatalogTable};
pub use connectivity::{connected_ids, edge_connected};
pub use defaults::default_diagram;
pub use editor::{ColumnDraft, ConnectionRequest, EditorSession, Modal, Mode, TableForm};
pub use graph::{Diagram, EdgeChange, NodeChange};
pub use reconcile::{ReconcileSummary, Reconciler};
pub use view::{EdgeStyle, RenderView, ViewEdge, ViewNode, render_view};

// =============================================================================
// RE-EXPORTS: Formats & Storage
// =============================================================================

pub use formats::{DiagramSnapshot, diagram_from_bytes, diagram_to_bytes};
pub use storage::RedbStore;
