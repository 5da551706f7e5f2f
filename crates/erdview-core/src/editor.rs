//! # Edit Session
//!
//! The Edit Controller: one `EditorSession` combines the canonical diagram
//! snapshot with all volatile UI state — mode, hover, selection, the open
//! modal, the transient sync status, and the display-size preference.
//!
//! Structural mutation (drag, connect, delete, add, reset) is gated on Edit
//! mode; in Browse mode those gestures are no-ops and pointer interaction is
//! limited to hover. Every committed gesture advances a revision counter, so
//! the persistence adapter performs exactly one durable write per change.
//!
//! Gesture-level validation failures (blank form fields, id collisions)
//! silently block: no mutation, no error, the form stays open.

use crate::catalog::CatalogTable;
use crate::connectivity;
use crate::defaults::default_diagram;
use crate::graph::{Diagram, EdgeChange, NodeChange};
use crate::primitives::{
    ADD_TABLE_OFFSET, DEFAULT_FORM_COLUMN_TYPE, FALLBACK_POSITION, MAX_IDENTIFIER_LENGTH,
};
use crate::reconcile::Reconciler;
use crate::types::{
    Column, DisplaySize, Edge, EdgeId, Node, NodeId, Position, SampleRow, SyncState, SyncStatus,
    TableData, TableGroup,
};
use std::collections::BTreeSet;

// =============================================================================
// MODES & MODALS
// =============================================================================

/// Top-level interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only browsing: hover highlighting and sample previews only.
    #[default]
    Browse,
    /// Structural mutation permitted: drag, connect, delete, add, edit.
    Edit,
}

/// One editable column row of a table form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDraft {
    pub name: String,
    pub ty: String,
    pub pk: bool,
    /// Free-form reference label; blank means none.
    pub fk: String,
}

impl Default for ColumnDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: DEFAULT_FORM_COLUMN_TYPE.to_string(),
            pk: false,
            fk: String::new(),
        }
    }
}

/// The Add/Edit Table form state. The `id` field is only consulted by the
/// Add flow; the Edit flow targets an existing, immutable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableForm {
    pub id: String,
    pub table_name: String,
    pub group: TableGroup,
    pub columns: Vec<ColumnDraft>,
}

impl Default for TableForm {
    fn default() -> Self {
        Self {
            id: String::new(),
            table_name: String::new(),
            group: TableGroup::Basic,
            columns: vec![ColumnDraft::default()],
        }
    }
}

impl TableForm {
    /// Fresh form with a single blank column row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-populated from an existing node.
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        let columns: Vec<ColumnDraft> = node
            .data
            .columns
            .iter()
            .map(|c| ColumnDraft {
                name: c.name.clone(),
                ty: c.ty.clone(),
                pk: c.pk,
                fk: c.fk.clone().unwrap_or_default(),
            })
            .collect();
        Self {
            id: node.id.as_str().to_string(),
            table_name: node.data.table_name.clone(),
            group: node.data.group,
            columns: if columns.is_empty() {
                vec![ColumnDraft::default()]
            } else {
                columns
            },
        }
    }

    /// Append a blank column row.
    pub fn add_column(&mut self) {
        self.columns.push(ColumnDraft::default());
    }

    /// Remove a column row by index. Out-of-range indices are ignored.
    pub fn remove_column(&mut self, index: usize) {
        if index < self.columns.len() {
            self.columns.remove(index);
        }
    }

    /// Resolve drafts into persisted columns: names trimmed, blank-named rows
    /// dropped, missing types defaulted, blank fk cleared. An empty result is
    /// replaced by the synthetic identifier column — a table with zero valid
    /// columns is never persisted.
    #[must_use]
    pub fn finalize_columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(|c| Column {
                name: c.name.trim().to_string(),
                ty: if c.ty.is_empty() {
                    DEFAULT_FORM_COLUMN_TYPE.to_string()
                } else {
                    c.ty.clone()
                },
                pk: c.pk,
                fk: {
                    let fk = c.fk.trim();
                    if fk.is_empty() {
                        None
                    } else {
                        Some(fk.to_string())
                    }
                },
            })
            .collect();
        if columns.is_empty() {
            columns.push(Column::primary_key("id", "bigint"));
        }
        columns
    }
}

/// The open modal sub-flow. At most one is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    AddTable(TableForm),
    EditTable { target: NodeId, form: TableForm },
}

/// A completed connection gesture reported by the render layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

// =============================================================================
// EDITOR SESSION
// =============================================================================

/// The Edit Controller state machine plus the diagram it governs.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    diagram: Diagram,
    revision: u64,
    mode: Mode,
    hovered: Option<NodeId>,
    selected_nodes: BTreeSet<NodeId>,
    selected_edges: BTreeSet<EdgeId>,
    modal: Option<Modal>,
    sync: SyncState,
    display_size: DisplaySize,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::with_diagram(default_diagram())
    }
}

impl EditorSession {
    /// Session over the built-in default diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session over a loaded diagram snapshot.
    #[must_use]
    pub fn with_diagram(diagram: Diagram) -> Self {
        Self {
            diagram,
            revision: 0,
            mode: Mode::Browse,
            hovered: None,
            selected_nodes: BTreeSet::new(),
            selected_edges: BTreeSet::new(),
            modal: None,
            sync: SyncState::default(),
            display_size: DisplaySize::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The current diagram snapshot.
    #[must_use]
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Monotonic count of committed changes. The persistence adapter writes
    /// once whenever this advances.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True in Edit mode.
    #[must_use]
    pub fn is_edit_mode(&self) -> bool {
        self.mode == Mode::Edit
    }

    /// The open modal, if any.
    #[must_use]
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Mutable access to the open form, for field editing.
    pub fn form_mut(&mut self) -> Option<&mut TableForm> {
        match self.modal.as_mut() {
            Some(Modal::AddTable(form)) | Some(Modal::EditTable { form, .. }) => Some(form),
            None => None,
        }
    }

    /// The hovered node id, if any.
    #[must_use]
    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// Selected node ids.
    #[must_use]
    pub fn selected_nodes(&self) -> &BTreeSet<NodeId> {
        &self.selected_nodes
    }

    /// Selected edge ids.
    #[must_use]
    pub fn selected_edges(&self) -> &BTreeSet<EdgeId> {
        &self.selected_edges
    }

    /// The transient sync state.
    #[must_use]
    pub fn sync(&self) -> &SyncState {
        &self.sync
    }

    /// The entity display-size preference.
    #[must_use]
    pub fn display_size(&self) -> DisplaySize {
        self.display_size
    }

    /// Connectivity set for the current hover, or `None` when not hovering.
    #[must_use]
    pub fn connected_ids(&self) -> Option<BTreeSet<NodeId>> {
        connectivity::connected_ids(self.hovered.as_ref(), self.diagram.edges())
    }

    // -------------------------------------------------------------------------
    // Mode, hover, selection, preference
    // -------------------------------------------------------------------------

    /// Switch interaction mode. Leaving Edit closes any open modal and clears
    /// the selection: Browse permits no structural state.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == Mode::Browse {
            self.modal = None;
            self.clear_selection();
        }
    }

    /// Record the hovered node (or clear it). Recomputed highlight state is
    /// derived on demand; nothing is cached.
    pub fn hover(&mut self, node: Option<NodeId>) {
        self.hovered = node;
    }

    /// Select a node. Unknown ids are ignored.
    pub fn select_node(&mut self, id: &NodeId) -> bool {
        if self.diagram.contains_node(id) {
            self.selected_nodes.insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Select an edge. Unknown ids are ignored.
    pub fn select_edge(&mut self, id: &EdgeId) -> bool {
        if self.diagram.contains_edge(id) {
            self.selected_edges.insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Clear both selection sets.
    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.selected_edges.clear();
    }

    /// Update the display-size preference. Returns true when it changed;
    /// persisted independently of the diagram, so no revision bump.
    pub fn set_display_size(&mut self, size: DisplaySize) -> bool {
        if self.display_size == size {
            return false;
        }
        self.display_size = size;
        true
    }

    // -------------------------------------------------------------------------
    // Structural mutation (Edit mode only)
    // -------------------------------------------------------------------------

    /// Fold a render-layer node change-set into the diagram.
    /// Browse mode: no-op.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> bool {
        if !self.is_edit_mode() {
            return false;
        }
        let next = self.diagram.with_node_changes(changes);
        self.commit(next)
    }

    /// Fold a render-layer edge change-set into the diagram.
    /// Browse mode: no-op.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> bool {
        if !self.is_edit_mode() {
            return false;
        }
        let next = self.diagram.with_edge_changes(changes);
        self.commit(next)
    }

    /// Complete a connection gesture: synthesize a labelled edge between the
    /// two endpoints. Browse mode, missing endpoints: no-op.
    pub fn connect(&mut self, request: &ConnectionRequest) -> bool {
        if !self.is_edit_mode() {
            return false;
        }

        let label = match (&request.source_handle, &request.target_handle) {
            (Some(src), Some(tgt)) => format!("{src} → {tgt}"),
            _ => format!("{} → {}", request.source, request.target),
        };

        let edge = Edge {
            id: self.fresh_edge_id(&request.source, &request.target),
            source: request.source.clone(),
            target: request.target.clone(),
            source_handle: request.source_handle.clone(),
            target_handle: request.target_handle.clone(),
            label,
        };

        match self.diagram.with_edge(edge) {
            Ok(next) => self.commit(next),
            Err(_) => false,
        }
    }

    /// Delete-key gesture: remove every selected node and edge, then clear
    /// the selection. Edges incident to removed nodes are NOT removed; they
    /// dangle until deleted themselves. Browse mode: no-op.
    pub fn delete_selection(&mut self) -> bool {
        if !self.is_edit_mode() {
            return false;
        }

        let node_changes: Vec<NodeChange> = self
            .selected_nodes
            .iter()
            .map(|id| NodeChange::Remove { id: id.clone() })
            .collect();
        let edge_changes: Vec<EdgeChange> = self
            .selected_edges
            .iter()
            .map(|id| EdgeChange::Remove { id: id.clone() })
            .collect();

        let next = self
            .diagram
            .with_node_changes(&node_changes)
            .with_edge_changes(&edge_changes);
        self.clear_selection();
        self.commit(next)
    }

    /// Restore the built-in default diagram, closing any modal and clearing
    /// all transient state. Callers obtain explicit user confirmation first.
    pub fn reset(&mut self) -> bool {
        self.modal = None;
        self.clear_selection();
        self.hovered = None;
        self.commit(default_diagram())
    }

    // -------------------------------------------------------------------------
    // Modal sub-flows
    // -------------------------------------------------------------------------

    /// Open the Add Table modal (closing Edit Table if open, clearing node
    /// selection). Browse mode: refused.
    pub fn open_add_table(&mut self) -> bool {
        if !self.is_edit_mode() {
            return false;
        }
        self.modal = Some(Modal::AddTable(TableForm::new()));
        self.clear_selection();
        true
    }

    /// Open the Edit Table modal for an existing node (closing Add Table if
    /// open, clearing node selection). Browse mode or unknown id: refused.
    pub fn open_edit_table(&mut self, id: &NodeId) -> bool {
        if !self.is_edit_mode() {
            return false;
        }
        let Some(node) = self.diagram.node(id) else {
            return false;
        };
        self.modal = Some(Modal::EditTable {
            target: id.clone(),
            form: TableForm::from_node(node),
        });
        self.clear_selection();
        true
    }

    /// Close whichever modal is open.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submit the Add Table form. A trimmed-blank id or display name, an
    /// over-long identifier, or an id collision silently blocks the submit
    /// and keeps the form open. On success the node is appended at the last
    /// node's position + (80, 80) and the modal closes.
    pub fn submit_add_table(&mut self) -> bool {
        let Some(Modal::AddTable(form)) = &self.modal else {
            return false;
        };

        let id = form.id.trim().to_string();
        let table_name = form.table_name.trim().to_string();
        if !valid_identifier(&id) || !valid_identifier(&table_name) {
            return false;
        }

        let position = self
            .diagram
            .last_node()
            .map(|n| n.position.offset(ADD_TABLE_OFFSET, ADD_TABLE_OFFSET))
            .unwrap_or(Position::new(FALLBACK_POSITION.0, FALLBACK_POSITION.1));

        let node = Node::new(
            NodeId::new(id),
            position,
            TableData {
                table_name,
                group: form.group,
                columns: form.finalize_columns(),
                sample_rows: vec![default_sample_row()],
            },
        );

        match self.diagram.with_node(node) {
            Ok(next) => {
                self.modal = None;
                self.commit(next)
            }
            // Id collision: block like any other validation failure.
            Err(_) => false,
        }
    }

    /// Submit the Edit Table form. Only `table_name`, `group` and `columns`
    /// are overwritten; id and position are immutable through this flow. A
    /// trimmed-blank display name silently blocks.
    pub fn submit_edit_table(&mut self) -> bool {
        let Some(Modal::EditTable { target, form }) = &self.modal else {
            return false;
        };

        let table_name = form.table_name.trim().to_string();
        if !valid_identifier(&table_name) {
            return false;
        }

        match self.diagram.with_updated_table(
            &target.clone(),
            table_name,
            form.group,
            form.finalize_columns(),
        ) {
            Ok(next) => {
                self.modal = None;
                self.commit(next)
            }
            Err(_) => false,
        }
    }

    // -------------------------------------------------------------------------
    // Catalog sync continuation
    // -------------------------------------------------------------------------

    /// Mark a catalog fetch as started. Refused while one is already in
    /// flight — at most one fetch at a time, and the trigger is disabled for
    /// the duration.
    pub fn begin_sync(&mut self) -> bool {
        if self.sync.in_flight() {
            return false;
        }
        self.sync = SyncState {
            status: SyncStatus::Loading,
            message: String::new(),
        };
        true
    }

    /// Complete a catalog fetch. A successful fetch reconciles the catalog
    /// into the diagram and reports an `Ok` status; a failed fetch leaves the
    /// diagram completely untouched and reports `Error` with the given
    /// remediation message. An in-flight fetch always resolves here, even if
    /// its result has gone stale.
    pub fn finish_sync(&mut self, result: Result<Vec<CatalogTable>, String>) -> bool {
        match result {
            Ok(tables) => {
                let (next, summary) = Reconciler::reconcile(&self.diagram, &tables);
                let committed = self.commit(next);
                self.sync = SyncState {
                    status: SyncStatus::Ok,
                    message: summary.message(),
                };
                committed
            }
            Err(message) => {
                self.sync = SyncState {
                    status: SyncStatus::Error,
                    message,
                };
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Swap in a new snapshot if it differs; one revision bump per commit.
    fn commit(&mut self, next: Diagram) -> bool {
        if next == self.diagram {
            return false;
        }
        self.diagram = next;
        self.revision = self.revision.saturating_add(1);
        true
    }

    /// Deterministic fresh edge id: `e-{source}-{target}-{n}`, with `n`
    /// advanced past any collision.
    fn fresh_edge_id(&self, source: &NodeId, target: &NodeId) -> EdgeId {
        let mut n = self.revision;
        loop {
            let candidate = EdgeId::new(format!("e-{source}-{target}-{n}"));
            if !self.diagram.contains_edge(&candidate) {
                return candidate;
            }
            n = n.saturating_add(1);
        }
    }
}

/// Non-blank after trimming and within the identifier length cap.
fn valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_IDENTIFIER_LENGTH
}

/// Sample row attached to form-added tables.
fn default_sample_row() -> SampleRow {
    let mut row = SampleRow::new();
    row.insert("id".to_string(), "1".to_string());
    row.insert("sample".to_string(), "sample".to_string());
    row
}

// =============================================================================
// TESTS
// =============================================================================
