//! # Render View
//!
//! The read-only data contract between the core and the diagram-rendering
//! layer. The core decorates the canonical nodes/edges with transient view
//! state — edit-mode flags, hover emphasis, display sizing, preview caps —
//! and the render layer draws them. Nothing in a `RenderView` is ever
//! written back.
//!
//! Edges whose endpoints no longer resolve (dangling after a node deletion)
//! are skipped here rather than pruned from the store.

use crate::connectivity::edge_connected;
use crate::editor::EditorSession;
use crate::primitives::{
    DIMMED_EDGE_OPACITY, DIMMED_NODE_OPACITY, EMPHASIS_STROKE_COLOR, EMPHASIS_STROKE_WIDTH,
    MUTED_STROKE_COLOR, MUTED_STROKE_WIDTH, SAMPLE_PREVIEW_ROWS,
};
use crate::types::{
    Column, DisplaySize, EdgeId, NodeId, Position, SampleRow, TableGroup,
};
use serde::Serialize;

// =============================================================================
// DECORATED SHAPES
// =============================================================================

/// Stroke styling of one rendered edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub opacity: f64,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f64,
    #[serde(rename = "strokeColor")]
    pub stroke_color: &'static str,
}

impl EdgeStyle {
    /// Full-emphasis style: both endpoints in the connected set, or no hover.
    #[must_use]
    pub const fn emphasis() -> Self {
        Self {
            opacity: 1.0,
            stroke_width: EMPHASIS_STROKE_WIDTH,
            stroke_color: EMPHASIS_STROKE_COLOR,
        }
    }

    /// Muted style for edges outside the connected set.
    #[must_use]
    pub const fn muted() -> Self {
        Self {
            opacity: DIMMED_EDGE_OPACITY,
            stroke_width: MUTED_STROKE_WIDTH,
            stroke_color: MUTED_STROKE_COLOR,
        }
    }

    /// Neutral style when no hover highlighting is active.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            opacity: 1.0,
            stroke_width: MUTED_STROKE_WIDTH,
            stroke_color: MUTED_STROKE_COLOR,
        }
    }
}

/// One node as the render layer should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    pub id: NodeId,
    pub position: Position,
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub group: TableGroup,
    /// Columns truncated to the display-size limit.
    pub columns: Vec<Column>,
    /// How many columns the truncation hid ("and N more").
    #[serde(rename = "hiddenColumnCount")]
    pub hidden_column_count: usize,
    /// Sample-data preview, capped.
    #[serde(rename = "samplePreview")]
    pub sample_preview: Vec<SampleRow>,
    pub opacity: f64,
    /// Whether connection handles accept drags (Edit mode only).
    pub connectable: bool,
    /// Whether the node shows its edit affordance (Edit mode only).
    pub editable: bool,
    pub selected: bool,
    #[serde(rename = "displaySize")]
    pub display_size: DisplaySize,
}

/// One edge as the render layer should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
    pub style: EdgeStyle,
}

/// A complete frame of render input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderView {
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
    /// True when structural gestures (drag/connect/delete) are live.
    #[serde(rename = "editMode")]
    pub edit_mode: bool,
}

// =============================================================================
// VIEW CONSTRUCTION
// =============================================================================

/// Build the current render frame from a session.
///
/// Recomputed synchronously on every hover change; no caching, no
/// suspension points.
#[must_use]
pub fn render_view(session: &EditorSession) -> RenderView {
    let connected = session.connected_ids();
    let diagram = session.diagram();
    let edit_mode = session.is_edit_mode();
    let size = session.display_size();
    let column_limit = size.column_limit();

    let nodes = diagram
        .nodes()
        .iter()
        .map(|node| {
            let opacity = match &connected {
                Some(set) if !set.contains(&node.id) => DIMMED_NODE_OPACITY,
                _ => 1.0,
            };
            let shown = node.data.columns.len().min(column_limit);
            ViewNode {
                id: node.id.clone(),
                position: node.position,
                table_name: node.data.table_name.clone(),
                group: node.data.group,
                columns: node.data.columns[..shown].to_vec(),
                hidden_column_count: node.data.columns.len() - shown,
                sample_preview: node
                    .data
                    .sample_rows
                    .iter()
                    .take(SAMPLE_PREVIEW_ROWS)
                    .cloned()
                    .collect(),
                opacity,
                connectable: edit_mode,
                editable: edit_mode,
                selected: session.selected_nodes().contains(&node.id),
                display_size: size,
            }
        })
        .collect();

    let edges = diagram
        .edges()
        .iter()
        // Dangling edges (endpoint deleted) are not drawn; the store keeps
        // them, the view resolves and skips.
        .filter(|edge| diagram.contains_node(&edge.source) && diagram.contains_node(&edge.target))
        .map(|edge| {
            let style = match &connected {
                Some(set) => {
                    if edge_connected(edge, set) {
                        EdgeStyle::emphasis()
                    } else {
                        EdgeStyle::muted()
                    }
                }
                None => EdgeStyle::neutral(),
            };
            ViewEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
                style,
            }
        })
        .collect();

    RenderView {
        nodes,
        edges,
        edit_mode,
    }
}

// =============================================================================
// TESTS
// =============================================================================
