//! # Innate Primitives
//!
//! Hardcoded runtime constants for the erdview diagram engine.
//!
//! These are compiled into the binary and immutable at runtime. Layout
//! offsets and styling values are part of the observable contract with the
//! render layer, not tunables.

// =============================================================================
// PERSISTENCE FORMAT
// =============================================================================

/// Magic bytes for the erdview binary snapshot header.
///
/// File Header = Magic Bytes ("ERDV") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"ERDV";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the snapshot format.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum allowed payload size for the snapshot format.
///
/// Validated BEFORE deserialization. Diagrams are dozens of tables; 64 MB
/// is far beyond any legitimate snapshot.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// LAYOUT OFFSETS
// =============================================================================

/// Horizontal offset for nodes synthesized by catalog reconciliation:
/// placed right of the rightmost existing node.
pub const CATALOG_OFFSET_X: f64 = 100.0;

/// Vertical spacing between consecutive catalog-synthesized nodes.
pub const CATALOG_SPACING_Y: f64 = 90.0;

/// Offset of a form-added table relative to the last existing node.
pub const ADD_TABLE_OFFSET: f64 = 80.0;

/// Position of the first node added to an empty diagram.
pub const FALLBACK_POSITION: (f64, f64) = (100.0, 100.0);

// =============================================================================
// COLUMN DEFAULTS
// =============================================================================

/// Default column type for form-entered columns with no type given.
pub const DEFAULT_FORM_COLUMN_TYPE: &str = "varchar(100)";

/// Default column type for catalog columns with no type given.
pub const DEFAULT_CATALOG_COLUMN_TYPE: &str = "TEXT";

/// Maximum length accepted for a node id, table name, or column name.
///
/// Longer submissions are blocked the same way blank ones are.
pub const MAX_IDENTIFIER_LENGTH: usize = 256;

// =============================================================================
// HIGHLIGHT STYLING
// =============================================================================

/// Opacity of nodes outside the hovered connectivity set.
pub const DIMMED_NODE_OPACITY: f64 = 0.35;

/// Opacity of edges outside the hovered connectivity set.
pub const DIMMED_EDGE_OPACITY: f64 = 0.3;

/// Stroke color of edges inside the hovered connectivity set.
pub const EMPHASIS_STROKE_COLOR: &str = "#3182CE";

/// Stroke color of edges outside the hovered connectivity set.
pub const MUTED_STROKE_COLOR: &str = "#9ca3af";

/// Stroke width of edges inside the hovered connectivity set.
pub const EMPHASIS_STROKE_WIDTH: f64 = 2.5;

/// Stroke width of edges outside the hovered connectivity set.
pub const MUTED_STROKE_WIDTH: f64 = 1.5;

/// How many sample rows the per-node preview shows.
pub const SAMPLE_PREVIEW_ROWS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"ERDV");
    }

    #[test]
    fn emphasis_stronger_than_muted() {
        assert!(EMPHASIS_STROKE_WIDTH > MUTED_STROKE_WIDTH);
        assert!(DIMMED_NODE_OPACITY < 1.0);
        assert!(DIMMED_EDGE_OPACITY < 1.0);
    }
}
