//! # redb-backed State Store
//!
//! The durable keyed blob store for diagram state, using the redb embedded
//! database: ACID transactions, crash safety, zero configuration.
//!
//! One table holds two fixed keys:
//! - `diagram` — the `{nodes, edges}` snapshot in the binary format
//! - `display_size` — the independent entity-size preference
//!
//! Loading degrades, never fails the application: an absent or corrupt
//! snapshot falls back to the built-in default diagram, an absent or invalid
//! display size falls back to Medium. Write failures are surfaced to the
//! caller, which logs and drops them.

use crate::defaults::default_diagram;
use crate::formats::{diagram_from_bytes, diagram_to_bytes};
use crate::graph::Diagram;
use crate::types::{DisplaySize, ErdError};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for diagram state: fixed key -> blob.
const STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("erd_state");

/// Key of the `{nodes, edges}` snapshot blob.
const DIAGRAM_KEY: &str = "diagram";

/// Key of the display-size scalar.
const DISPLAY_SIZE_KEY: &str = "display_size";

// =============================================================================
// ERROR LOGGING HELPER
// =============================================================================

/// Log a storage error and fall back to a default value.
///
/// Storage failures must never crash the application; they degrade to
/// defaults, but never silently. The core avoids a tracing dependency, so
/// this emits the structured-stderr form the app layer knows how to collect.
fn log_and_default<T>(result: Result<T, ErdError>, context: &str, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!(
                "{{\"level\":\"warn\",\"target\":\"erdview_core::storage\",\"message\":\"storage error in {}: {}\"}}",
                context, e
            );
            fallback()
        }
    }
}

// =============================================================================
// REDB STORE
// =============================================================================

/// A disk-backed keyed store for diagram state.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a state database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ErdError> {
        let db = Database::create(path.as_ref()).map_err(|e| ErdError::Io(e.to_string()))?;

        // Initialize the table if it doesn't exist
        {
            let write_txn = db.begin_write().map_err(|e| ErdError::Io(e.to_string()))?;
            let _ = write_txn
                .open_table(STATE)
                .map_err(|e| ErdError::Io(e.to_string()))?;
            write_txn.commit().map_err(|e| ErdError::Io(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Read a raw blob by key.
    fn read_blob(&self, key: &str) -> Result<Option<Vec<u8>>, ErdError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| ErdError::Io(e.to_string()))?;
        let table = read_txn
            .open_table(STATE)
            .map_err(|e| ErdError::Io(e.to_string()))?;
        let value = table
            .get(key)
            .map_err(|e| ErdError::Io(e.to_string()))?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    /// Write a raw blob under a key in one committed transaction.
    fn write_blob(&self, key: &str, bytes: &[u8]) -> Result<(), ErdError> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| ErdError::Io(e.to_string()))?;
        {
            let mut table = write_txn
                .open_table(STATE)
                .map_err(|e| ErdError::Io(e.to_string()))?;
            table
                .insert(key, bytes)
                .map_err(|e| ErdError::Io(e.to_string()))?;
        }
        write_txn.commit().map_err(|e| ErdError::Io(e.to_string()))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Diagram snapshot
    // -------------------------------------------------------------------------

    /// Load the stored diagram snapshot. `None` when nothing was stored yet.
    pub fn load_diagram(&self) -> Result<Option<Diagram>, ErdError> {
        match self.read_blob(DIAGRAM_KEY)? {
            Some(bytes) => Ok(Some(diagram_from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the stored diagram, degrading to the built-in default on absence
    /// or corruption.
    #[must_use]
    pub fn load_diagram_or_default(&self) -> Diagram {
        log_and_default(
            self.load_diagram().map(|d| d.unwrap_or_else(default_diagram)),
            "load_diagram",
            default_diagram,
        )
    }

    /// Persist the diagram snapshot.
    pub fn save_diagram(&self, diagram: &Diagram) -> Result<(), ErdError> {
        let bytes = diagram_to_bytes(diagram)?;
        self.write_blob(DIAGRAM_KEY, &bytes)
    }

    // -------------------------------------------------------------------------
    // Display-size preference
    // -------------------------------------------------------------------------

    /// Load the display-size preference, degrading to Medium on absence,
    /// invalid content, or read failure.
    #[must_use]
    pub fn load_display_size(&self) -> DisplaySize {
        log_and_default(
            self.read_blob(DISPLAY_SIZE_KEY).map(|stored| {
                stored
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .map(|s| DisplaySize::parse_or_default(&s))
                    .unwrap_or_default()
            }),
            "load_display_size",
            DisplaySize::default,
        )
    }

    /// Persist the display-size preference.
    pub fn save_display_size(&self, size: DisplaySize) -> Result<(), ErdError> {
        self.write_blob(DISPLAY_SIZE_KEY, size.as_str().as_bytes())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn temp_store() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RedbStore::open(dir.path().join("state.db")).expect("open");
        (dir, store)
    }

    #[test]
    fn empty_store_loads_nothing() {
        let (_dir, store) = temp_store();
        assert!(store.load_diagram().expect("load").is_none());
        assert_eq!(store.load_display_size(), DisplaySize::Medium);
    }

    #[test]
    fn empty_store_defaults_to_builtin_diagram() {
        let (_dir, store) = temp_store();
        let diagram = store.load_diagram_or_default();
        assert!(diagram.contains_node(&NodeId::new("customer")));
    }

    #[test]
    fn diagram_roundtrip() {
        let (_dir, store) = temp_store();
        let diagram = default_diagram();

        store.save_diagram(&diagram).expect("save");
        let loaded = store.load_diagram().expect("load").expect("present");

        assert_eq!(loaded, diagram);
    }

    #[test]
    fn display_size_roundtrip_and_independence() {
        let (_dir, store) = temp_store();
        store.save_display_size(DisplaySize::Large).expect("save");

        assert_eq!(store.load_display_size(), DisplaySize::Large);
        // The diagram key is untouched by the preference write.
        assert!(store.load_diagram().expect("load").is_none());
    }

    #[test]
    fn invalid_display_size_falls_back_to_medium() {
        let (_dir, store) = temp_store();
        store
            .write_blob(DISPLAY_SIZE_KEY, b"enormous")
            .expect("write");
        assert_eq!(store.load_display_size(), DisplaySize::Medium);
    }

    #[test]
    fn corrupt_diagram_blob_degrades_to_default() {
        let (_dir, store) = temp_store();
        store
            .write_blob(DIAGRAM_KEY, b"not a snapshot")
            .expect("write");

        assert!(store.load_diagram().is_err());
        let fallback = store.load_diagram_or_default();
        assert!(fallback.contains_node(&NodeId::new("customer")));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let (_dir, store) = temp_store();
        store.save_diagram(&default_diagram()).expect("save");
        store.save_diagram(&Diagram::new()).expect("save again");

        let loaded = store.load_diagram().expect("load").expect("present");
        assert_eq!(loaded.node_count(), 0);
    }
}
