//! # CLI Command Implementations
//!
//! Each command is one sequential pass over the diagram session: open the
//! store, load the snapshot, drive the editor, persist if the revision
//! advanced. Persistence failures are logged and dropped — they never fail
//! a command that already committed its in-memory change.

use crate::api;
use crate::api::client::CatalogClient;
use erdview_core::{
    ColumnDraft, ConnectionRequest, Diagram, DisplaySize, EdgeId, EditorSession, ErdError, Mode,
    NodeId, RedbStore, SyncStatus, TableGroup, diagram_from_bytes, diagram_to_bytes, render_view,
};
use std::io::Write as _;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for snapshot import (64 MB, matching the payload cap).
const MAX_IMPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Default catalog API base URL, matching the CRM export server's port.
const DEFAULT_BASE_URL: &str = "http://localhost:8765";

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ErdError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ErdError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ErdError::Deserialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// STATE STORE (redb | file backend)
// =============================================================================

/// The durable store behind a session: redb keyed blobs or plain files.
pub enum StateStore {
    Redb(RedbStore),
    File {
        /// Snapshot file path.
        diagram: PathBuf,
        /// Sidecar file holding the display-size scalar.
        size: PathBuf,
    },
}

impl StateStore {
    /// Open the store selected by `--backend`.
    pub fn open(database: &Path, backend: &str) -> Result<Self, ErdError> {
        match backend {
            "redb" => Ok(Self::Redb(RedbStore::open(database)?)),
            "file" => Ok(Self::File {
                diagram: database.to_path_buf(),
                size: database.with_extension("size"),
            }),
            other => Err(ErdError::Io(format!(
                "unknown backend '{}' (expected 'redb' or 'file')",
                other
            ))),
        }
    }

    /// True when some diagram state already exists at this location.
    /// Both backends anchor their state at the database path itself.
    pub fn exists(database: &Path, _backend: &str) -> bool {
        database.exists()
    }

    /// Load the stored diagram, degrading to the built-in default on absence
    /// or corruption.
    pub fn load_diagram_or_default(&self) -> Diagram {
        match self {
            Self::Redb(store) => store.load_diagram_or_default(),
            Self::File { diagram, .. } => match std::fs::read(diagram) {
                Ok(bytes) => diagram_from_bytes(&bytes).unwrap_or_else(|e| {
                    tracing::warn!("corrupt snapshot {}: {}", diagram.display(), e);
                    erdview_core::default_diagram()
                }),
                Err(_) => erdview_core::default_diagram(),
            },
        }
    }

    /// Load the display-size preference, degrading to Medium.
    pub fn load_display_size(&self) -> DisplaySize {
        match self {
            Self::Redb(store) => store.load_display_size(),
            Self::File { size, .. } => std::fs::read_to_string(size)
                .map(|s| DisplaySize::parse_or_default(s.trim()))
                .unwrap_or_default(),
        }
    }

    /// Persist the diagram snapshot.
    pub fn save_diagram(&self, diagram: &Diagram) -> Result<(), ErdError> {
        match self {
            Self::Redb(store) => store.save_diagram(diagram),
            Self::File { diagram: path, .. } => {
                let bytes = diagram_to_bytes(diagram)?;
                std::fs::write(path, bytes).map_err(|e| ErdError::Io(e.to_string()))
            }
        }
    }

    /// Persist the display-size preference.
    pub fn save_display_size(&self, size: DisplaySize) -> Result<(), ErdError> {
        match self {
            Self::Redb(store) => store.save_display_size(size),
            Self::File { size: path, .. } => {
                std::fs::write(path, size.as_str()).map_err(|e| ErdError::Io(e.to_string()))
            }
        }
    }
}

/// Open the store and build a session over its state.
fn load_session(database: &Path, backend: &str) -> Result<(StateStore, EditorSession), ErdError> {
    let store = StateStore::open(database, backend)?;
    let mut session = EditorSession::with_diagram(store.load_diagram_or_default());
    session.set_display_size(store.load_display_size());
    Ok((store, session))
}

/// Write the diagram back if the session committed anything.
///
/// Persistence is fire-and-forget: a write failure is logged at warn and
/// dropped, never surfaced as a command failure.
fn persist_if_changed(store: &StateStore, session: &EditorSession, initial_revision: u64) {
    if session.revision() == initial_revision {
        return;
    }
    if let Err(e) = store.save_diagram(session.diagram()) {
        tracing::warn!("failed to persist diagram: {}", e);
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show diagram status.
pub fn cmd_status(database: &Path, backend: &str, json_mode: bool) -> Result<(), ErdError> {
    let (_store, session) = load_session(database, backend)?;
    let diagram = session.diagram();

    let dangling = diagram
        .edges()
        .iter()
        .filter(|e| !diagram.contains_node(&e.source) || !diagram.contains_node(&e.target))
        .count();

    if json_mode {
        let output = serde_json::json!({
            "database": database.to_string_lossy(),
            "backend": backend,
            "node_count": diagram.node_count(),
            "edge_count": diagram.edge_count(),
            "dangling_edges": dangling,
            "display_size": session.display_size().as_str(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("erdview Diagram Status");
    println!("======================");
    println!("Database: {:?}", database);
    println!("Backend:  {}", backend);
    println!();
    println!("Tables:         {}", diagram.node_count());
    println!("Relationships:  {}", diagram.edge_count());
    println!("Dangling edges: {}", dangling);
    println!("Display size:   {}", session.display_size().as_str());

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print the rendered diagram, optionally with a hover highlight applied.
pub fn cmd_show(
    database: &Path,
    backend: &str,
    json_mode: bool,
    hover: Option<&str>,
) -> Result<(), ErdError> {
    let (_store, mut session) = load_session(database, backend)?;

    if let Some(id) = hover {
        let id = NodeId::new(id);
        if !session.diagram().contains_node(&id) {
            tracing::warn!("hover target '{}' is not in the diagram", id);
        }
        session.hover(Some(id));
    }

    let view = render_view(&session);

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&view)
                .map_err(|e| ErdError::Serialization(e.to_string()))?
        );
        return Ok(());
    }

    for node in &view.nodes {
        let marker = if node.opacity < 1.0 { "·" } else { "●" };
        println!(
            "{} {} ({}) [{}] @ ({:.0}, {:.0})",
            marker,
            node.table_name,
            node.id,
            node.group.as_str(),
            node.position.x,
            node.position.y
        );
        for col in &node.columns {
            let mut flags = String::new();
            if col.pk {
                flags.push_str(" PK");
            }
            if let Some(fk) = &col.fk {
                flags.push_str(&format!(" FK→{}", fk));
            }
            println!("    {} {}{}", col.name, col.ty, flags);
        }
        if node.hidden_column_count > 0 {
            println!("    … and {} more columns", node.hidden_column_count);
        }
    }

    println!();
    for edge in &view.edges {
        let marker = if edge.style.opacity < 1.0 { "·" } else { "●" };
        println!("{} {} → {}  ({})", marker, edge.source, edge.target, edge.label);
    }

    Ok(())
}

// =============================================================================
// SYNC COMMAND
// =============================================================================

/// Pull the CRM catalog and reconcile it into the diagram.
pub async fn cmd_sync(
    database: &Path,
    backend: &str,
    json_mode: bool,
    base_url: Option<String>,
) -> Result<(), ErdError> {
    let base_url = base_url
        .or_else(|| std::env::var("ERD_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let (store, mut session) = load_session(database, backend)?;
    let initial_revision = session.revision();

    // One fetch per invocation; the session guard is what keeps an
    // interactive frontend from double-triggering.
    if !session.begin_sync() {
        return Ok(());
    }

    let client = CatalogClient::new(base_url);
    let result = match client.fetch_tables().await {
        Ok(catalog) => Ok(catalog.tables),
        Err(e) => Err(client.remediation(&e)),
    };
    session.finish_sync(result);

    persist_if_changed(&store, &session, initial_revision);

    let sync = session.sync();
    if json_mode {
        let output = serde_json::json!({
            "status": match sync.status {
                SyncStatus::Ok => "ok",
                SyncStatus::Error => "error",
                SyncStatus::Loading => "loading",
                SyncStatus::Idle => "idle",
            },
            "message": sync.message,
            "node_count": session.diagram().node_count(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else if sync.status == SyncStatus::Error {
        println!("Sync failed: {}", sync.message);
    } else {
        println!("{}", sync.message);
    }

    // Sync failures are recovered locally; the command itself succeeds.
    Ok(())
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Serve the catalog JSON to the diagram viewer.
pub async fn cmd_serve(host: &str, port: u16, tables: PathBuf) -> Result<(), ErdError> {
    println!("erdview Catalog Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:    {}", host);
    println!("  Port:    {}", port);
    println!("  Catalog: {:?}", tables);
    println!();
    println!("Endpoints:");
    println!("  GET /erd_tables.json - Catalog for the diagram viewer");
    println!("  GET /health          - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, api::AppState::new(tables)).await
}

// =============================================================================
// EDIT COMMANDS
// =============================================================================

/// Parse a column spec of the form `name:type[:pk][:fk=target]`.
fn parse_column_spec(spec: &str) -> ColumnDraft {
    let mut parts = spec.split(':');
    let mut draft = ColumnDraft {
        name: parts.next().unwrap_or_default().to_string(),
        ..ColumnDraft::default()
    };
    if let Some(ty) = parts.next() {
        if !ty.is_empty() {
            draft.ty = ty.to_string();
        }
    }
    for flag in parts {
        if flag == "pk" {
            draft.pk = true;
        } else if let Some(target) = flag.strip_prefix("fk=") {
            draft.fk = target.to_string();
        }
    }
    draft
}

/// Add a table through the editor form.
pub fn cmd_add_table(
    database: &Path,
    backend: &str,
    id: &str,
    name: &str,
    group: &str,
    columns: &[String],
) -> Result<(), ErdError> {
    let group: TableGroup = group.parse()?;

    let (store, mut session) = load_session(database, backend)?;
    let initial_revision = session.revision();

    session.set_mode(Mode::Edit);
    session.open_add_table();
    if let Some(form) = session.form_mut() {
        form.id = id.to_string();
        form.table_name = name.to_string();
        form.group = group;
        form.columns = columns.iter().map(|s| parse_column_spec(s)).collect();
    }

    if session.submit_add_table() {
        persist_if_changed(&store, &session, initial_revision);
        println!("Added table '{}' ({} total)", id, session.diagram().node_count());
    } else {
        // The form blocks silently; the CLI at least names the likely cause.
        println!(
            "Table not added: id and name must be non-blank and the id unused ('{}')",
            id
        );
    }
    Ok(())
}

/// Draw a relationship between two tables.
pub fn cmd_connect(
    database: &Path,
    backend: &str,
    source: &str,
    target: &str,
    source_handle: Option<String>,
    target_handle: Option<String>,
) -> Result<(), ErdError> {
    let (store, mut session) = load_session(database, backend)?;
    let initial_revision = session.revision();

    session.set_mode(Mode::Edit);
    let connected = session.connect(&ConnectionRequest {
        source: NodeId::new(source),
        target: NodeId::new(target),
        source_handle,
        target_handle,
    });

    if connected {
        persist_if_changed(&store, &session, initial_revision);
        let edge = session.diagram().edges().last();
        println!(
            "Connected {} → {} ({})",
            source,
            target,
            edge.map(|e| e.label.as_str()).unwrap_or_default()
        );
    } else {
        println!("Not connected: both tables must exist ('{}', '{}')", source, target);
    }
    Ok(())
}

/// Delete tables and/or relationships.
pub fn cmd_remove(
    database: &Path,
    backend: &str,
    nodes: &[String],
    edges: &[String],
) -> Result<(), ErdError> {
    let (store, mut session) = load_session(database, backend)?;
    let initial_revision = session.revision();

    session.set_mode(Mode::Edit);
    for id in nodes {
        session.select_node(&NodeId::new(id.as_str()));
    }
    for id in edges {
        session.select_edge(&EdgeId::new(id.as_str()));
    }

    if session.delete_selection() {
        persist_if_changed(&store, &session, initial_revision);
        println!(
            "Removed. Tables: {}, relationships: {} (dangling edges are kept)",
            session.diagram().node_count(),
            session.diagram().edge_count()
        );
    } else {
        println!("Nothing removed: no matching tables or relationships");
    }
    Ok(())
}

/// Restore the built-in default diagram after explicit confirmation.
pub fn cmd_reset(database: &Path, backend: &str, force: bool) -> Result<(), ErdError> {
    if !force && !confirm("This restores the default diagram and discards all edits. Continue?")? {
        println!("Reset cancelled");
        return Ok(());
    }

    let (store, mut session) = load_session(database, backend)?;
    let initial_revision = session.revision();

    session.reset();
    persist_if_changed(&store, &session, initial_revision);
    println!(
        "Diagram reset to default ({} tables, {} relationships)",
        session.diagram().node_count(),
        session.diagram().edge_count()
    );
    Ok(())
}

/// Ask the user a yes/no question on stdin.
fn confirm(prompt: &str) -> Result<bool, ErdError> {
    print!("{} [y/N] ", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| ErdError::Io(e.to_string()))?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| ErdError::Io(e.to_string()))?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Set the entity display-size preference.
pub fn cmd_set_size(database: &Path, backend: &str, size: &str) -> Result<(), ErdError> {
    let size: DisplaySize = size.parse()?;
    let store = StateStore::open(database, backend)?;
    if let Err(e) = store.save_display_size(size) {
        tracing::warn!("failed to persist display size: {}", e);
    }
    println!("Display size set to {}", size.as_str());
    Ok(())
}

// =============================================================================
// EXPORT / IMPORT / INIT
// =============================================================================

/// Export the diagram snapshot to a file.
pub fn cmd_export(database: &Path, backend: &str, output: &Path) -> Result<(), ErdError> {
    let (_store, session) = load_session(database, backend)?;
    let bytes = diagram_to_bytes(session.diagram())?;
    std::fs::write(output, &bytes).map_err(|e| ErdError::Io(e.to_string()))?;
    println!(
        "Exported {} tables, {} relationships to {:?} ({} bytes)",
        session.diagram().node_count(),
        session.diagram().edge_count(),
        output,
        bytes.len()
    );
    Ok(())
}

/// Import a diagram snapshot from a file, replacing the stored state.
pub fn cmd_import(database: &Path, backend: &str, input: &Path) -> Result<(), ErdError> {
    validate_file_size(input, MAX_IMPORT_FILE_SIZE)?;
    let bytes = std::fs::read(input).map_err(|e| ErdError::Io(e.to_string()))?;
    let diagram = diagram_from_bytes(&bytes)?;

    let store = StateStore::open(database, backend)?;
    store.save_diagram(&diagram)?;
    println!(
        "Imported {} tables, {} relationships from {:?}",
        diagram.node_count(),
        diagram.edge_count(),
        input
    );
    Ok(())
}

/// Initialize a new state database with the default diagram.
pub fn cmd_init(database: &Path, backend: &str, force: bool) -> Result<(), ErdError> {
    if StateStore::exists(database, backend) && !force {
        return Err(ErdError::Io(format!(
            "state already exists at {:?} (use --force to overwrite)",
            database
        )));
    }

    let store = StateStore::open(database, backend)?;
    let diagram = erdview_core::default_diagram();
    store.save_diagram(&diagram)?;
    store.save_display_size(DisplaySize::default())?;
    println!(
        "Initialized {:?} with the default diagram ({} tables)",
        database,
        diagram.node_count()
    );
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_spec_parsing() {
        let plain = parse_column_spec("amount:numeric(18,2)");
        assert_eq!(plain.name, "amount");
        assert_eq!(plain.ty, "numeric(18,2)");
        assert!(!plain.pk);
        assert!(plain.fk.is_empty());

        let keyed = parse_column_spec("id:bigint:pk");
        assert!(keyed.pk);

        let reference = parse_column_spec("customer_id:bigint:fk=customer.id");
        assert_eq!(reference.fk, "customer.id");

        // Name only: the form's default type applies.
        let bare = parse_column_spec("memo");
        assert_eq!(bare.name, "memo");
        assert_eq!(bare.ty, "varchar(100)");
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("erd.snapshot");
        let store = StateStore::open(&db, "file").expect("open");

        // Nothing stored yet: defaults apply.
        assert_eq!(store.load_display_size(), DisplaySize::Medium);
        let diagram = store.load_diagram_or_default();
        assert!(diagram.node_count() > 0);

        store.save_diagram(&diagram).expect("save");
        store.save_display_size(DisplaySize::Small).expect("save size");

        let reopened = StateStore::open(&db, "file").expect("reopen");
        assert_eq!(reopened.load_diagram_or_default(), diagram);
        assert_eq!(reopened.load_display_size(), DisplaySize::Small);
    }

    #[test]
    fn unknown_backend_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(StateStore::open(&dir.path().join("x"), "sqlite").is_err());
    }

    #[test]
    fn corrupt_file_snapshot_degrades_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("erd.snapshot");
        std::fs::write(&db, b"garbage").expect("write");

        let store = StateStore::open(&db, "file").expect("open");
        let diagram = store.load_diagram_or_default();
        assert!(diagram.contains_node(&NodeId::new("customer")));
    }
}
