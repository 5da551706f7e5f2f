//! # erdview CLI Module
//!
//! This module implements the CLI interface for erdview.
//!
//! ## Available Commands
//!
//! - `status` - Show diagram status
//! - `show` - Print the rendered diagram (optionally with hover highlight)
//! - `sync` - Pull the CRM catalog and reconcile it into the diagram
//! - `serve` - Serve the catalog JSON to the diagram viewer
//! - `add-table` - Add a table through the editor form
//! - `connect` - Draw a relationship between two tables
//! - `remove` - Delete tables and/or relationships
//! - `reset` - Restore the built-in default diagram
//! - `set-size` - Set the entity display-size preference
//! - `export` - Export the diagram snapshot to a file
//! - `import` - Import a diagram snapshot from a file
//! - `init` - Initialize a new state database

mod commands;

use clap::{Parser, Subcommand};
use erdview_core::ErdError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// erdview - ERD viewer backend
///
/// Renders and edits an entity-relationship diagram of the CRM tables and
/// keeps it synchronized with the externally loaded table catalog.
#[derive(Parser, Debug)]
#[command(name = "erdview")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the diagram state database
    #[arg(short = 'D', long, global = true, default_value = "erdview.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "file" (snapshot file)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show diagram status
    Status,

    /// Print the rendered diagram
    Show {
        /// Highlight everything connected to this table id
        #[arg(long)]
        hover: Option<String>,
    },

    /// Pull the CRM catalog and reconcile it into the diagram
    Sync {
        /// Catalog API base URL (falls back to ERD_API_URL, then localhost)
        #[arg(short, long)]
        base_url: Option<String>,
    },

    /// Serve the catalog JSON to the diagram viewer
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8765")]
        port: u16,

        /// Path of the catalog JSON file to serve
        #[arg(short, long, default_value = "erd_tables.json")]
        tables: PathBuf,
    },

    /// Add a table through the editor form
    AddTable {
        /// Table id (stable, unique)
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Group: basic or financial
        #[arg(short, long, default_value = "basic")]
        group: String,

        /// Column specs: name:type[:pk][:fk=target] (repeatable)
        #[arg(short, long)]
        column: Vec<String>,
    },

    /// Draw a relationship between two tables
    Connect {
        /// Source table id
        #[arg(short, long)]
        source: String,

        /// Target table id
        #[arg(short, long)]
        target: String,

        /// Source column handle (labels the relationship)
        #[arg(long)]
        source_handle: Option<String>,

        /// Target column handle (labels the relationship)
        #[arg(long)]
        target_handle: Option<String>,
    },

    /// Delete tables and/or relationships
    Remove {
        /// Table ids to delete (their edges dangle, by design)
        #[arg(short, long)]
        node: Vec<String>,

        /// Edge ids to delete
        #[arg(short, long)]
        edge: Vec<String>,
    },

    /// Restore the built-in default diagram (discards edits)
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Set the entity display-size preference
    SetSize {
        /// small, medium or large
        size: String,
    },

    /// Export the diagram snapshot to a file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a diagram snapshot from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new state database with the default diagram
    Init {
        /// Force initialization even if state exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ErdError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&cli.database, backend, json_mode),
        Some(Commands::Show { hover }) => {
            cmd_show(&cli.database, backend, json_mode, hover.as_deref())
        }
        Some(Commands::Sync { base_url }) => {
            cmd_sync(&cli.database, backend, json_mode, base_url).await
        }
        Some(Commands::Serve { host, port, tables }) => cmd_serve(&host, port, tables).await,
        Some(Commands::AddTable {
            id,
            name,
            group,
            column,
        }) => cmd_add_table(&cli.database, backend, &id, &name, &group, &column),
        Some(Commands::Connect {
            source,
            target,
            source_handle,
            target_handle,
        }) => cmd_connect(
            &cli.database,
            backend,
            &source,
            &target,
            source_handle,
            target_handle,
        ),
        Some(Commands::Remove { node, edge }) => cmd_remove(&cli.database, backend, &node, &edge),
        Some(Commands::Reset { force }) => cmd_reset(&cli.database, backend, force),
        Some(Commands::SetSize { size }) => cmd_set_size(&cli.database, backend, &size),
        Some(Commands::Export { output }) => cmd_export(&cli.database, backend, &output),
        Some(Commands::Import { input }) => cmd_import(&cli.database, backend, &input),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
    }
}
