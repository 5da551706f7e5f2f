//! # erdview - ERD Viewer Backend
//!
//! The main binary for the erdview diagram engine.
//!
//! This application provides:
//! - CLI interface over the diagram session (browse, edit, reset)
//! - Catalog sync against the CRM export endpoint
//! - Catalog HTTP server for the diagram viewer
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                  apps/erdview (THE BINARY)                 │
//! │                                                            │
//! │  ┌──────────┐   ┌───────────────┐   ┌──────────────────┐  │
//! │  │   CLI    │   │ Catalog fetch │   │  Catalog server  │  │
//! │  │  (clap)  │   │   (reqwest)   │   │     (axum)       │  │
//! │  └────┬─────┘   └──────┬────────┘   └────────┬─────────┘  │
//! │       │                │                     │             │
//! │       └────────────────┼─────────────────────┘             │
//! │                        ▼                                   │
//! │                ┌───────────────┐                           │
//! │                │ erdview-core  │                           │
//! │                │  (THE LOGIC)  │                           │
//! │                └───────────────┘                           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Show the diagram, highlighting what connects to a table
//! erdview show --hover customer
//!
//! # Pull the CRM catalog into the diagram
//! erdview sync --base-url http://localhost:8765
//!
//! # Serve the catalog to the viewer
//! erdview serve --host 127.0.0.1 --port 8765
//! ```

use clap::Parser;
use erdview::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — ERDVIEW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ERDVIEW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "erdview=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the erdview startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─────────┐      ┌─────────┐
  │ erdview ├──────┤ v{:<7}│
  └─────────┘      └─────────┘

  Tables • Relationships • Catalog Sync
"#,
        env!("CARGO_PKG_VERSION")
    );
}
