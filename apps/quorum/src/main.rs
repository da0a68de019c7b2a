//! # Quorum
//!
//! Command-line binary for the `quorum-core` knowledge map.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/quorum (THE BINARY)          │
//! │                                              │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────┐  │
//! │  │    CLI     │ │   Config   │ │  Loader  │  │
//! │  │   (clap)   │ │   (toml)   │ │ (files)  │  │
//! │  └─────┬──────┘ └─────┬──────┘ └────┬─────┘  │
//! │        └──────────────┼─────────────┘        │
//! │                       ▼                      │
//! │               ┌──────────────┐               │
//! │               │ quorum-core  │               │
//! │               │ (THE LOGIC)  │               │
//! │               └──────────────┘               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! quorum -f facts.txt status
//! quorum -f facts.txt query '*' likes cake
//! quorum -f facts.txt references alice -d 1 -a relation,node
//! quorum -f facts.txt classify person
//! quorum -f facts.txt -r rules.txt infer --passes 3
//! ```

use clap::Parser;
use quorum::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // QUORUM_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("QUORUM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "quorum=debug"
    } else {
        "quorum=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so command output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
