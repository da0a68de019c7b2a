//! # Quorum CLI Module
//!
//! Every invocation loads the given fact and rule files into a fresh
//! knowledge map, then runs one command against it.
//!
//! ## Available Commands
//!
//! - `status` - Show store statistics
//! - `query` - Match a pattern, with optional qualifiers
//! - `references` - Projected facts exactly N hops from an entity
//! - `layers` - One hop layer per depth below N
//! - `classify` - Score the features of a class
//! - `intersect` - What two entities both reach
//! - `shared` - `intersect` under the standard projections
//! - `compare` - What one entity shares with all others
//! - `infer` - Run forward-chaining passes and print new facts

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use quorum_core::QuorumError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Quorum - triple store with chained qualifiers
///
/// Loads `name relation node` facts and answers pattern, traversal,
/// classification and comparison queries over them.
#[derive(Parser, Debug)]
#[command(name = "quorum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fact file, one statement per line (repeatable)
    #[arg(short, long = "facts", global = true)]
    pub facts: Vec<PathBuf>,

    /// Rule file, one rule per line (repeatable)
    #[arg(short, long = "rules", global = true)]
    pub rules: Vec<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

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
    /// Show store statistics
    Status,

    /// Match a pattern such as `* likes cake | when: * at party`
    Query {
        /// Pattern words; joined with spaces
        #[arg(required = true, num_args = 1..)]
        pattern: Vec<String>,
    },

    /// Projected facts exactly DEPTH hops from ROOT
    References {
        root: String,

        /// Number of hops
        #[arg(short, long, default_value = "0")]
        depth: usize,

        /// Projection: entries, name, relation, node or a tuple like relation,node
        #[arg(short, long, default_value = "name")]
        attr: String,
    },

    /// Unprojected hop layers for every depth below DEPTH
    Layers {
        root: String,

        #[arg(short, long, default_value = "3")]
        depth: usize,
    },

    /// Score (relation, node) features of a class
    Classify {
        class: String,

        /// Membership template with a `{}` hole (default from config)
        #[arg(short, long)]
        template: Option<String>,
    },

    /// What A and B both reach at DEPTH
    Intersect {
        a: String,
        b: String,

        #[arg(short, long, default_value = "1")]
        depth: usize,

        #[arg(short, long, default_value = "name")]
        attr: String,
    },

    /// `intersect` under (relation, node), name, relation and node
    Shared {
        a: String,
        b: String,

        #[arg(short, long, default_value = "1")]
        depth: usize,
    },

    /// What A has in common with every one of OTHERS
    Compare {
        a: String,

        #[arg(required = true, num_args = 1..)]
        others: Vec<String>,

        #[arg(short, long, default_value = "0")]
        depth: usize,
    },

    /// Run inference passes, stopping early once nothing new appears
    Infer {
        /// Number of passes (default from config)
        #[arg(short, long)]
        passes: Option<usize>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), QuorumError> {
    let config = Config::load(cli.config.as_deref())?;
    let mut kmap = load_knowledge_map(&config, &cli.facts, &cli.rules)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&kmap, &config, json_mode),
        Some(Commands::Query { pattern }) => cmd_query(&kmap, json_mode, &pattern.join(" ")),
        Some(Commands::References { root, depth, attr }) => {
            cmd_references(&kmap, &config, json_mode, &root, depth, &attr)
        }
        Some(Commands::Layers { root, depth }) => {
            cmd_layers(&kmap, &config, json_mode, &root, depth)
        }
        Some(Commands::Classify { class, template }) => {
            cmd_classify(&kmap, &config, json_mode, &class, template.as_deref())
        }
        Some(Commands::Intersect { a, b, depth, attr }) => {
            cmd_intersect(&kmap, &config, json_mode, &a, &b, depth, &attr)
        }
        Some(Commands::Shared { a, b, depth }) => {
            cmd_shared(&kmap, &config, json_mode, &a, &b, depth)
        }
        Some(Commands::Compare { a, others, depth }) => {
            cmd_compare(&kmap, &config, json_mode, &a, others, depth)
        }
        Some(Commands::Infer { passes }) => {
            let passes = passes.unwrap_or(config.inference.passes);
            cmd_infer(&mut kmap, json_mode, passes)
        }
    }
}
