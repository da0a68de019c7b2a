//! # Quorum
//!
//! Command-line front end for the `quorum-core` knowledge map.
//!
//! - `cli`: argument parsing, fact/rule file loading, command output
//! - `config`: the optional TOML configuration file

pub mod cli;
pub mod config;
