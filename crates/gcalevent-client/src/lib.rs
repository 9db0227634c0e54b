//! CLI, configuration, output rendering
//!
//! This crate provides the `gcalevent` command-line interface: one
//! subcommand per event operation, run against Google Calendar or, with
//! `--dry-run`, against in-memory backends.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
