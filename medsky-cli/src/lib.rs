//! Command-line front end for the medsky pipeline.
//!
//! Reads configuration from the environment, builds the completion backend
//! and the document parser, and runs the pipeline or one of its stages.

/// Subcommand implementations.
pub mod commands;
/// Environment configuration and the `check` command.
pub mod config;

pub use config::{BackendKind, EnvConfig};
