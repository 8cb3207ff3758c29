#![doc = "ingest-launcher: runs the ingestion engine's SharePoint connector from a validated launch config."]

//! The launcher resolves a project root relative to its config, sets up the
//! engine's module path and runs the engine with a fixed argument list,
//! passing the engine's exit status through unchanged.

pub mod cli;
pub mod config;
pub mod error;
pub mod invocation;
pub mod launch;
pub mod load_config;

pub use cli::{run, Cli};
pub use error::{ConfigError, LaunchError};
