//! Error types shared by the config, invocation and launch modules.
//!
//! The CLI boundary wraps these in `anyhow::Error`; library callers can match
//! on the variants directly.

use std::path::PathBuf;

/// A launch config that must not be used to start the engine.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} still holds the placeholder {value:?}; edit the launch config before running")]
    Placeholder { field: &'static str, value: String },

    #[error("missing mandatory value: {field}")]
    Missing { field: &'static str },

    #[error("invalid site url {site:?}: {reason}")]
    InvalidSite { site: String, reason: String },

    #[error(
        "a site url in the form of https://[tenant]-admin.sharepoint.com is required to process all sites within a tenant, got {site:?}"
    )]
    NotTenantAdmin { site: String },

    #[error("num_processes must be at least 1")]
    NoProcesses,

    #[error("output_dir must not be empty")]
    EmptyOutputDir,
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("project root {path} does not exist or is inaccessible: {source}")]
    ProjectRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project root {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
