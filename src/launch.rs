//! # launch: resolve the project root and run the ingestion engine
//!
//! The wrapper behaviour end to end:
//!   - validate the launch config (placeholders are refused here)
//!   - resolve the project root, either a fixed ancestor of the anchor
//!     directory or an explicit path
//!   - build the [`Invocation`] and hand it to a [`ProcessRunner`]
//!   - report the engine's exit status unchanged
//!
//! Any failure before the engine starts is returned as a [`LaunchError`] and
//! the runner is never called. There are no retries and no timeouts.
//!
//! The [`ProcessRunner`] seam lets tests substitute a mock (exported with the
//! `test-export-mocks` feature) for the real [`SystemRunner`].

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::LaunchConfig;
use crate::error::LaunchError;
use crate::invocation::Invocation;

/// Where the project root lives.
#[derive(Debug, Clone)]
pub enum RootLocation {
    /// `depth` directories above `anchor`.
    Ancestor { anchor: PathBuf, depth: usize },
    Explicit(PathBuf),
}

impl RootLocation {
    pub fn resolve(&self) -> Result<PathBuf, LaunchError> {
        let candidate = match self {
            RootLocation::Ancestor { anchor, depth } => {
                let mut path = anchor.clone();
                for _ in 0..*depth {
                    path.push("..");
                }
                path
            }
            RootLocation::Explicit(path) => path.clone(),
        };

        let root = fs::canonicalize(&candidate).map_err(|source| {
            debug!(path = %candidate.display(), error = ?source, "Project root not found");
            LaunchError::ProjectRoot {
                path: candidate.clone(),
                source,
            }
        })?;

        let metadata = fs::metadata(&root).map_err(|source| LaunchError::ProjectRoot {
            path: root.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            debug!(path = %root.display(), "Project root is not a directory");
            return Err(LaunchError::NotADirectory { path: root });
        }
        // The engine has to enter the root, which canonicalize does not check.
        fs::read_dir(&root).map_err(|source| {
            debug!(path = %root.display(), error = ?source, "Project root is inaccessible");
            LaunchError::ProjectRoot {
                path: root.clone(),
                source,
            }
        })?;

        debug!(root = %root.display(), "Resolved project root");
        Ok(root)
    }
}

/// How the engine terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl EngineExit {
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// The status the launcher itself exits with. Signals follow the shell
    /// convention of `128 + signal`.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<std::process::ExitStatus> for EngineExit {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Runs a prepared invocation to completion.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<EngineExit, LaunchError>;
}

/// Spawns the engine as a child process with inherited stdio.
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<EngineExit, LaunchError> {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .current_dir(&invocation.working_dir);

        let status = command.status().await.map_err(|source| {
            debug!(
                program = %invocation.program.display(),
                error = ?source,
                "Failed to launch ingestion engine"
            );
            LaunchError::Spawn {
                program: invocation.program.display().to_string(),
                source,
            }
        })?;
        Ok(EngineExit::from(status))
    }
}

/// Validates the config and resolves everything needed to run the engine.
pub fn prepare(config: &LaunchConfig, root: &RootLocation) -> Result<Invocation, LaunchError> {
    config.validate().map_err(|e| {
        debug!(error = %e, "Launch config rejected");
        e
    })?;
    let project_root = root.resolve()?;
    Ok(Invocation::build(config, &project_root))
}

pub async fn launch<R>(
    config: &LaunchConfig,
    root: &RootLocation,
    runner: &R,
) -> Result<EngineExit, LaunchError>
where
    R: ProcessRunner + ?Sized,
{
    let invocation = prepare(config, root)?;
    info!(
        program = %invocation.program.display(),
        working_dir = %invocation.working_dir.display(),
        args = ?invocation.redacted_args(),
        "Launching ingestion engine"
    );

    let exit = runner.run(&invocation).await?;
    info!(
        code = ?exit.code,
        signal = ?exit.signal,
        success = exit.success(),
        "engine_exited"
    );
    Ok(exit)
}
