use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::launch::{launch, prepare, RootLocation, SystemRunner};
use crate::load_config::{load_config, load_template, CONFIG_TEMPLATE};

/// CLI for ingest-launcher: run the ingestion engine's SharePoint connector.
#[derive(Parser, Debug)]
#[clap(
    name = "ingest-launcher",
    version,
    about = "Run the document ingestion engine against a SharePoint site"
)]
pub struct Cli {
    /// Path to the YAML launch config (defaults to the built-in placeholder template)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Use this directory as the project root instead of walking up from the config
    #[clap(long)]
    pub project_root: Option<PathBuf>,

    /// Print the engine command line with the secret redacted, without running it
    #[clap(long)]
    pub dry_run: bool,

    /// Print the placeholder config template and exit
    #[clap(long, conflicts_with_all = ["config", "project_root", "dry_run"])]
    pub print_template: bool,
}

/// Extracted async CLI logic entrypoint for integration tests and main().
/// Returns the exit code the process should terminate with.
pub async fn run(cli: Cli) -> Result<i32> {
    tracing::info!("launcher_started");

    if cli.print_template {
        print!("{CONFIG_TEMPLATE}");
        return Ok(0);
    }

    let (config, anchor) = match &cli.config {
        Some(path) => (load_config(path)?, config_anchor(path)),
        None => (load_template()?, executable_anchor()?),
    };

    let root = match cli.project_root {
        Some(path) => RootLocation::Explicit(path),
        None => RootLocation::Ancestor {
            anchor,
            depth: config.project.root_depth,
        },
    };

    if cli.dry_run {
        let invocation = prepare(&config, &root)?;
        println!("{invocation}");
        return Ok(0);
    }

    let exit = launch(&config, &root, &SystemRunner).await?;
    Ok(exit.exit_code())
}

/// The directory holding the config file plays the role of the launcher's own location.
fn config_anchor(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn executable_anchor() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the launcher executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Launcher executable has no parent directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_config_directory() {
        assert_eq!(
            config_anchor(Path::new("examples/ingest/sharepoint/ingest.yaml")),
            PathBuf::from("examples/ingest/sharepoint")
        );
        assert_eq!(config_anchor(Path::new("ingest.yaml")), PathBuf::from("."));
    }

    #[test]
    fn no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["ingest-launcher"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn print_template_conflicts_with_config() {
        let res = Cli::try_parse_from(["ingest-launcher", "--print-template", "--config", "x.yaml"]);
        assert!(res.is_err());
    }
}
