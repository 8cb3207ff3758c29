//! `load_config` module: reads the YAML launch config and injects SharePoint
//! secrets from the environment.
//!
//! Values from `SHAREPOINT_CLIENT_ID`, `SHAREPOINT_CLIENT_CRED` and
//! `SHAREPOINT_SITE` replace whatever the file holds, so a checked-in config
//! can keep its placeholders. Validation happens later, in `launch::prepare`.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::LaunchConfig;

/// The placeholder config that ships with the launcher.
pub const CONFIG_TEMPLATE: &str = include_str!("../config/sharepoint.yaml");

pub const CLIENT_ID_VAR: &str = "SHAREPOINT_CLIENT_ID";
pub const CLIENT_CRED_VAR: &str = "SHAREPOINT_CLIENT_CRED";
pub const SITE_VAR: &str = "SHAREPOINT_SITE";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LaunchConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading launch config from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            debug!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    parse_config(&content).with_context(|| format!("in config file {:?}", path_ref))
}

/// Parses [`CONFIG_TEMPLATE`], with environment secrets applied.
pub fn load_template() -> Result<LaunchConfig> {
    info!("Loading built-in launch config template");
    parse_config(CONFIG_TEMPLATE).context("in built-in config template")
}

fn parse_config(content: &str) -> Result<LaunchConfig> {
    let mut config: LaunchConfig = match serde_yaml::from_str(content) {
        Ok(conf) => conf,
        Err(e) => {
            debug!(error = ?e, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    apply_env_overrides(&mut config);
    config.trace_loaded();
    Ok(config)
}

fn apply_env_overrides(config: &mut LaunchConfig) {
    let source = &mut config.sharepoint;
    let overrides = [
        (CLIENT_ID_VAR, &mut source.client_id),
        (CLIENT_CRED_VAR, &mut source.client_cred),
        (SITE_VAR, &mut source.site),
    ];
    for (var, field) in overrides {
        if let Some(value) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) {
            info!(var, "Using value from environment");
            *field = value;
        }
    }
}
