// ingest-launcher/src/config.rs

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<.*>\s*$").expect("placeholder pattern is valid"));

/// Returns true for operator placeholders such as `<Microsoft Sharepoint app client-id>`.
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub sharepoint: SharepointSource,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Number of directories between the anchor and the project root.
    pub root_depth: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { root_depth: 3 }
    }
}

/// How the ingestion engine is started.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub program: PathBuf,
    /// Leading arguments, placed before the connector subcommand.
    pub args: Vec<String>,
    /// Set to `.` so the engine resolves its modules from the project root.
    pub module_path_var: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./unstructured/ingest/main.py"),
            args: Vec::new(),
            module_path_var: Some("PYTHONPATH".to_string()),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct SharepointSource {
    pub client_id: String,
    pub client_cred: String,
    pub site: String,
    /// Folder within each site; the engine defaults to `Shared Documents`.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub process_pages: bool,
    #[serde(default)]
    pub process_all: bool,
    #[serde(default)]
    pub recursive: bool,
}

impl fmt::Debug for SharepointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharepointSource")
            .field("client_id", &self.client_id)
            .field("client_cred", &"***")
            .field("site", &self.site)
            .field("path", &self.path)
            .field("process_pages", &self.process_pages)
            .field("process_all", &self.process_all)
            .field("recursive", &self.recursive)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    pub download_dir: Option<PathBuf>,
    pub num_processes: u32,
    pub verbose: bool,
    pub reprocess: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("sharepoint-ingest-output"),
            download_dir: None,
            num_processes: 2,
            verbose: false,
            reprocess: false,
        }
    }
}

impl LaunchConfig {
    pub fn trace_loaded(&self) {
        info!(
            site = %self.sharepoint.site,
            program = %self.engine.program.display(),
            output_dir = %self.output.output_dir.display(),
            num_processes = self.output.num_processes,
            "Loaded launch config"
        );
        debug!(?self, "Launch config loaded (full debug)");
    }

    /// Checks the config is fit to hand to the engine. Placeholders are
    /// reported before anything else.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = &self.sharepoint;
        let mandatory = [
            ("client_id", &source.client_id),
            ("client_cred", &source.client_cred),
            ("site", &source.site),
        ];

        for (field, value) in mandatory {
            if is_placeholder(value) {
                return Err(ConfigError::Placeholder {
                    field,
                    value: value.clone(),
                });
            }
        }
        for (field, value) in mandatory {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field });
            }
        }

        let site = Url::parse(&source.site).map_err(|e| ConfigError::InvalidSite {
            site: source.site.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(site.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidSite {
                site: source.site.clone(),
                reason: format!("unsupported scheme {}", site.scheme()),
            });
        }

        if source.process_all && !is_tenant_admin_site(&site) {
            return Err(ConfigError::NotTenantAdmin {
                site: source.site.clone(),
            });
        }

        if self.output.num_processes == 0 {
            return Err(ConfigError::NoProcesses);
        }
        if self.output.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputDir);
        }
        Ok(())
    }
}

/// `https://contoso-admin.sharepoint.com`, with no path beyond `/`.
fn is_tenant_admin_site(site: &Url) -> bool {
    let first_label = site
        .host_str()
        .and_then(|host| host.split('.').next())
        .unwrap_or_default();
    let is_admin = first_label.rsplit('-').next() == Some("admin") && first_label.contains('-');
    is_admin && matches!(site.path(), "" | "/")
}
