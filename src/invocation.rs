//! Builds the exact command line handed to the ingestion engine.
//!
//! Argument order is fixed: leading engine args, the `sharepoint` connector
//! subcommand, credentials and site, scope toggles, output settings and the
//! verbosity flag last.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::config::LaunchConfig;

pub const CONNECTOR: &str = "sharepoint";
const SECRET_FLAG: &str = "--client-cred";

/// A fully resolved engine run: what to execute, where and with which environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn build(config: &LaunchConfig, project_root: &Path) -> Self {
        let source = &config.sharepoint;
        let output = &config.output;

        let mut args = config.engine.args.clone();
        args.push(CONNECTOR.to_string());
        args.extend([
            "--client-id".to_string(),
            source.client_id.clone(),
            SECRET_FLAG.to_string(),
            source.client_cred.clone(),
            "--site".to_string(),
            source.site.clone(),
        ]);
        if source.process_pages {
            args.push("--process-pages".to_string());
        }
        if source.process_all {
            args.push("--process-all".to_string());
        }
        if let Some(path) = &source.path {
            args.extend(["--path".to_string(), path.clone()]);
        }
        if source.recursive {
            args.push("--recursive".to_string());
        }
        args.extend([
            "--output-dir".to_string(),
            output.output_dir.display().to_string(),
        ]);
        if let Some(download_dir) = &output.download_dir {
            args.extend([
                "--download-dir".to_string(),
                download_dir.display().to_string(),
            ]);
        }
        args.extend([
            "--num-processes".to_string(),
            output.num_processes.to_string(),
        ]);
        if output.reprocess {
            args.push("--reprocess".to_string());
        }
        if output.verbose {
            args.push("--verbose".to_string());
        }

        let mut env = BTreeMap::new();
        if let Some(var) = &config.engine.module_path_var {
            env.insert(var.clone(), ".".to_string());
        }

        Self {
            program: resolve_program(&config.engine.program, project_root),
            args,
            env,
            working_dir: project_root.to_path_buf(),
        }
    }

    /// Arguments with the client secret masked, for logs and dry runs.
    pub fn redacted_args(&self) -> Vec<String> {
        let mut redacted = self.args.clone();
        if let Some(pos) = redacted.iter().position(|a| a == SECRET_FLAG) {
            if let Some(secret) = redacted.get_mut(pos + 1) {
                *secret = "***".to_string();
            }
        }
        redacted
    }
}

/// Relative paths such as `./unstructured/ingest/main.py` are anchored at the
/// project root; a bare program name is left to `PATH` lookup.
fn resolve_program(program: &Path, project_root: &Path) -> PathBuf {
    if program.is_relative() && program.components().count() > 1 {
        let relative: PathBuf = program
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        project_root.join(relative)
    } else {
        program.to_path_buf()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cd {} &&",
            shell_words::quote(&self.working_dir.display().to_string())
        )?;
        for (key, value) in &self.env {
            write!(f, " {}={}", key, shell_words::quote(value))?;
        }
        let mut words = vec![self.program.display().to_string()];
        words.extend(self.redacted_args());
        write!(f, " {}", shell_words::join(words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, OutputConfig, ProjectConfig, SharepointSource};

    fn config() -> LaunchConfig {
        LaunchConfig {
            project: ProjectConfig::default(),
            engine: EngineConfig::default(),
            sharepoint: SharepointSource {
                client_id: "id-123".into(),
                client_cred: "s3cret".into(),
                site: "https://contoso-admin.sharepoint.com".into(),
                path: None,
                process_pages: true,
                process_all: true,
                recursive: false,
            },
            output: OutputConfig {
                verbose: true,
                ..OutputConfig::default()
            },
        }
    }

    #[test]
    fn builds_fixed_argument_list_in_order() {
        let inv = Invocation::build(&config(), Path::new("/srv/project"));
        assert_eq!(
            inv.args,
            vec![
                "sharepoint",
                "--client-id",
                "id-123",
                "--client-cred",
                "s3cret",
                "--site",
                "https://contoso-admin.sharepoint.com",
                "--process-pages",
                "--process-all",
                "--output-dir",
                "sharepoint-ingest-output",
                "--num-processes",
                "2",
                "--verbose",
            ]
        );
        assert_eq!(inv.working_dir, PathBuf::from("/srv/project"));
        // compared as text: Path equality ignores `.` components
        assert_eq!(
            inv.program.to_str(),
            Some("/srv/project/unstructured/ingest/main.py")
        );
        assert_eq!(inv.env.get("PYTHONPATH").map(String::as_str), Some("."));
    }

    #[test]
    fn optional_flags_follow_their_neighbours() {
        let mut cfg = config();
        cfg.engine = EngineConfig {
            program: PathBuf::from("python3"),
            args: vec!["-m".into(), "unstructured.ingest.main".into()],
            module_path_var: None,
        };
        cfg.sharepoint.process_pages = false;
        cfg.sharepoint.process_all = false;
        cfg.sharepoint.path = Some("Shared Documents".into());
        cfg.sharepoint.recursive = true;
        cfg.output.download_dir = Some(PathBuf::from("downloads"));
        cfg.output.num_processes = 4;
        cfg.output.reprocess = true;
        cfg.output.verbose = false;

        let inv = Invocation::build(&cfg, Path::new("/srv/project"));
        assert_eq!(inv.program, PathBuf::from("python3"));
        assert!(inv.env.is_empty());
        assert_eq!(
            inv.args,
            vec![
                "-m",
                "unstructured.ingest.main",
                "sharepoint",
                "--client-id",
                "id-123",
                "--client-cred",
                "s3cret",
                "--site",
                "https://contoso-admin.sharepoint.com",
                "--path",
                "Shared Documents",
                "--recursive",
                "--output-dir",
                "sharepoint-ingest-output",
                "--download-dir",
                "downloads",
                "--num-processes",
                "4",
                "--reprocess",
            ]
        );
    }

    #[test]
    fn display_redacts_secret() {
        let inv = Invocation::build(&config(), Path::new("/srv/project"));
        let rendered = inv.to_string();
        assert!(
            rendered.starts_with(
                "cd /srv/project && PYTHONPATH=. /srv/project/unstructured/ingest/main.py sharepoint "
            ),
            "{rendered}"
        );
        assert!(rendered.contains("--client-cred '***'"), "{rendered}");
        assert!(!rendered.contains("s3cret"), "{rendered}");
        // the invocation itself keeps the real secret
        assert!(inv.args.iter().any(|a| a == "s3cret"));
    }
}
