//! Configuration drift detection.
//!
//! For every host the intended configuration is rendered from the template and
//! compared against the backed-up running configuration. Hosts are checked
//! independently: a render error or a missing backup fails that host only and
//! the batch continues. The run is an all-or-nothing gate, so a single failed
//! host makes the whole check fail.
//!
//! When a host drifts, both compared texts are written to the output directory
//! as `<host>[.ospf].rendered` and `<host>[.ospf].backup` and a unified diff
//! (backup → rendered) is kept in the report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::backup::BackupStore;
use crate::diff::{compute_stats, unified_diff, DiffStats};
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::section::extract_ospf;
use crate::template::TemplateRenderer;
use crate::vars::{build_context, VarStore};

/// What part of the configuration is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareScope {
    /// The whole document.
    Full,
    /// Only the `router ospf` block.
    #[default]
    Section,
}

impl CompareScope {
    /// Suffix used in artifact file names.
    pub fn artifact_suffix(&self) -> &'static str {
        match self {
            CompareScope::Full => "",
            CompareScope::Section => ".ospf",
        }
    }
}

impl FromStr for CompareScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "all" => Ok(CompareScope::Full),
            "section" | "ospf" => Ok(CompareScope::Section),
            other => Err(format!(
                "Unknown compare scope: {}. Valid options: full, section",
                other
            )),
        }
    }
}

impl fmt::Display for CompareScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareScope::Full => write!(f, "full"),
            CompareScope::Section => write!(f, "section"),
        }
    }
}

/// Settings of a drift check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftConfig {
    /// Compared part of the configuration
    pub scope: CompareScope,
    /// Normalize whitespace on both sides before comparing
    pub ignore_whitespace: bool,
    /// Directory receiving artifacts of drifting hosts
    pub output_dir: PathBuf,
    /// Context lines in generated diffs
    pub context_lines: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            scope: CompareScope::Section,
            ignore_whitespace: true,
            output_dir: PathBuf::from("out"),
            context_lines: 3,
        }
    }
}

/// Why a host failed the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostFailure {
    /// Variables could not be loaded or the template failed to render.
    Render {
        /// Error description
        message: String,
    },
    /// No backup exists for the host.
    MissingBackup {
        /// Expected backup location
        path: PathBuf,
    },
    /// Intended and actual configuration differ.
    Drift,
}

impl fmt::Display for HostFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostFailure::Render { message } => write!(f, "render failed: {}", message),
            HostFailure::MissingBackup { path } => {
                write!(f, "backup not found: {}", path.display())
            }
            HostFailure::Drift => write!(f, "configuration differs"),
        }
    }
}

/// Files written for a drifting host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Host identifier
    pub host: String,
    /// Compared rendered text
    pub rendered_path: PathBuf,
    /// Compared backup text
    pub backup_path: PathBuf,
}

/// Outcome of a drift check over a batch of hosts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DriftReport {
    /// Hosts whose configuration matches
    pub passed: Vec<String>,
    /// Failed hosts with the reason, in check order
    pub failed: Vec<(String, HostFailure)>,
    /// Artifacts written for drifting hosts
    pub artifacts: Vec<Artifact>,
    /// Unified diffs per drifting host
    pub diffs: IndexMap<String, String>,
    /// Changed-line counts per drifting host
    pub stats: IndexMap<String, DiffStats>,
}

impl DriftReport {
    /// True when every host matched.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Process exit status: 0 when clean, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }

    /// Hosts that were compared (matching or drifting).
    pub fn checked(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.passed.iter().map(String::as_str).collect();
        hosts.extend(
            self.failed
                .iter()
                .filter(|(_, f)| *f == HostFailure::Drift)
                .map(|(h, _)| h.as_str()),
        );
        hosts
    }

    /// Failure reason of `host`, if it failed.
    pub fn failure(&self, host: &str) -> Option<&HostFailure> {
        self.failed.iter().find(|(h, _)| h == host).map(|(_, f)| f)
    }
}

/// Compares rendered intent with backed-up configuration.
pub struct DriftChecker {
    renderer: TemplateRenderer,
    template_name: String,
    template_source: String,
    vars: Box<dyn VarStore>,
    backups: Box<dyn BackupStore>,
    config: DriftConfig,
}

impl DriftChecker {
    /// Create a checker from an in-memory template.
    pub fn new(
        template_name: impl Into<String>,
        template_source: impl Into<String>,
        vars: Box<dyn VarStore>,
        backups: Box<dyn BackupStore>,
        config: DriftConfig,
    ) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            template_name: template_name.into(),
            template_source: template_source.into(),
            vars,
            backups,
            config,
        }
    }

    /// Create a checker reading the template from `path`.
    ///
    /// A missing template is fatal for the whole run.
    pub fn from_template_file(
        path: &Path,
        vars: Box<dyn VarStore>,
        backups: Box<dyn BackupStore>,
        config: DriftConfig,
    ) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        Ok(Self::new(
            path.display().to_string(),
            source,
            vars,
            backups,
            config,
        ))
    }

    /// The active settings.
    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Render the intended configuration of `host`.
    pub fn render_host(&self, host: &str) -> Result<String> {
        let ctx = build_context(self.vars.as_ref(), host)?;
        self.renderer
            .render(&self.template_name, &self.template_source, &ctx)
    }

    /// Check every host in order.
    pub fn check(&self, hosts: &[String]) -> DriftReport {
        let mut report = DriftReport::default();

        for host in hosts {
            debug!(host = %host, scope = %self.config.scope, "checking drift");
            match self.check_host(host, &mut report) {
                None => report.passed.push(host.clone()),
                Some(failure) => {
                    warn!(host = %host, reason = %failure, "host failed drift check");
                    report.failed.push((host.clone(), failure));
                }
            }
        }

        info!(
            passed = report.passed.len(),
            failed = report.failed.len(),
            "drift check complete"
        );
        report
    }

    fn check_host(&self, host: &str, report: &mut DriftReport) -> Option<HostFailure> {
        let rendered = match self.render_host(host) {
            Ok(text) => text,
            Err(e) => {
                return Some(HostFailure::Render {
                    message: e.to_string(),
                })
            }
        };

        let backup = match self.backups.read_backup(host) {
            Ok(Some(text)) => text,
            Ok(None) => {
                return Some(HostFailure::MissingBackup {
                    path: self.backups.location(host),
                })
            }
            Err(e) => {
                warn!(host = %host, error = %e, "failed to read backup");
                return Some(HostFailure::MissingBackup {
                    path: self.backups.location(host),
                });
            }
        };

        let (mut intended, mut actual) = match self.config.scope {
            CompareScope::Full => (rendered, backup),
            CompareScope::Section => (extract_ospf(&rendered), extract_ospf(&backup)),
        };

        if self.config.ignore_whitespace {
            intended = normalize(&intended);
            actual = normalize(&actual);
        }

        if intended == actual {
            debug!(host = %host, "no drift");
            return None;
        }

        let artifact = self.artifact_paths(host);
        match write_artifact(&artifact, &intended, &actual) {
            Ok(()) => {
                info!(
                    host = %host,
                    rendered = %artifact.rendered_path.display(),
                    backup = %artifact.backup_path.display(),
                    "wrote drift artifacts"
                );
                report.artifacts.push(artifact.clone());
            }
            Err(e) => warn!(host = %host, error = %e, "failed to write drift artifacts"),
        }

        let actual = format!("{}\n", actual);
        let intended = format!("{}\n", intended);
        report
            .stats
            .insert(host.to_string(), compute_stats(&actual, &intended));
        let diff = unified_diff(
            &actual,
            &intended,
            &artifact.backup_path.display().to_string(),
            &artifact.rendered_path.display().to_string(),
            self.config.context_lines,
        );
        if !diff.is_empty() {
            report.diffs.insert(host.to_string(), diff);
        }

        Some(HostFailure::Drift)
    }

    fn artifact_paths(&self, host: &str) -> Artifact {
        let suffix = self.config.scope.artifact_suffix();
        Artifact {
            host: host.to_string(),
            rendered_path: self
                .config
                .output_dir
                .join(format!("{}{}.rendered", host, suffix)),
            backup_path: self
                .config
                .output_dir
                .join(format!("{}{}.backup", host, suffix)),
        }
    }
}

fn write_artifact(artifact: &Artifact, rendered: &str, backup: &str) -> std::io::Result<()> {
    if let Some(parent) = artifact.rendered_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&artifact.rendered_path, format!("{}\n", rendered))?;
    std::fs::write(&artifact.backup_path, format!("{}\n", backup))?;
    Ok(())
}
