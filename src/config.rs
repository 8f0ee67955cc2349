//! Configuration module for Netauto
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values (the standard lab layout)
//! - System configuration (/etc/netauto/netauto.toml)
//! - User configuration (~/.netauto.toml)
//! - Project configuration (./netauto.toml)
//! - Environment variables
//!
//! Later sources override earlier ones key by key, so a project file only
//! needs to name the settings it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collect::{CollectConfig, DEFAULT_TIMEOUT_SECS, NEIGHBORS_COMMAND, ROUTES_COMMAND};
use crate::connection::DockerConnectionFactory;
use crate::drift::{CompareScope, DriftConfig};
use crate::hosts::{default_hosts, HostSource, HostSourceKind};
use crate::probe::{default_probes, Probe};
use crate::retry::RetryPolicy;

/// Container name prefix of the default lab.
pub const DEFAULT_PREFIX: &str = "clab-netauto";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File locations
    pub paths: PathsConfig,

    /// Drift comparison settings
    pub drift: DriftSettings,

    /// Host enumeration and container naming
    pub hosts: HostsConfig,

    /// State collection settings
    pub collect: CollectSettings,

    /// Health probe settings
    pub probe: ProbeSettings,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// File locations, relative to the working directory unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Jinja2 template of the router configuration
    pub template: PathBuf,
    /// Group variables shared by all routers
    pub group_vars: PathBuf,
    /// Directory of `<host>.yml` host variables
    pub host_vars_dir: PathBuf,
    /// Directory of `<host>.conf` backups
    pub backups_dir: PathBuf,
    /// Directory for drift artifacts
    pub output_dir: PathBuf,
    /// State snapshot written by `collect`
    pub snapshot: PathBuf,
    /// JUnit results read by `report`
    pub junit: PathBuf,
    /// Markdown report
    pub report: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("ansible/templates/frr.conf.j2"),
            group_vars: PathBuf::from("ansible/group_vars/routers.yml"),
            host_vars_dir: PathBuf::from("ansible/host_vars"),
            backups_dir: PathBuf::from("backups"),
            output_dir: PathBuf::from("out"),
            snapshot: PathBuf::from("out/routes.json"),
            junit: PathBuf::from("tests/artifacts/junit.xml"),
            report: PathBuf::from("docs/report.md"),
        }
    }
}

/// Drift comparison settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftSettings {
    /// `section` compares only the OSPF block, `full` the whole document
    pub scope: CompareScope,
    /// Ignore trailing whitespace and blank lines
    pub ignore_whitespace: bool,
    /// Context lines shown in diffs
    pub context_lines: usize,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            scope: CompareScope::Section,
            ignore_whitespace: true,
            context_lines: 3,
        }
    }
}

/// Host enumeration and container naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsConfig {
    /// `backups` derives hosts from backup files, `static` uses `list`
    pub source: HostSourceKind,
    /// Static host list, also the fallback when no backup exists
    pub list: Vec<String>,
    /// Backup file extension used for host discovery
    pub extension: String,
    /// Containerlab name prefix for bare node names
    pub prefix: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            source: HostSourceKind::Backups,
            list: default_hosts(),
            extension: "conf".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// State collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectSettings {
    /// Docker executable
    pub docker_path: String,
    /// Per-command timeout in seconds
    pub timeout_secs: u64,
    /// Routing table command
    pub routes_command: String,
    /// OSPF neighbor table command
    pub neighbors_command: String,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            docker_path: "docker".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            routes_command: ROUTES_COMMAND.to_string(),
            neighbors_command: NEIGHBORS_COMMAND.to_string(),
        }
    }
}

/// Health probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Attempts per probe
    pub tries: u32,
    /// Delay between attempts in seconds
    pub delay_secs: u64,
    /// Checks to run
    pub checks: Vec<Probe>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            tries: 5,
            delay_secs: 2,
            checks: default_probes(),
        }
    }
}

/// Colors and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colored output
    pub enabled: bool,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when neither `RUST_LOG` nor `-v` is given
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                let layer = Self::read_layer(&path)?;
                merge_values(&mut merged, layer);
            } else if config_path == Some(&path) {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let mut config: Config =
            serde_json::from_value(merged).context("Invalid configuration")?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Get configuration file paths in order of precedence (lowest first)
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        // Explicit path replaces the search
        if let Some(path) = explicit_path {
            return vec![path.clone()];
        }
        if let Ok(env_config) = std::env::var("NETAUTO_CONFIG") {
            return vec![PathBuf::from(env_config)];
        }

        let mut paths = vec![PathBuf::from("/etc/netauto/netauto.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".netauto.toml"));
        }

        paths.push(PathBuf::from("netauto.toml"));
        paths
    }

    /// Parse one configuration file into a generic value
    fn read_layer(path: &Path) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // Determine format based on extension
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let value: serde_json::Value = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => {
                // Try TOML first, then YAML
                toml::from_str(&content)
                    .or_else(|_| serde_yaml::from_str(&content))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        // An empty YAML document parses as null
        Ok(if value.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            value
        })
    }

    /// Load a single configuration file over the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;
        merge_values(&mut merged, Self::read_layer(path.as_ref())?);
        serde_json::from_value(merged).context("Invalid configuration")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // NETAUTO_PREFIX
        if let Ok(prefix) = std::env::var("NETAUTO_PREFIX") {
            if !prefix.trim().is_empty() {
                self.hosts.prefix = prefix.trim().to_string();
            }
        }

        // NETAUTO_TIMEOUT
        if let Ok(timeout) = std::env::var("NETAUTO_TIMEOUT") {
            self.collect.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("NETAUTO_TIMEOUT is not a number: {}", timeout))?;
        }

        // NETAUTO_COMPARE_SCOPE
        if let Ok(scope) = std::env::var("NETAUTO_COMPARE_SCOPE") {
            self.drift.scope = scope.parse().map_err(anyhow::Error::msg)?;
        }

        // NETAUTO_OUTPUT_DIR
        if let Ok(dir) = std::env::var("NETAUTO_OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }

        // NETAUTO_REPORT
        if let Ok(report) = std::env::var("NETAUTO_REPORT") {
            self.paths.report = PathBuf::from(report);
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("NETAUTO_NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }

        Ok(())
    }

    /// Drift settings with the configured artifact directory
    pub fn drift_config(&self) -> DriftConfig {
        DriftConfig {
            scope: self.drift.scope,
            ignore_whitespace: self.drift.ignore_whitespace,
            output_dir: self.paths.output_dir.clone(),
            context_lines: self.drift.context_lines,
        }
    }

    /// Collection commands and timeout
    pub fn collect_config(&self) -> CollectConfig {
        CollectConfig {
            routes_command: self.collect.routes_command.clone(),
            neighbors_command: self.collect.neighbors_command.clone(),
            timeout_secs: self.collect.timeout_secs,
        }
    }

    /// The configured host source
    pub fn host_source(&self) -> HostSource {
        match self.hosts.source {
            HostSourceKind::Static => HostSource::Static(self.hosts.list.clone()),
            HostSourceKind::Backups => HostSource::Directory {
                dir: self.paths.backups_dir.clone(),
                extension: self.hosts.extension.clone(),
                fallback: self.hosts.list.clone(),
            },
        }
    }

    /// Retry policy of health probes
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::constant(self.probe.tries, Duration::from_secs(self.probe.delay_secs))
    }

    /// Docker connections with the lab prefix
    pub fn connection_factory(&self) -> DockerConnectionFactory {
        DockerConnectionFactory::new(self.collect.docker_path.clone())
            .with_prefix(self.hosts.prefix.clone())
    }
}

/// Recursively overlay `layer` onto `base`. Tables merge, everything else
/// replaces.
fn merge_values(base: &mut serde_json::Value, layer: serde_json::Value) {
    match (base, layer) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}
