//! Group and host variables for template rendering.
//!
//! Variables live in Ansible-style YAML files: one group file shared by every
//! router and one file per host. Host values override group values.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::template::Vars;

/// Source of the variables a host's configuration is rendered from.
pub trait VarStore: Send + Sync {
    /// Variables shared by every host.
    fn group_vars(&self) -> Result<Vars>;

    /// Variables for a single host.
    fn host_vars(&self, host: &str) -> Result<Vars>;
}

/// Variables read from a group vars file and a host vars directory.
#[derive(Debug, Clone)]
pub struct FileVarStore {
    group_vars_file: PathBuf,
    host_vars_dir: PathBuf,
}

impl FileVarStore {
    /// Create a store over `group_vars_file` and `host_vars_dir/<host>.yml`.
    pub fn new(group_vars_file: impl Into<PathBuf>, host_vars_dir: impl Into<PathBuf>) -> Self {
        Self {
            group_vars_file: group_vars_file.into(),
            host_vars_dir: host_vars_dir.into(),
        }
    }

    fn host_file(&self, host: &str) -> PathBuf {
        let yml = self.host_vars_dir.join(format!("{}.yml", host));
        if yml.exists() {
            return yml;
        }
        let yaml = self.host_vars_dir.join(format!("{}.yaml", host));
        if yaml.exists() {
            yaml
        } else {
            yml
        }
    }
}

impl VarStore for FileVarStore {
    fn group_vars(&self) -> Result<Vars> {
        load_vars_file(&self.group_vars_file)
    }

    fn host_vars(&self, host: &str) -> Result<Vars> {
        load_vars_file(&self.host_file(host))
    }
}

/// In-memory variables, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryVarStore {
    group: Vars,
    hosts: IndexMap<String, Vars>,
}

impl MemoryVarStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the group variables.
    pub fn with_group(mut self, vars: Vars) -> Self {
        self.group = vars;
        self
    }

    /// Set the variables of one host.
    pub fn with_host(mut self, host: impl Into<String>, vars: Vars) -> Self {
        self.hosts.insert(host.into(), vars);
        self
    }
}

impl VarStore for MemoryVarStore {
    fn group_vars(&self) -> Result<Vars> {
        Ok(self.group.clone())
    }

    fn host_vars(&self, host: &str) -> Result<Vars> {
        Ok(self.hosts.get(host).cloned().unwrap_or_default())
    }
}

/// Load a YAML mapping from `path`.
///
/// A missing file or an empty document yields an empty mapping.
pub fn load_vars_file(path: &Path) -> Result<Vars> {
    if !path.exists() {
        debug!(path = %path.display(), "vars file not found, using empty mapping");
        return Ok(Vars::new());
    }

    let content = std::fs::read_to_string(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| Error::VarsLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match value {
        serde_yaml::Value::Null => Ok(Vars::new()),
        serde_yaml::Value::Mapping(map) => Ok(map
            .into_iter()
            .filter_map(|(k, v)| match k {
                serde_yaml::Value::String(key) => Some((key, v)),
                serde_yaml::Value::Number(n) => Some((n.to_string(), v)),
                serde_yaml::Value::Bool(b) => Some((b.to_string(), v)),
                _ => None,
            })
            .collect()),
        _ => Err(Error::VarsLoad {
            path: path.to_path_buf(),
            message: "expected a mapping at the top level".to_string(),
        }),
    }
}

/// Build the rendering context for `host`.
///
/// Group variables are overlaid with host variables. `inventory_hostname`
/// defaults to the host id, and `ospf_networks` is derived from `lan_net`
/// and `transit_net` when not given explicitly.
pub fn build_context(store: &dyn VarStore, host: &str) -> Result<Vars> {
    let mut host_vars = store.host_vars(host)?;
    if !host_vars.contains_key("inventory_hostname") {
        host_vars.insert(
            "inventory_hostname".to_string(),
            serde_yaml::Value::String(host.to_string()),
        );
    }

    let mut ctx = store.group_vars()?;
    for (key, value) in host_vars {
        ctx.insert(key, value);
    }

    if !ctx.contains_key("ospf_networks") {
        let nets: Vec<serde_yaml::Value> = ["lan_net", "transit_net"]
            .iter()
            .filter_map(|key| ctx.get(*key))
            .filter(|v| is_truthy(v))
            .cloned()
            .collect();
        if !nets.is_empty() {
            ctx.insert(
                "ospf_networks".to_string(),
                serde_yaml::Value::Sequence(nets),
            );
        }
    }

    Ok(ctx)
}

/// Jinja2 truthiness of a YAML value.
pub fn is_truthy(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => false,
        serde_yaml::Value::Bool(b) => *b,
        serde_yaml::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_yaml::Value::String(s) => !s.is_empty(),
        serde_yaml::Value::Sequence(seq) => !seq.is_empty(),
        serde_yaml::Value::Mapping(map) => !map.is_empty(),
        serde_yaml::Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn s(v: &str) -> serde_yaml::Value {
        serde_yaml::Value::String(v.to_string())
    }

    fn vars(pairs: &[(&str, serde_yaml::Value)]) -> Vars {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_host_overrides_group() {
        let store = MemoryVarStore::new()
            .with_group(vars(&[("area", s("0")), ("hello", s("10"))]))
            .with_host("r1", vars(&[("hello", s("5"))]));
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(ctx.get("area"), Some(&s("0")));
        assert_eq!(ctx.get("hello"), Some(&s("5")));
        assert_eq!(ctx.get("inventory_hostname"), Some(&s("r1")));
    }

    #[test]
    fn test_inventory_hostname_from_host_vars_kept() {
        let store = MemoryVarStore::new().with_host("r1", vars(&[("inventory_hostname", s("edge"))]));
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(ctx.get("inventory_hostname"), Some(&s("edge")));
    }

    #[test]
    fn test_inventory_hostname_overrides_group() {
        let store = MemoryVarStore::new().with_group(vars(&[("inventory_hostname", s("group"))]));
        let ctx = build_context(&store, "r2").unwrap();
        assert_eq!(ctx.get("inventory_hostname"), Some(&s("r2")));
    }

    #[test]
    fn test_ospf_networks_derived() {
        let store = MemoryVarStore::new().with_host(
            "r1",
            vars(&[("transit_net", s("10.0.12.0/30")), ("lan_net", s("10.0.1.0/24"))]),
        );
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(
            ctx.get("ospf_networks"),
            Some(&serde_yaml::Value::Sequence(vec![s("10.0.1.0/24"), s("10.0.12.0/30")]))
        );
    }

    #[test]
    fn test_ospf_networks_skips_falsy() {
        let store = MemoryVarStore::new()
            .with_host("r1", vars(&[("lan_net", s("")), ("transit_net", s("10.0.12.0/30"))]));
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(
            ctx.get("ospf_networks"),
            Some(&serde_yaml::Value::Sequence(vec![s("10.0.12.0/30")]))
        );

        let store = MemoryVarStore::new();
        let ctx = build_context(&store, "r1").unwrap();
        assert!(!ctx.contains_key("ospf_networks"));
    }

    #[test]
    fn test_explicit_ospf_networks_untouched() {
        let store = MemoryVarStore::new().with_group(vars(&[
            ("ospf_networks", serde_yaml::Value::Sequence(vec![s("192.0.2.0/24")])),
            ("lan_net", s("10.0.1.0/24")),
        ]));
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(
            ctx.get("ospf_networks"),
            Some(&serde_yaml::Value::Sequence(vec![s("192.0.2.0/24")]))
        );
    }

    #[test]
    fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let group = dir.path().join("routers.yml");
        std::fs::write(&group, "ospf_area: 0\nrouter_id: \"{{ loopback }}\"\n").unwrap();
        let host_dir = dir.path().join("host_vars");
        std::fs::create_dir(&host_dir).unwrap();
        std::fs::write(host_dir.join("r1.yml"), "loopback: 1.1.1.1\n").unwrap();
        std::fs::write(host_dir.join("r2.yml"), "").unwrap();

        let store = FileVarStore::new(&group, &host_dir);
        let ctx = build_context(&store, "r1").unwrap();
        assert_eq!(ctx.get("loopback"), Some(&s("1.1.1.1")));
        assert!(ctx.contains_key("ospf_area"));

        let ctx = build_context(&store, "r2").unwrap();
        assert_eq!(ctx.get("inventory_hostname"), Some(&s("r2")));

        let ctx = build_context(&store, "r3").unwrap();
        assert_eq!(ctx.get("inventory_hostname"), Some(&s("r3")));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "key: [unterminated\n").unwrap();
        let err = load_vars_file(&path).unwrap_err();
        assert!(matches!(err, Error::VarsLoad { .. }));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&serde_yaml::Value::Null));
        assert!(!is_truthy(&s("")));
        assert!(is_truthy(&s("x")));
        assert!(!is_truthy(&serde_yaml::Value::Bool(false)));
        assert!(!is_truthy(&serde_yaml::to_value(0).unwrap()));
    }
}
