//! Shared test utilities and fixtures for the Netauto test suite.
//!
//! This module provides:
//! - A mock `Connection` with scripted command results
//! - A `ConnectionFactory` handing out registered mocks
//! - A temporary lab directory laid out like a real project
//! - Sample FRR command output
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tempfile::TempDir;

use netauto::connection::{
    CommandResult, Connection, ConnectionError, ConnectionFactory, ConnectionResult,
    ExecuteOptions,
};

// ============================================================================
// Sample Device Output
// ============================================================================

/// `show ip route` of r1 after convergence: three OSPF routes.
pub const R1_ROUTES: &str = "\
Codes: K - kernel route, C - connected, S - static, R - RIP,
       O - OSPF, I - IS-IS, B - BGP, E - EIGRP, N - NHRP,
       T - Table, v - VNC, V - VNC-Direct, A - Babel, F - PBR,
       f - OpenFabric,
       > - selected route, * - FIB route, q - queued, r - rejected, b - backup
       t - trapped, o - offload failure

O   10.0.1.0/24 [110/10] is directly connected, eth2, weight 1, 00:05:12
C>* 10.0.1.0/24 is directly connected, eth2, 00:05:20
O>* 10.0.2.0/24 [110/20] via 10.0.12.2, eth1, weight 1, 00:04:31
O   10.0.12.0/30 [110/10] is directly connected, eth1, weight 1, 00:05:12
C>* 10.0.12.0/30 is directly connected, eth1, 00:05:20
";

/// `show ip ospf neighbor` of r1: one Full adjacency.
pub const R1_NEIGHBORS: &str = "\

Neighbor ID     Pri State           Up Time         Dead Time Address         Interface                        RXmtL RqstL DBsmL
2.2.2.2           1 Full/DR         4m31s             35.321s 10.0.12.2       eth1:10.0.12.1                       0     0     0

";

/// `show ip ospf neighbor` while the adjacency is still forming.
pub const R2_NEIGHBORS_EXSTART: &str = "\
Neighbor ID     Pri State           Up Time         Dead Time Address         Interface                        RXmtL RqstL DBsmL
1.1.1.1           1 ExStart/Backup  0.512s            39.488s 10.0.12.1       eth1:10.0.12.2                       0     0     0
";

// ============================================================================
// Mock Connection Implementation
// ============================================================================

/// A mock connection for testing purposes.
///
/// Tracks executed commands and answers them from a table of scripted
/// results. Commands can be made to time out, and the first N executions can
/// be made to fail to simulate a lab that is still converging.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockConnection::new("clab-netauto-r1");
/// mock.set_command_result("vtysh -c 'show ip route'", CommandResult::success(R1_ROUTES.into(), "".into()));
///
/// let result = mock.execute("vtysh -c 'show ip route'", None).await.unwrap();
/// assert!(result.success);
/// assert_eq!(mock.command_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockConnection {
    identifier: String,
    commands_executed: RwLock<Vec<String>>,
    command_results: RwLock<HashMap<String, CommandResult>>,
    timeout_commands: RwLock<HashSet<String>>,
    should_fail: AtomicBool,
    fail_first_n: AtomicU32,
    command_count: AtomicU32,
}

impl MockConnection {
    /// Create a new mock connection with the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            commands_executed: RwLock::new(Vec::new()),
            command_results: RwLock::new(HashMap::new()),
            timeout_commands: RwLock::new(HashSet::new()),
            should_fail: AtomicBool::new(false),
            fail_first_n: AtomicU32::new(0),
            command_count: AtomicU32::new(0),
        }
    }

    /// Set the result for a specific command.
    pub fn set_command_result(&self, command: impl Into<String>, result: CommandResult) {
        self.command_results.write().insert(command.into(), result);
    }

    /// Set a successful stdout for a specific command.
    pub fn set_stdout(&self, command: impl Into<String>, stdout: &str) {
        self.set_command_result(command, CommandResult::success(stdout.to_string(), String::new()));
    }

    /// Make a specific command time out.
    pub fn set_timeout(&self, command: impl Into<String>) {
        self.timeout_commands.write().insert(command.into());
    }

    /// Configure the mock to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Answer the first `n` executions with an empty, failed result.
    pub fn fail_first(&self, n: u32) {
        self.fail_first_n.store(n, Ordering::SeqCst);
    }

    /// Get the number of commands executed.
    pub fn command_count(&self) -> u32 {
        self.command_count.load(Ordering::SeqCst)
    }

    /// Get all commands that were executed.
    pub fn get_commands(&self) -> Vec<String> {
        self.commands_executed.read().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn execute(
        &self,
        command: &str,
        options: Option<ExecuteOptions>,
    ) -> ConnectionResult<CommandResult> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ConnectionError::ExecutionFailed(
                "Mock connection failed".to_string(),
            ));
        }

        let count = self.command_count.fetch_add(1, Ordering::SeqCst);
        self.commands_executed.write().push(command.to_string());

        if self.timeout_commands.read().contains(command) {
            let secs = options.and_then(|o| o.timeout).unwrap_or(0);
            return Err(ConnectionError::Timeout(secs));
        }

        if count < self.fail_first_n.load(Ordering::SeqCst) {
            return Ok(CommandResult::failure(1, String::new(), "not ready".to_string()));
        }

        // Check for specific command result
        if let Some(result) = self.command_results.read().get(command) {
            return Ok(result.clone());
        }

        // Unconfigured commands succeed with no output
        Ok(CommandResult::success(String::new(), String::new()))
    }
}

// ============================================================================
// Mock Connection Factory
// ============================================================================

/// Hands out registered mocks by host; unknown hosts get a fresh mock whose
/// commands all succeed with empty output.
#[derive(Debug, Default)]
pub struct MockFactory {
    connections: RwLock<HashMap<String, Arc<MockConnection>>>,
    requested: RwLock<Vec<String>>,
}

impl MockFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mock under `host` and return it for scripting.
    pub fn add(&self, host: &str) -> Arc<MockConnection> {
        let conn = Arc::new(MockConnection::new(format!("clab-netauto-{}", host)));
        self.connections
            .write()
            .insert(host.to_string(), Arc::clone(&conn));
        conn
    }

    /// Hosts requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.read().clone()
    }
}

impl ConnectionFactory for MockFactory {
    fn connect(&self, host: &str) -> Arc<dyn Connection> {
        self.requested.write().push(host.to_string());
        if let Some(conn) = self.connections.read().get(host) {
            return Arc::clone(conn) as Arc<dyn Connection>;
        }
        Arc::new(MockConnection::new(host))
    }
}

// ============================================================================
// Lab Fixture
// ============================================================================

/// Router template of the test lab. `banner` is a variable holding a
/// directive, expanded by the second rendering pass.
pub const TEMPLATE: &str = "\
hostname {{ inventory_hostname }}
! {{ banner }}
!
router ospf
 ospf router-id {{ router_id }}
{% for net in ospf_networks %}
 network {{ net }} area {{ ospf_area }}
{% endfor %}
!
line vty
!
";

/// Shared variables of all routers.
pub const GROUP_VARS: &str = "\
ospf_area: 0
banner: \"managed by netauto for {{ inventory_hostname }}\"
";

/// Expected rendering of a router.
pub fn rendered_config(host: &str, router_id: &str, lan_net: &str) -> String {
    format!(
        "hostname {host}\n! managed by netauto for {host}\n!\nrouter ospf\n ospf router-id {router_id}\n network {lan_net} area 0\n network 10.0.12.0/30 area 0\n!\nline vty\n!",
        host = host,
        router_id = router_id,
        lan_net = lan_net,
    )
}

/// A temporary project directory with the standard lab layout:
///
/// ```text
/// ansible/templates/frr.conf.j2
/// ansible/group_vars/routers.yml
/// ansible/host_vars/clab-netauto-r{1,2}.yml
/// backups/clab-netauto-r{1,2}.conf   (matching the rendering)
/// ```
pub struct TestLab {
    dir: TempDir,
}

impl TestLab {
    /// Hosts of the lab.
    pub const HOSTS: [&'static str; 2] = ["clab-netauto-r1", "clab-netauto-r2"];

    /// Create a lab whose backups match the intended configuration.
    pub fn new() -> Self {
        let lab = Self {
            dir: TempDir::new().expect("create temp dir"),
        };
        lab.write("ansible/templates/frr.conf.j2", TEMPLATE);
        lab.write("ansible/group_vars/routers.yml", GROUP_VARS);
        lab.write(
            "ansible/host_vars/clab-netauto-r1.yml",
            "router_id: 1.1.1.1\nlan_net: 10.0.1.0/24\ntransit_net: 10.0.12.0/30\n",
        );
        lab.write(
            "ansible/host_vars/clab-netauto-r2.yml",
            "router_id: 2.2.2.2\nlan_net: 10.0.2.0/24\ntransit_net: 10.0.12.0/30\n",
        );
        lab.write_backup(
            "clab-netauto-r1",
            &format!("{}\n", rendered_config("clab-netauto-r1", "1.1.1.1", "10.0.1.0/24")),
        );
        lab.write_backup(
            "clab-netauto-r2",
            &format!("{}\n", rendered_config("clab-netauto-r2", "2.2.2.2", "10.0.2.0/24")),
        );
        lab
    }

    /// Root of the lab.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a lab-relative file.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a lab-relative file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(path, content).expect("write lab file");
    }

    /// Read a lab-relative file.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.join(rel)).expect("read lab file")
    }

    /// Replace the backup of `host`.
    pub fn write_backup(&self, host: &str, content: &str) {
        self.write(&format!("backups/{}.conf", host), content);
    }

    /// Group vars file.
    pub fn group_vars(&self) -> PathBuf {
        self.join("ansible/group_vars/routers.yml")
    }

    /// Host vars directory.
    pub fn host_vars_dir(&self) -> PathBuf {
        self.join("ansible/host_vars")
    }

    /// Backups directory.
    pub fn backups_dir(&self) -> PathBuf {
        self.join("backups")
    }

    /// Template file.
    pub fn template(&self) -> PathBuf {
        self.join("ansible/templates/frr.conf.j2")
    }

    /// Hosts as owned strings.
    pub fn hosts(&self) -> Vec<String> {
        Self::HOSTS.iter().map(|h| h.to_string()).collect()
    }
}

impl Default for TestLab {
    fn default() -> Self {
        Self::new()
    }
}
