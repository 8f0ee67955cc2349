//! Lab health probes.
//!
//! Each probe runs one command inside a lab container and judges its output.
//! Probes are polled with a [`RetryPolicy`] because a freshly started lab
//! takes a while to converge.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

use crate::connection::{CommandResult, ConnectionFactory, ExecuteOptions};
use crate::retry::{RetryError, RetryPolicy};

/// Environment variable that turns on light mode when set to `1`.
pub const LIGHT_MODE_ENV: &str = "CI_LIGHT";

static FULL_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bFull\b").expect("valid state regex"));

/// A single lab health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Probe {
    /// `vtysh` answers on a router.
    VtyshAvailable {
        /// Router node
        node: String,
    },
    /// A single ping from one node reaches a target address.
    Ping {
        /// Node the ping is sent from
        from: String,
        /// Destination address
        target: String,
    },
    /// The router has at least one Full OSPF adjacency.
    OspfFull {
        /// Router node
        node: String,
    },
    /// The router learned `prefix` via OSPF with the expected next hop.
    OspfRoute {
        /// Router node
        node: String,
        /// Destination prefix
        prefix: String,
        /// Expected next-hop address
        next_hop: String,
    },
}

impl Probe {
    /// Node the probe runs on.
    pub fn node(&self) -> &str {
        match self {
            Probe::VtyshAvailable { node }
            | Probe::OspfFull { node }
            | Probe::OspfRoute { node, .. } => node,
            Probe::Ping { from, .. } => from,
        }
    }

    /// Command executed inside the node's container.
    pub fn command(&self) -> String {
        match self {
            Probe::VtyshAvailable { .. } => "vtysh -c 'show version' || true".to_string(),
            Probe::Ping { target, .. } => format!("ping -c1 -w3 {}", target),
            Probe::OspfFull { .. } => "vtysh -c 'show ip ospf neighbor'".to_string(),
            Probe::OspfRoute { prefix, .. } => format!("vtysh -c 'show ip route {}'", prefix),
        }
    }

    /// Judge the command output.
    pub fn passes(&self, result: &CommandResult) -> bool {
        match self {
            Probe::VtyshAvailable { .. } => result.stdout.contains("FRRouting"),
            Probe::Ping { .. } => result.success,
            Probe::OspfFull { .. } => FULL_STATE.is_match(&result.stdout),
            Probe::OspfRoute { next_hop, .. } => {
                result.stdout.contains("Known via \"ospf\"")
                    && next_hop_regex(next_hop)
                        .map(|re| re.is_match(&result.stdout))
                        .unwrap_or(false)
            }
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::VtyshAvailable { node } => write!(f, "vtysh available on {}", node),
            Probe::Ping { from, target } => write!(f, "ping {} -> {}", from, target),
            Probe::OspfFull { node } => write!(f, "OSPF Full adjacency on {}", node),
            Probe::OspfRoute {
                node,
                prefix,
                next_hop,
            } => write!(f, "OSPF route {} via {} on {}", prefix, next_hop, node),
        }
    }
}

fn next_hop_regex(next_hop: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?m)^\s*\*\s*{}\b", regex::escape(next_hop))).ok()
}

/// Checks of the default two-router lab.
pub fn default_probes() -> Vec<Probe> {
    vec![
        Probe::VtyshAvailable { node: "r1".into() },
        Probe::VtyshAvailable { node: "r2".into() },
        Probe::Ping {
            from: "h1".into(),
            target: "10.0.2.100".into(),
        },
        Probe::OspfFull { node: "r1".into() },
        Probe::OspfFull { node: "r2".into() },
        Probe::OspfRoute {
            node: "r1".into(),
            prefix: "10.0.2.0/24".into(),
            next_hop: "10.0.12.2".into(),
        },
        Probe::OspfRoute {
            node: "r2".into(),
            prefix: "10.0.1.0/24".into(),
            next_hop: "10.0.12.1".into(),
        },
    ]
}

/// Verdict of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// The check passed.
    Passed,
    /// The check never passed.
    Failed,
    /// The check was not run.
    Skipped,
}

/// Result of running a probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    /// The probe
    pub probe: Probe,
    /// Container the probe ran in
    pub container: String,
    /// Verdict
    pub status: ProbeStatus,
    /// Attempts made
    pub attempts: u32,
    /// Captured output or error of the last attempt
    pub detail: String,
}

impl ProbeOutcome {
    /// True unless the probe failed.
    pub fn is_ok(&self) -> bool {
        self.status != ProbeStatus::Failed
    }
}

/// Runs probes against lab containers.
#[derive(Debug, Clone)]
pub struct ProbeRunner {
    policy: RetryPolicy,
    timeout_secs: u64,
    light: bool,
}

impl Default for ProbeRunner {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), crate::collect::DEFAULT_TIMEOUT_SECS)
    }
}

impl ProbeRunner {
    /// Create a runner.
    pub fn new(policy: RetryPolicy, timeout_secs: u64) -> Self {
        Self {
            policy,
            timeout_secs,
            light: false,
        }
    }

    /// Skip every probe (no lab available).
    pub fn light(mut self, light: bool) -> Self {
        self.light = light;
        self
    }

    /// Light mode as requested by `CI_LIGHT=1`.
    pub fn light_from_env() -> bool {
        std::env::var(LIGHT_MODE_ENV)
            .map(|v| v.trim() == "1")
            .unwrap_or(false)
    }

    /// Run one probe, retrying until it passes.
    pub async fn run(&self, probe: &Probe, factory: &dyn ConnectionFactory) -> ProbeOutcome {
        let conn = factory.connect(probe.node());
        let container = conn.identifier().to_string();

        if self.light {
            debug!(probe = %probe, "light mode, skipping probe");
            return ProbeOutcome {
                probe: probe.clone(),
                container,
                status: ProbeStatus::Skipped,
                attempts: 0,
                detail: "light mode: no lab available".to_string(),
            };
        }

        let command = probe.command();
        let options = ExecuteOptions::new().with_timeout(self.timeout_secs);
        let tries = AtomicU32::new(0);
        let result = self
            .policy
            .execute_until(
                || {
                    tries.fetch_add(1, Ordering::Relaxed);
                    conn.execute(&command, Some(options.clone()))
                },
                |r| probe.passes(r),
            )
            .await;

        let outcome = match result {
            Ok(r) => ProbeOutcome {
                probe: probe.clone(),
                container,
                status: ProbeStatus::Passed,
                attempts: tries.load(Ordering::Relaxed),
                detail: r.stdout,
            },
            Err(RetryError::ConditionNotMet {
                attempts,
                last_value,
            }) => ProbeOutcome {
                probe: probe.clone(),
                container,
                status: ProbeStatus::Failed,
                attempts,
                detail: last_value.combined_output(),
            },
            Err(RetryError::MaxRetriesExceeded {
                attempts,
                last_error,
            }) => ProbeOutcome {
                probe: probe.clone(),
                container,
                status: ProbeStatus::Failed,
                attempts,
                detail: last_error.to_string(),
            },
        };

        match outcome.status {
            ProbeStatus::Failed => warn!(probe = %probe, container = %outcome.container, "probe failed"),
            _ => info!(probe = %probe, "probe passed"),
        }
        outcome
    }

    /// Run probes in order.
    pub async fn run_all(
        &self,
        probes: &[Probe],
        factory: &dyn ConnectionFactory,
    ) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(probes.len());
        for probe in probes {
            outcomes.push(self.run(probe, factory).await);
        }
        outcomes
    }
}

/// Process exit status for a probe run: 1 if any probe failed.
pub fn exit_code(outcomes: &[ProbeOutcome]) -> i32 {
    if outcomes.iter().all(ProbeOutcome::is_ok) {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_OUTPUT: &str = "\
Routing entry for 10.0.2.0/24
  Known via \"ospf\", distance 110, metric 20, best
  Last update 00:03:11 ago
  * 10.0.12.2, via eth1, weight 1
";

    fn ok(stdout: &str) -> CommandResult {
        CommandResult::success(stdout.to_string(), String::new())
    }

    #[test]
    fn test_route_probe() {
        let probe = Probe::OspfRoute {
            node: "r1".into(),
            prefix: "10.0.2.0/24".into(),
            next_hop: "10.0.12.2".into(),
        };
        assert_eq!(probe.command(), "vtysh -c 'show ip route 10.0.2.0/24'");
        assert!(probe.passes(&ok(ROUTE_OUTPUT)));
        assert!(!probe.passes(&ok(&ROUTE_OUTPUT.replace("ospf", "static"))));

        let wrong_hop = Probe::OspfRoute {
            node: "r1".into(),
            prefix: "10.0.2.0/24".into(),
            next_hop: "10.0.12.1".into(),
        };
        assert!(!wrong_hop.passes(&ok(ROUTE_OUTPUT)));

        // Dots in the next hop are literal.
        let dotted = Probe::OspfRoute {
            node: "r1".into(),
            prefix: "10.0.2.0/24".into(),
            next_hop: "10.0.1.2".into(),
        };
        assert!(!dotted.passes(&ok("Known via \"ospf\"\n  * 10x0x1x2, via eth1\n")));
    }

    #[test]
    fn test_ospf_full_probe() {
        let probe = Probe::OspfFull { node: "r2".into() };
        assert!(probe.passes(&ok("1.1.1.1 1 Full/DR 35s 10.0.12.1 eth1 0 0 0")));
        assert!(!probe.passes(&ok("1.1.1.1 1 ExStart/DR 35s 10.0.12.1 eth1 0 0 0")));
    }

    #[test]
    fn test_vtysh_and_ping_probes() {
        let vtysh = Probe::VtyshAvailable { node: "r1".into() };
        assert!(vtysh.passes(&ok("FRRouting 8.4.4 (r1) on Linux")));
        assert!(!vtysh.passes(&ok("sh: vtysh: not found")));

        let ping = Probe::Ping {
            from: "h1".into(),
            target: "10.0.2.100".into(),
        };
        assert_eq!(ping.node(), "h1");
        assert_eq!(ping.command(), "ping -c1 -w3 10.0.2.100");
        assert!(ping.passes(&ok("")));
        assert!(!ping.passes(&CommandResult::failure(1, String::new(), String::new())));
    }

    #[test]
    fn test_probe_deserialize() {
        let probe: Probe = toml::from_str(
            "kind = \"ospf_route\"\nnode = \"r1\"\nprefix = \"10.0.2.0/24\"\nnext_hop = \"10.0.12.2\"",
        )
        .unwrap();
        assert_eq!(probe.node(), "r1");
    }

    #[test]
    fn test_default_probes_cover_lab() {
        let probes = default_probes();
        assert_eq!(probes.len(), 7);
        assert!(probes.iter().any(|p| matches!(p, Probe::Ping { .. })));
    }
}
