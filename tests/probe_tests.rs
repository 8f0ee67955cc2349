//! Lab probe tests with scripted connections.

mod common;

use common::*;
use netauto::probe::{default_probes, exit_code, Probe, ProbeRunner, ProbeStatus};
use netauto::retry::RetryPolicy;
use std::time::Duration;

const NEIGHBOR_CMD: &str = "vtysh -c 'show ip ospf neighbor'";

fn runner(attempts: u32) -> ProbeRunner {
    ProbeRunner::new(RetryPolicy::constant(attempts, Duration::ZERO), 5)
}

#[tokio::test]
async fn test_probe_passes_after_convergence() {
    let factory = MockFactory::new();
    let r1 = factory.add("r1");
    r1.set_stdout(NEIGHBOR_CMD, R1_NEIGHBORS);
    r1.fail_first(2);

    let outcome = runner(5)
        .run(&Probe::OspfFull { node: "r1".into() }, &factory)
        .await;

    assert_eq!(outcome.status, ProbeStatus::Passed);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.container, "clab-netauto-r1");
    assert_eq!(r1.command_count(), 3);
}

#[tokio::test]
async fn test_probe_fails_when_never_full() {
    let factory = MockFactory::new();
    let r2 = factory.add("r2");
    r2.set_stdout(NEIGHBOR_CMD, R2_NEIGHBORS_EXSTART);

    let outcome = runner(3)
        .run(&Probe::OspfFull { node: "r2".into() }, &factory)
        .await;

    assert_eq!(outcome.status, ProbeStatus::Failed);
    assert_eq!(outcome.attempts, 3);
    assert!(outcome.detail.contains("ExStart"));
    assert_eq!(exit_code(&[outcome]), 1);
}

#[tokio::test]
async fn test_probe_reports_timeouts() {
    let factory = MockFactory::new();
    let h1 = factory.add("h1");
    h1.set_timeout("ping -c1 -w3 10.0.2.100");

    let outcome = runner(2)
        .run(
            &Probe::Ping {
                from: "h1".into(),
                target: "10.0.2.100".into(),
            },
            &factory,
        )
        .await;

    assert_eq!(outcome.status, ProbeStatus::Failed);
    assert!(outcome.detail.contains("timeout"));
    assert_eq!(h1.command_count(), 2);
}

#[tokio::test]
async fn test_route_probe_checks_next_hop() {
    let factory = MockFactory::new();
    let r1 = factory.add("r1");
    r1.set_stdout(
        "vtysh -c 'show ip route 10.0.2.0/24'",
        "Routing entry for 10.0.2.0/24\n  Known via \"ospf\", distance 110, metric 20, best\n  * 10.0.12.2, via eth1, weight 1\n",
    );

    let good = Probe::OspfRoute {
        node: "r1".into(),
        prefix: "10.0.2.0/24".into(),
        next_hop: "10.0.12.2".into(),
    };
    let bad = Probe::OspfRoute {
        node: "r1".into(),
        prefix: "10.0.2.0/24".into(),
        next_hop: "10.0.12.6".into(),
    };

    let outcomes = runner(1).run_all(&[good, bad], &factory).await;
    assert_eq!(outcomes[0].status, ProbeStatus::Passed);
    assert_eq!(outcomes[1].status, ProbeStatus::Failed);
    assert_eq!(exit_code(&outcomes), 1);
}

#[tokio::test]
async fn test_light_mode_skips_everything() {
    let factory = MockFactory::new();
    let r1 = factory.add("r1");

    let outcomes = runner(5).light(true).run_all(&default_probes(), &factory).await;

    assert_eq!(outcomes.len(), 7);
    assert!(outcomes.iter().all(|o| o.status == ProbeStatus::Skipped));
    assert_eq!(exit_code(&outcomes), 0);
    assert_eq!(r1.command_count(), 0);
}
