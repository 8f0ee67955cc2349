//! Fuzz target for snapshot parsing and metric counting.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netauto::collect::Snapshot;
use netauto::report::aggregate;

fuzz_target!(|data: &str| {
    if let Ok(snapshot) = Snapshot::from_json(data) {
        let metrics = aggregate(&snapshot);
        assert!(metrics.total_full <= metrics.total_neighbors);
        assert_eq!(metrics.nodes.len(), snapshot.len());
    }
});
