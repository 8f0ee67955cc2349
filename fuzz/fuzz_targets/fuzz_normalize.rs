//! Fuzz target for whitespace normalization.
//!
//! Normalizing twice must give the same text as normalizing once.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netauto::normalize::normalize;

fuzz_target!(|data: &str| {
    let once = normalize(data);
    assert_eq!(normalize(&once), once);
    assert!(!once.contains("\n\n"));
});
