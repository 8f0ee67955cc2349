//! Fuzz target for section extraction.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netauto::section::extract_ospf;

fuzz_target!(|data: &str| {
    let section = extract_ospf(data);
    if !section.is_empty() {
        assert!(data.contains(&section));
        assert!(section.starts_with("router ospf"));
    }
});
