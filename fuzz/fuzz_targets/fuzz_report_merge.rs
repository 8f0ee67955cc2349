//! Fuzz target for the report merge.
//!
//! Whatever the existing document looks like, the merged text starts with the
//! new summary and keeps everything after the old summary untouched.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use netauto::report::markdown::{merge_summary, preserved_detail};
use netauto::report::{SEPARATOR, SUMMARY_MARK};

#[derive(Debug, Arbitrary)]
struct FuzzMerge {
    summary_body: String,
    existing: String,
}

fuzz_target!(|input: FuzzMerge| {
    let body = input.summary_body.replace('-', "");
    let summary = format!("{}fuzz)\n{}{}", SUMMARY_MARK, body, SEPARATOR);

    let merged = merge_summary(&summary, &input.existing);
    assert!(merged.starts_with(&summary));

    if let Some(detail) = preserved_detail(&input.existing) {
        assert_eq!(preserved_detail(&merged), Some(detail));
    }
});
