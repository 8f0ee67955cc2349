//! JUnit XML test summaries.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Aggregate counts of a JUnit results document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TestSummary {
    /// Tests run
    pub tests: u64,
    /// Assertion failures
    pub failures: u64,
    /// Errors outside assertions
    pub errors: u64,
    /// Skipped tests
    pub skipped: u64,
    /// `tests - failures - errors - skipped`, never negative
    pub passed: u64,
}

impl TestSummary {
    /// Summarize the JUnit file at `path`. An absent file counts as no tests.
    pub fn from_junit(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(xml) => Self::from_xml(&xml),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no junit results");
                Self::default()
            }
        }
    }

    /// Summarize a JUnit document. Malformed XML counts as no tests.
    ///
    /// A `testsuites` root sums its `testsuite` children, a `testsuite` root
    /// counts itself, any other root sums every nested `testsuite`.
    pub fn from_xml(xml: &str) -> Self {
        match collect_suites(xml) {
            Ok(suites) => Self::from_suites(&suites),
            Err(message) => {
                warn!(error = %message, "malformed junit xml, counting zero tests");
                Self::default()
            }
        }
    }

    fn from_suites(suites: &[SuiteCounts]) -> Self {
        let mut summary = Self::default();
        for suite in suites {
            summary.tests += suite.tests;
            summary.failures += suite.failures;
            summary.errors += suite.errors;
            summary.skipped += suite.skipped;
        }
        summary.passed = summary
            .tests
            .saturating_sub(summary.failures)
            .saturating_sub(summary.errors)
            .saturating_sub(summary.skipped);
        summary
    }

    /// Failures plus errors.
    pub fn failed(&self) -> u64 {
        self.failures + self.errors
    }
}

#[derive(Debug, Default)]
struct SuiteCounts {
    tests: u64,
    failures: u64,
    errors: u64,
    skipped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Suites,
    Suite,
    Other,
}

fn collect_suites(xml: &str) -> Result<Vec<SuiteCounts>, String> {
    let mut reader = Reader::from_str(xml);
    let mut suites = Vec::new();
    let mut root: Option<RootKind> = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            format!("at position {}: {}", reader.buffer_position(), e)
        })?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let level = depth + 1;
                let is_suite = e.name().as_ref() == b"testsuite";

                let kind = *root.get_or_insert_with(|| match e.name().as_ref() {
                    b"testsuites" => RootKind::Suites,
                    b"testsuite" => RootKind::Suite,
                    _ => RootKind::Other,
                });

                let counted = match kind {
                    RootKind::Suites => is_suite && level == 2,
                    RootKind::Suite => level == 1,
                    RootKind::Other => is_suite && level >= 2,
                };
                if counted {
                    suites.push(suite_counts(e)?);
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if root.is_none() {
        return Err("document has no root element".to_string());
    }
    if depth != 0 {
        return Err("unclosed element at end of document".to_string());
    }
    Ok(suites)
}

fn suite_counts(element: &BytesStart<'_>) -> Result<SuiteCounts, String> {
    let mut counts = SuiteCounts::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let slot = match attr.key.as_ref() {
            b"tests" => &mut counts.tests,
            b"failures" => &mut counts.failures,
            b"errors" => &mut counts.errors,
            b"skipped" => &mut counts.skipped,
            _ => continue,
        };
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        *slot = parse_count(&value);
    }
    Ok(counts)
}

fn parse_count(value: &str) -> u64 {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return n;
    }
    warn!(value = %value, "non-numeric junit count, using 0");
    0
}
