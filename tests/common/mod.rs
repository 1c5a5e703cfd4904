//! # Vouch test harness
//!
//! One `MemorySink` stands in for console, file and report so each test can assert on the
//! exact sequence of sink calls.

#![allow(dead_code)]

use std::sync::Arc;

use vouch::log::LogDispatcher;
use vouch::sink::{Captured, MemorySink, ReportSection, ReportSink};

/// A dispatcher whose three sinks are the returned `MemorySink`, with an active report node.
pub fn captured_dispatcher() -> (Arc<MemorySink>, LogDispatcher) {
    let sink = Arc::new(MemorySink::new());
    let log = LogDispatcher::new(sink.clone(), sink.clone()).with_report(sink.clone());
    sink.create_test("Suite");
    sink.create_node("case").expect("a test exists");
    (sink, log)
}

/// Report entries filed under `section`, in arrival order.
pub fn report_texts(sink: &MemorySink, section: ReportSection) -> Vec<String> {
    sink.report_entries()
        .into_iter()
        .filter(|(s, _)| *s == section)
        .map(|(_, text)| text)
        .collect()
}

pub fn is_report(captured: &Captured) -> bool {
    matches!(captured, Captured::Report { .. })
}
