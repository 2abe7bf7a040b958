// File: logging_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

mod common;

use log::{Level, LevelFilter, Log, Metadata, Record};
use proxycheck::case::Case;
use proxycheck::errors::HarnessError;
use proxycheck::fetch::DualFetcher;
use proxycheck::origin::OriginConfig;
use proxycheck::report::verdict_lines;
use proxycheck::session::Session;
use serial_test::serial;
use std::sync::{Mutex, Once};
use std::time::Duration;
use tempfile::TempDir;

use common::{dead_address, sample_document, write_file};

/// Keeps every record logged by this crate.
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("proxycheck")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut records) = self.records.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

fn capture() -> &'static CaptureLogger {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURE.records.lock().unwrap().clear();
    &CAPTURE
}

/// Records that would reach stderr with the default `warn` filter.
fn default_level_records(logger: &CaptureLogger) -> Vec<(Level, String)> {
    logger
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level <= Level::Warn)
        .cloned()
        .collect()
}

fn session_with_dead_proxy(root: &TempDir) -> Session {
    let fetcher = DualFetcher::new(&dead_address(), Duration::from_secs(10)).unwrap();
    Session::new(OriginConfig::new(0, root.path()), fetcher)
}

#[tokio::test]
#[serial]
async fn test_case_failure_is_reported_once() {
    let logger = capture();
    let root = TempDir::new().unwrap();
    write_file(root.path(), "index.html", &sample_document(100));

    let mut session = session_with_dead_proxy(&root);
    session.set_keep_going(true);
    let cases = vec![Case::get("root", "/"), Case::get("index", "/index.html")];
    let outcome = session.run(&cases, std::future::pending::<()>()).await;

    assert_eq!(outcome.failures().len(), 2);
    let (out, err) = verdict_lines(&outcome);
    assert!(out.is_empty());
    assert_eq!(err.len(), 2);

    assert_eq!(default_level_records(logger), Vec::new());
    let records = logger.records.lock().unwrap();
    assert!(records
        .iter()
        .any(|(level, message)| *level == Level::Info && message.contains("failed: ")));
}

#[tokio::test]
#[serial]
async fn test_interrupt_logs_nothing_at_default_level() {
    let logger = capture();
    let root = TempDir::new().unwrap();

    let mut session = session_with_dead_proxy(&root);
    let cases = vec![Case::get("root", "/")];
    let outcome = session.run(&cases, async {}).await;

    assert_eq!(outcome.session_error(), Some(&HarnessError::Interrupted));
    let (_, err) = verdict_lines(&outcome);
    assert_eq!(err.len(), 1);
    assert_eq!(default_level_records(logger), Vec::new());
}
