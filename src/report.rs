// File: report.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::fs::File;
use std::io::{Result, Write};
use std::path::Path;

use crate::session::SessionOutcome;

pub const PASS_MARKER: &str = "PASS";

#[derive(Debug, Serialize)]
pub struct CaseEntry {
    pub name: String,
    pub arguments: String,
    pub status: String,
    pub bytes: Option<usize>,
    pub error_kind: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub verdict: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: i64,
    pub cases: Vec<CaseEntry>,
    pub session_error: Option<String>,
}

impl SessionReport {
    pub fn from_outcome(outcome: &SessionOutcome) -> Self {
        let mut cases: Vec<CaseEntry> = outcome
            .passed()
            .iter()
            .map(|pass| CaseEntry {
                name: pass.name.clone(),
                arguments: pass.arguments.clone(),
                status: "pass".to_string(),
                bytes: Some(pass.bytes),
                error_kind: None,
                error: None,
            })
            .collect();
        cases.extend(outcome.failures().iter().map(|failure| CaseEntry {
            name: failure.name().to_string(),
            arguments: failure.arguments().to_string(),
            status: "fail".to_string(),
            bytes: None,
            error_kind: Some(failure.error().kind().to_string()),
            error: Some(failure.error().to_string()),
        }));

        SessionReport {
            verdict: if outcome.is_success() { "pass" } else { "fail" }.to_string(),
            started_at: outcome.started_at(),
            finished_at: outcome.finished_at(),
            duration_ms: outcome.duration_ms(),
            cases,
            session_error: outcome.session_error().map(|e| e.to_string()),
        }
    }
}

pub struct ReportGenerator;

impl ReportGenerator {
    pub fn generate_json_report(report: &SessionReport, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(output_path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// The lines a finished session prints: `(stdout, stderr)`.
pub fn verdict_lines(outcome: &SessionOutcome) -> (Vec<String>, Vec<String>) {
    if outcome.is_success() {
        return (vec![PASS_MARKER.to_string()], Vec::new());
    }
    let mut errors: Vec<String> = outcome.failures().iter().map(|f| f.to_string()).collect();
    if let Some(e) = outcome.session_error() {
        errors.push(e.to_string());
    }
    (Vec::new(), errors)
}

pub fn print_verdict(outcome: &SessionOutcome) {
    let (out, err) = verdict_lines(outcome);
    for line in out {
        println!("{}", line);
    }
    for line in err {
        eprintln!("{}", line.red());
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
