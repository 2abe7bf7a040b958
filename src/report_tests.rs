// File: report_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#[cfg(test)]
mod tests {
    use crate::errors::HarnessError;
    use crate::report::*;
    use crate::runner::{CaseFailure, CasePass};
    use crate::session::SessionOutcome;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn passing_outcome() -> SessionOutcome {
        let mut outcome = SessionOutcome::begin();
        outcome.record_pass(CasePass {
            name: "root".to_string(),
            arguments: "-L GET http://127.0.0.1:18001/".to_string(),
            bytes: 512,
        });
        outcome.finish();
        outcome
    }

    fn failing_outcome() -> SessionOutcome {
        let mut outcome = SessionOutcome::begin();
        outcome.record_pass(CasePass {
            name: "root".to_string(),
            arguments: "-L GET http://127.0.0.1:18001/".to_string(),
            bytes: 512,
        });
        outcome.record_failure(CaseFailure::new(
            "chunked",
            "GET http://127.0.0.1:18001/chunked?size=22345&delay=600",
            HarnessError::LengthMismatch {
                expected: 22345,
                actual: 20480,
            },
        ));
        outcome.finish();
        outcome
    }

    #[test]
    fn test_verdict_lines_on_success() {
        let (out, err) = verdict_lines(&passing_outcome());
        assert_eq!(out, vec![PASS_MARKER.to_string()]);
        assert!(err.is_empty());
    }

    #[test]
    fn test_verdict_lines_on_failure() {
        let (out, err) = verdict_lines(&failing_outcome());
        assert!(out.is_empty());
        assert_eq!(
            err,
            vec![
                "GET http://127.0.0.1:18001/chunked?size=22345&delay=600 failed: Length mismatch: 20480 != 22345"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_verdict_lines_include_session_error() {
        let mut outcome = SessionOutcome::begin();
        outcome.fail_session(HarnessError::Interrupted);
        outcome.fail_session(HarnessError::ServerLifecycle("late".to_string()));
        outcome.finish();

        let (out, err) = verdict_lines(&outcome);
        assert!(out.is_empty());
        assert_eq!(err, vec!["Interrupted".to_string()]);
    }

    #[test]
    fn test_unfinished_outcome_is_not_success() {
        let outcome = SessionOutcome::begin();
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_generate_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let report = SessionReport::from_outcome(&failing_outcome());
        ReportGenerator::generate_json_report(&report, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let json: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["cases"].as_array().unwrap().len(), 2);
        assert_eq!(json["cases"][0]["status"], "pass");
        assert_eq!(json["cases"][0]["bytes"], 512);
        assert_eq!(json["cases"][1]["status"], "fail");
        assert_eq!(json["cases"][1]["error_kind"], "length_mismatch");
        assert!(json["session_error"].is_null());
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_generate_json_report_invalid_path() {
        let report = SessionReport::from_outcome(&passing_outcome());
        let result = ReportGenerator::generate_json_report(
            &report,
            std::path::Path::new("/nonexistent/dir/report.json"),
        );
        assert!(result.is_err());
    }
}
