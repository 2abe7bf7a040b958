// File: session.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! Session driver.
//!
//! A session starts the origin server once, runs every case strictly in
//! order, and stops the server once on every exit path: all cases passed,
//! a case failed, or the caller's interrupt future fired.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::future::Future;

use crate::case::Case;
use crate::errors::HarnessError;
use crate::fetch::DualFetcher;
use crate::origin::{OriginConfig, OriginServer};
use crate::runner::{CaseFailure, CasePass, CaseRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    NotStarted,
    ServerRunning,
    Checking,
    Checked,
    ServerStopped,
    Done,
}

#[derive(Debug, Clone)]
pub struct SessionOutcome {
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    passed: Vec<CasePass>,
    failures: Vec<CaseFailure>,
    session_error: Option<HarnessError>,
}

impl SessionOutcome {
    pub(crate) fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            passed: Vec::new(),
            failures: Vec::new(),
            session_error: None,
        }
    }

    pub(crate) fn record_pass(&mut self, pass: CasePass) {
        self.passed.push(pass);
    }

    pub(crate) fn record_failure(&mut self, failure: CaseFailure) {
        self.failures.push(failure);
    }

    /// Keeps the first session-level error; later ones are only logged.
    /// The verdict prints failures itself, so nothing here logs above `info`.
    pub(crate) fn fail_session(&mut self, error: HarnessError) {
        if self.session_error.is_some() {
            info!("additional session error: {}", error);
            return;
        }
        self.session_error = Some(error);
    }

    pub(crate) fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn passed(&self) -> &[CasePass] {
        &self.passed
    }

    pub fn failures(&self) -> &[CaseFailure] {
        &self.failures
    }

    pub fn session_error(&self) -> Option<&HarnessError> {
        self.session_error.as_ref()
    }

    pub fn cases_run(&self) -> usize {
        self.passed.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.finished_at.is_some() && self.failures.is_empty() && self.session_error.is_none()
    }

    pub fn duration_ms(&self) -> i64 {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or(0)
    }
}

pub struct Session {
    origin: OriginConfig,
    fetcher: DualFetcher,
    keep_going: bool,
    history: Vec<SessionState>,
}

impl Session {
    pub fn new(origin: OriginConfig, fetcher: DualFetcher) -> Self {
        Self {
            origin,
            fetcher,
            keep_going: false,
            history: vec![SessionState::NotStarted],
        }
    }

    /// Run every case even after one has failed.
    pub fn set_keep_going(&mut self, keep_going: bool) {
        self.keep_going = keep_going;
    }

    pub fn state(&self) -> SessionState {
        self.history
            .last()
            .copied()
            .unwrap_or(SessionState::NotStarted)
    }

    /// Every state entered by the most recent run, in order.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    fn enter(&mut self, state: SessionState) {
        debug!("session: {:?} -> {:?}", self.state(), state);
        self.history.push(state);
    }

    pub async fn run<F>(&mut self, cases: &[Case], interrupt: F) -> SessionOutcome
    where
        F: Future<Output = ()>,
    {
        self.history = vec![SessionState::NotStarted];
        let mut outcome = SessionOutcome::begin();

        let handle = match OriginServer::start(&self.origin).await {
            Ok(handle) => handle,
            Err(e) => {
                outcome.fail_session(e);
                outcome.finish();
                self.enter(SessionState::Done);
                return outcome;
            }
        };
        self.enter(SessionState::ServerRunning);

        match handle.base_url() {
            Ok(base) => {
                let runner = CaseRunner::new(self.fetcher.clone(), base);
                tokio::pin!(interrupt);
                let interrupted = tokio::select! {
                    _ = self.run_cases(&runner, cases, &mut outcome) => false,
                    _ = &mut interrupt => true,
                };
                if interrupted {
                    info!("session interrupted, stopping origin server");
                    outcome.fail_session(HarnessError::Interrupted);
                }
            }
            Err(e) => outcome.fail_session(e),
        }

        let stopped = handle.stop().await;
        self.enter(SessionState::ServerStopped);
        if let Err(e) = stopped {
            outcome.fail_session(e);
        }

        outcome.finish();
        self.enter(SessionState::Done);
        outcome
    }

    async fn run_cases(
        &mut self,
        runner: &CaseRunner,
        cases: &[Case],
        outcome: &mut SessionOutcome,
    ) {
        for case in cases {
            self.enter(SessionState::Checking);
            let result = runner.run_case(case).await;
            self.enter(SessionState::Checked);
            match result {
                Ok(pass) => outcome.record_pass(pass),
                Err(failure) => {
                    info!("{}", failure);
                    outcome.record_failure(failure);
                    if !self.keep_going {
                        break;
                    }
                }
            }
        }
    }
}

/// Runs `cases` with no external interrupt.
pub async fn run_session(
    origin: OriginConfig,
    fetcher: DualFetcher,
    cases: &[Case],
) -> SessionOutcome {
    let mut session = Session::new(origin, fetcher);
    session.run(cases, std::future::pending::<()>()).await
}
