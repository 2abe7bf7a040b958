// File: runner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

use crate::case::Case;
use crate::equality::compare_bodies;
use crate::errors::{HarnessError, HarnessResult};
use crate::fetch::DualFetcher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasePass {
    pub name: String,
    pub arguments: String,
    pub bytes: usize,
}

/// A case error labelled with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFailure {
    name: String,
    arguments: String,
    error: HarnessError,
}

impl CaseFailure {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>, error: HarnessError) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
            error,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn error(&self) -> &HarnessError {
        &self.error
    }

    pub fn into_error(self) -> HarnessError {
        self.error
    }
}

impl fmt::Display for CaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.arguments, self.error)
    }
}

impl std::error::Error for CaseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs single cases against an origin at `base`.
#[derive(Debug, Clone)]
pub struct CaseRunner {
    fetcher: DualFetcher,
    base: Url,
}

impl CaseRunner {
    pub fn new(fetcher: DualFetcher, base: Url) -> Self {
        Self { fetcher, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn run_case(&self, case: &Case) -> Result<CasePass, CaseFailure> {
        let url = case
            .resolve(&self.base)
            .map_err(|e| CaseFailure::new(case.name(), case.target(), e))?;
        let arguments = case.describe(&url);

        match self.check(case, &url).await {
            Ok(bytes) => {
                info!("{}: {} bytes identical", arguments, bytes);
                Ok(CasePass {
                    name: case.name().to_string(),
                    arguments,
                    bytes,
                })
            }
            Err(error) => Err(CaseFailure::new(case.name(), arguments, error)),
        }
    }

    async fn check(&self, case: &Case, url: &Url) -> HarnessResult<usize> {
        case.validate()?;
        let proxied = self.fetcher.fetch_via_proxy(case, url).await?;
        let direct = self.fetcher.fetch_direct(case, url).await?;

        debug!(
            "{}: proxied {} bytes sha256 {:x}, direct {} bytes sha256 {:x}",
            case.name(),
            proxied.len(),
            Sha256::digest(proxied.body()),
            direct.len(),
            Sha256::digest(direct.body())
        );

        compare_bodies(proxied.body(), direct.body())?;
        Ok(direct.len())
    }
}
