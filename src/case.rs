// File: case.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

use crate::errors::{HarnessError, HarnessResult};

pub const ECHO_PAYLOAD: &str = "proxycheck echo payload\nline two\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseMethod {
    #[default]
    Get,
    Post,
}

impl CaseMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseMethod::Get => "GET",
            CaseMethod::Post => "POST",
        }
    }
}

impl fmt::Display for CaseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to issue through both paths and compare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    name: String,
    target: String,
    #[serde(default)]
    method: CaseMethod,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    query: Vec<(String, String)>,
    #[serde(default)]
    follow_redirects: bool,
    #[serde(default = "default_require_success")]
    require_success: bool,
}

fn default_require_success() -> bool {
    true
}

impl Case {
    pub fn get(name: impl Into<String>, target: impl Into<String>) -> Self {
        Case {
            name: name.into(),
            target: target.into(),
            method: CaseMethod::Get,
            body: None,
            query: Vec::new(),
            follow_redirects: false,
            require_success: true,
        }
    }

    /// Request for the slow chunked endpoint of the origin server.
    pub fn chunked(size: impl Into<String>, delay_ms: u64) -> Self {
        Case::get("chunked", "/chunked")
            .with_query("size", size)
            .with_query("delay", delay_ms.to_string())
    }

    pub fn post_echo(body: impl Into<String>) -> Self {
        let mut case = Case::get("post_echo", "/post_echo");
        case.method = CaseMethod::Post;
        case.body = Some(body.into());
        case
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn with_require_success(mut self, require: bool) -> Self {
        self.require_success = require;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn method(&self) -> CaseMethod {
        self.method
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    pub fn require_success(&self) -> bool {
        self.require_success
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.name.trim().is_empty() {
            return Err(HarnessError::InvalidCase("case name is empty".to_string()));
        }
        if self.target.trim().is_empty() {
            return Err(HarnessError::InvalidCase(format!(
                "case '{}' has no target",
                self.name
            )));
        }
        if self.body.is_some() && self.method == CaseMethod::Get {
            return Err(HarnessError::InvalidCase(format!(
                "case '{}' has a body but uses GET",
                self.name
            )));
        }
        Ok(())
    }

    /// Absolute targets are used as-is, paths are joined onto `base`.
    pub fn resolve(&self, base: &Url) -> HarnessResult<Url> {
        let mut url = match Url::parse(&self.target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => base.join(&self.target).map_err(|e| {
                HarnessError::InvalidCase(format!("cannot resolve '{}': {}", self.target, e))
            })?,
            Err(e) => {
                return Err(HarnessError::InvalidCase(format!(
                    "bad target '{}': {}",
                    self.target, e
                )))
            }
        };
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// The identifying arguments used to label failures.
    pub fn describe(&self, url: &Url) -> String {
        if self.follow_redirects {
            format!("-L {} {}", self.method, url)
        } else {
            format!("{} {}", self.method, url)
        }
    }
}

pub fn default_cases(chunk_size: &str, chunk_delay_ms: u64) -> Vec<Case> {
    vec![
        Case::get("root", "/").with_follow_redirects(true),
        Case::chunked(chunk_size, chunk_delay_ms),
        Case::post_echo(ECHO_PAYLOAD),
    ]
}

/// Reads a JSON array of cases.
pub fn load_cases(path: &Path) -> Result<Vec<Case>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file {}", path.display()))?;
    let cases: Vec<Case> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse case file {}", path.display()))?;
    if cases.is_empty() {
        anyhow::bail!("Case file {} contains no cases", path.display());
    }
    for case in &cases {
        case.validate()?;
    }
    Ok(cases)
}
