// File: fetch.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use log::debug;
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::case::{Case, CaseMethod};
use crate::errors::{HarnessError, HarnessResult};

/// Maximum redirect hops when a case asks for redirects to be followed.
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    Direct,
    Proxied,
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPath::Direct => f.write_str("direct"),
            FetchPath::Proxied => f.write_str("proxied"),
        }
    }
}

/// Outcome of one fetch. A failed fetch keeps the diagnostic text in
/// `error` and an empty body.
#[derive(Debug, Clone)]
pub struct FetchResult {
    path: FetchPath,
    url: String,
    status: u16,
    body: Vec<u8>,
    success: bool,
    error: Option<String>,
}

impl FetchResult {
    pub fn new_with_all(
        path: FetchPath,
        url: String,
        status: u16,
        body: Vec<u8>,
        success: bool,
        error: Option<String>,
    ) -> Self {
        FetchResult {
            path,
            url,
            status,
            body,
            success,
            error,
        }
    }

    fn failed(path: FetchPath, url: String, status: u16, error: String) -> Self {
        Self::new_with_all(path, url, status, Vec::new(), false, Some(error))
    }

    pub fn path(&self) -> FetchPath {
        self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Turns a failed fetch, or a non-2xx status when `require_2xx` is set,
    /// into a transport error.
    pub fn ensure_success(self, require_2xx: bool) -> HarnessResult<Self> {
        if !self.success {
            let message = self
                .error
                .clone()
                .unwrap_or_else(|| "unknown transport failure".to_string());
            return Err(HarnessError::transport(
                self.url.clone(),
                format!("{} fetch failed: {}", self.path, message),
            ));
        }
        if require_2xx && !(200..300).contains(&self.status) {
            return Err(HarnessError::transport(
                self.url.clone(),
                format!("{} fetch returned status {}", self.path, self.status),
            ));
        }
        Ok(self)
    }
}

/// Issues the same request directly and through the proxy under test.
#[derive(Debug, Clone)]
pub struct DualFetcher {
    proxy: String,
    direct: Client,
    direct_follow: Client,
    proxied: Client,
    proxied_follow: Client,
}

impl DualFetcher {
    pub fn new(proxy: &str, timeout: Duration) -> HarnessResult<Self> {
        let proxy_url = if proxy.contains("://") {
            proxy.to_string()
        } else {
            format!("http://{}", proxy)
        };

        let build = |through_proxy: bool, follow: bool| -> HarnessResult<Client> {
            let policy = if follow {
                Policy::limited(MAX_REDIRECTS)
            } else {
                Policy::none()
            };
            let mut builder = Client::builder().timeout(timeout).redirect(policy);
            builder = if through_proxy {
                let proxy = Proxy::http(&proxy_url)
                    .map_err(|e| HarnessError::transport(proxy_url.clone(), e))?;
                builder.proxy(proxy)
            } else {
                builder.no_proxy()
            };
            builder
                .build()
                .map_err(|e| HarnessError::transport(proxy_url.clone(), e))
        };

        Ok(DualFetcher {
            direct: build(false, false)?,
            direct_follow: build(false, true)?,
            proxied: build(true, false)?,
            proxied_follow: build(true, true)?,
            proxy: proxy_url.clone(),
        })
    }

    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    pub async fn fetch_direct(&self, case: &Case, url: &Url) -> HarnessResult<FetchResult> {
        let client = if case.follow_redirects() {
            &self.direct_follow
        } else {
            &self.direct
        };
        fetch(client, FetchPath::Direct, case, url)
            .await
            .ensure_success(case.require_success())
    }

    pub async fn fetch_via_proxy(&self, case: &Case, url: &Url) -> HarnessResult<FetchResult> {
        let client = if case.follow_redirects() {
            &self.proxied_follow
        } else {
            &self.proxied
        };
        fetch(client, FetchPath::Proxied, case, url)
            .await
            .ensure_success(case.require_success())
    }
}

async fn fetch(client: &Client, path: FetchPath, case: &Case, url: &Url) -> FetchResult {
    let request = match case.method() {
        CaseMethod::Get => client.get(url.clone()),
        CaseMethod::Post => client
            .post(url.clone())
            .body(case.body().unwrap_or_default().to_string()),
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let status = e.status().map_or(0, |s| s.as_u16());
            return FetchResult::failed(path, url.to_string(), status, error_chain(e));
        }
    };

    let final_url = response.url().to_string();
    let status = response.status().as_u16();
    match response.bytes().await {
        Ok(body) => {
            debug!(
                "{} {} -> {} ({} bytes)",
                path,
                final_url,
                status,
                body.len()
            );
            FetchResult::new_with_all(path, final_url, status, body.to_vec(), true, None)
        }
        Err(e) => FetchResult::failed(
            path,
            final_url,
            status,
            format!("Failed to read body: {}", error_chain(e)),
        ),
    }
}

/// The error and every cause below it, joined with `: `.
fn error_chain<E>(error: E) -> String
where
    E: std::error::Error + Send + Sync + 'static,
{
    format!("{:#}", anyhow::Error::new(error))
}
