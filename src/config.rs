// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023
// - Volker Schwaberow <volker@schwaberow.de>

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_PORT: u16 = 18001;
pub const DEFAULT_PROXY: &str = "127.0.0.1:8082";
pub const DEFAULT_CHUNK_SIZE: &str = "22345";
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    port: u16,
    proxy: String,
    root: PathBuf,
    cases_file: Option<PathBuf>,
    timeout: u64,
    chunk_size: String,
    chunk_delay: u64,
    keep_going: bool,
    report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT,
            proxy: DEFAULT_PROXY.to_string(),
            root: PathBuf::from("."),
            cases_file: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            chunk_size: DEFAULT_CHUNK_SIZE.to_string(),
            chunk_delay: DEFAULT_CHUNK_DELAY_MS,
            keep_going: false,
            report_path: None,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self::new();
        config.set_port(cli.port);
        config.set_proxy(cli.proxy.clone());
        if let Some(root) = &cli.root {
            config.set_root(root.clone());
        }
        config.set_cases_file(cli.cases.clone());
        config.set_timeout(cli.timeout);
        config.set_chunk_size(cli.chunk_size.clone());
        config.set_chunk_delay(cli.chunk_delay);
        config.set_keep_going(cli.keep_going);
        config.set_report_path(cli.report.clone());
        config
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_proxy(&mut self, proxy: String) {
        self.proxy = proxy;
    }

    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    pub fn set_root(&mut self, root: PathBuf) {
        self.root = root;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_cases_file(&mut self, cases_file: Option<PathBuf>) {
        self.cases_file = cases_file;
    }

    pub fn cases_file(&self) -> Option<&Path> {
        self.cases_file.as_deref()
    }

    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = timeout;
    }

    /// Client timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn set_chunk_size(&mut self, chunk_size: String) {
        self.chunk_size = chunk_size;
    }

    pub fn chunk_size(&self) -> &str {
        &self.chunk_size
    }

    pub fn set_chunk_delay(&mut self, chunk_delay: u64) {
        self.chunk_delay = chunk_delay;
    }

    /// Delay between chunks in milliseconds.
    pub fn chunk_delay(&self) -> u64 {
        self.chunk_delay
    }

    pub fn set_keep_going(&mut self, keep_going: bool) {
        self.keep_going = keep_going;
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    pub fn set_report_path(&mut self, report_path: Option<PathBuf>) {
        self.report_path = report_path;
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
