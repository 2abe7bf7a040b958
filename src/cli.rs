// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{
    DEFAULT_CHUNK_DELAY_MS, DEFAULT_CHUNK_SIZE, DEFAULT_PORT, DEFAULT_PROXY, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(
        short = 'p',
        long = "port",
        default_value_t = DEFAULT_PORT,
        help = "Port the origin server listens on"
    )]
    pub port: u16,

    #[arg(
        short = 'x',
        long = "proxy",
        default_value = DEFAULT_PROXY,
        help = "Address of the proxy under test (host:port or URL)"
    )]
    pub proxy: String,

    #[arg(
        short = 'r',
        long = "root",
        help = "Document root served by the origin server (default: current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(short = 'c', long = "cases", help = "JSON file with the cases to run")]
    pub cases: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "timeout",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "HTTP client timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long = "chunk-size",
        default_value = DEFAULT_CHUNK_SIZE,
        help = "Body size for the chunked case, accepts k/m/g suffixes"
    )]
    pub chunk_size: String,

    #[arg(
        long = "chunk-delay",
        default_value_t = DEFAULT_CHUNK_DELAY_MS,
        help = "Milliseconds between chunks for the chunked case"
    )]
    pub chunk_delay: u64,

    #[arg(
        short = 'k',
        long = "keep-going",
        help = "Run remaining cases after a failure"
    )]
    pub keep_going: bool,

    #[arg(long = "report", help = "Write a JSON session report to this path")]
    pub report: Option<PathBuf>,

    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short = 'q', long = "quiet", help = "Reduce output verbosity")]
    pub quiet: bool,

    #[arg(long = "no-color", help = "Disable colored output")]
    pub no_color: bool,
}

impl Cli {
    pub fn level_filter(&self) -> LevelFilter {
        if self.verbose {
            return LevelFilter::Debug;
        }
        if self.quiet {
            return LevelFilter::Error;
        }
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}
