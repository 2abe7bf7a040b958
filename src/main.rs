/*
Copyright 2022 Volker Schwaberow <volker@schwaberow.de>
Permission is hereby granted, free of charge, to any person obtaining a
copy of this software and associated documentation files (the
"Software"), to deal in the Software without restriction, including without
limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the
Software is furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be
included in all copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR
OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE,
ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
DEALINGS IN THE SOFTWARE.
Author(s): Volker Schwaberow
*/

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::process::ExitCode;

use proxycheck::case::{default_cases, load_cases, Case};
use proxycheck::cli::Cli;
use proxycheck::config::HarnessConfig;
use proxycheck::fetch::DualFetcher;
use proxycheck::origin::OriginConfig;
use proxycheck::report::{print_verdict, ReportGenerator, SessionReport};
use proxycheck::session::Session;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = SimpleLogger::new().with_level(cli.level_filter()).init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", format!("{:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<bool> {
    let config = HarnessConfig::from_cli(cli);
    let cases: Vec<Case> = match config.cases_file() {
        Some(path) => load_cases(path)?,
        None => default_cases(config.chunk_size(), config.chunk_delay()),
    };
    info!(
        "running {} case(s) through proxy {}",
        cases.len(),
        config.proxy()
    );

    let fetcher = DualFetcher::new(config.proxy(), config.timeout_duration())
        .context("Failed to build HTTP clients")?;
    let mut session = Session::new(OriginConfig::new(config.port(), config.root()), fetcher);
    session.set_keep_going(config.keep_going());

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let outcome = session.run(&cases, interrupt).await;
    print_verdict(&outcome);

    if let Some(path) = config.report_path() {
        let report = SessionReport::from_outcome(&outcome);
        ReportGenerator::generate_json_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(outcome.is_success())
}
