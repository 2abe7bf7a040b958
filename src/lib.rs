// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_inception)]
#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::new_without_default)]

pub mod case;
pub mod cli;
pub mod config;
pub mod equality;
pub mod errors;
pub mod fetch;
pub mod origin;
pub mod report;
pub mod runner;
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_imports() {
        let _ = config::HarnessConfig::default();
        let _ = case::default_cases("1k", 0);
        let _ = equality::DivergencePoint::Equal;
        let _ = origin::OriginConfig::new(0, ".");
        let _ = session::SessionState::NotStarted;
    }
}
