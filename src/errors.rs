// File: errors.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    Transport { target: String, message: String },
    LengthMismatch { expected: usize, actual: usize },
    ContentDivergence { offset: usize },
    ServerLifecycle(String),
    InvalidCase(String),
    Io(String),
    Interrupted,
}

impl HarnessError {
    pub fn transport(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// True for the errors produced by comparing two bodies.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::LengthMismatch { .. } | Self::ContentDivergence { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::ContentDivergence { .. } => "content_divergence",
            Self::ServerLifecycle(_) => "server_lifecycle",
            Self::InvalidCase(_) => "invalid_case",
            Self::Io(_) => "io",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { target, message } => {
                write!(f, "Transport error for {}: {}", target, message)
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: {} != {}", actual, expected)
            }
            Self::ContentDivergence { offset } => write!(f, "Diff at {}", offset),
            Self::ServerLifecycle(msg) => write!(f, "Origin server error: {}", msg),
            Self::InvalidCase(msg) => write!(f, "Invalid case: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Interrupted => write!(f, "Interrupted"),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<std::io::Error> for HarnessError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
