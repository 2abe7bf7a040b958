// File: chunked.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! `GET /chunked?size=<S>&delay=<ms>`
//!
//! Streams `size` bytes of printable ASCII as separately flushed pieces with
//! `delay` milliseconds between them. The body has no known length, so it
//! always goes out with chunked transfer framing.

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Largest piece written between two flushes.
pub const PIECE_LEN: usize = 4096;

static SIZE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)([kmg])?$").unwrap());

static ASCII_PATTERN: Lazy<Bytes> = Lazy::new(|| {
    let mut buf = Vec::with_capacity(PIECE_LEN);
    let mut next: u8 = 0;
    while buf.len() < PIECE_LEN {
        next = (next + 1) % 128;
        if (0x20..=0x7e).contains(&next) {
            buf.push(next);
        }
    }
    Bytes::from(buf)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSize(pub String);

impl fmt::Display for InvalidSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid size: {:?}", self.0)
    }
}

impl std::error::Error for InvalidSize {}

/// Parses a byte count with an optional decimal unit suffix (`k`, `m`, `g`).
pub fn parse_size(raw: &str) -> Result<u64, InvalidSize> {
    let invalid = || InvalidSize(raw.to_string());
    let caps = SIZE_PATTERN.captures(raw).ok_or_else(invalid)?;
    let count: u64 = caps[1].parse().map_err(|_| invalid())?;
    let multiplier: u64 = match caps.get(2).map(|m| m.as_str()) {
        Some("k") => 1_000,
        Some("m") => 1_000_000,
        Some("g") => 1_000_000_000,
        _ => 1,
    };
    count.checked_mul(multiplier).ok_or_else(invalid)
}

/// Unparseable or missing delays mean no delay.
pub fn parse_delay(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::ZERO)
}

/// The pieces of a chunked body: `size - 1` pattern bytes cut at
/// [`PIECE_LEN`] boundaries, then a closing newline.
#[derive(Debug, Clone)]
pub struct AsciiPieces {
    remaining: u64,
    pos: usize,
    newline_sent: bool,
}

impl AsciiPieces {
    pub fn new(size: u64) -> Self {
        Self {
            remaining: size.saturating_sub(1),
            pos: 0,
            newline_sent: false,
        }
    }
}

impl Iterator for AsciiPieces {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining > 0 {
            let room = PIECE_LEN - self.pos;
            let len = room.min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
            let piece = ASCII_PATTERN.slice(self.pos..self.pos + len);
            self.remaining -= len as u64;
            self.pos = (self.pos + len) % PIECE_LEN;
            return Some(piece);
        }
        if !self.newline_sent {
            self.newline_sent = true;
            return Some(Bytes::from_static(b"\n"));
        }
        None
    }
}

#[derive(Debug, Deserialize)]
pub struct ChunkedQuery {
    size: Option<String>,
    delay: Option<String>,
}

pub async fn handler(Query(query): Query<ChunkedQuery>) -> Response {
    let size = match query.size.as_deref().map(parse_size) {
        Some(Ok(size)) => size,
        Some(Err(e)) => {
            debug!("chunked: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    let delay = parse_delay(query.delay.as_deref());
    debug!("chunked: streaming {} bytes, {:?} between pieces", size, delay);

    let pieces = stream::unfold(
        (AsciiPieces::new(size), true),
        move |(mut pieces, first)| async move {
            let piece = pieces.next()?;
            if !first && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Some((Ok::<_, std::io::Error>(piece), (pieces, false)))
        },
    );

    (
        [(header::CONTENT_TYPE, "text/plain")],
        Body::from_stream(pieces),
    )
        .into_response()
}
