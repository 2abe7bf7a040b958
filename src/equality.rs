// File: equality.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

//! Byte-exact comparison of two response bodies.
//!
//! Comparison runs in two steps. [`check_length`] is a constant-time guard
//! that reports a truncated or extended body as "N vs M bytes".
//! [`check_bytes`] then walks both inputs in lockstep and reports the first
//! offset at which they differ. The scan works over any [`ByteSource`], so
//! an in-memory body and a streamed reader compare the same way.

use std::io::{self, BufRead, BufReader, Read};

use crate::errors::{HarnessError, HarnessResult};

/// An ordered, finite sequence of bytes that can be consumed one at a time.
pub trait ByteSource {
    /// Returns the next byte, or `None` once the sequence is exhausted.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

impl ByteSource for &[u8] {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }
}

/// Adapts any iterator of bytes.
#[derive(Debug, Clone)]
pub struct IterSource<I>(pub I);

impl<I: Iterator<Item = u8>> ByteSource for IterSource<I> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.0.next())
    }
}

/// Adapts a reader. Reads are buffered, so wrapping a socket or file does
/// not cost one syscall per byte.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: BufReader<R>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.inner.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        self.inner.consume(1);
        Ok(Some(byte))
    }
}

/// Where two sequences first disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergencePoint {
    Equal,
    At(usize),
}

impl DivergencePoint {
    pub fn is_equal(&self) -> bool {
        matches!(self, DivergencePoint::Equal)
    }

    pub fn into_result(self) -> HarnessResult<()> {
        match self {
            DivergencePoint::Equal => Ok(()),
            DivergencePoint::At(offset) => Err(HarnessError::ContentDivergence { offset }),
        }
    }
}

/// Fails with both lengths when the proxied body and the direct body differ
/// in size.
pub fn check_length(proxied: impl AsRef<[u8]>, direct: impl AsRef<[u8]>) -> HarnessResult<()> {
    let actual = proxied.as_ref().len();
    let expected = direct.as_ref().len();
    if actual != expected {
        return Err(HarnessError::LengthMismatch { expected, actual });
    }
    Ok(())
}

/// Scans both sources position by position and returns the zero-based
/// offset of the first differing byte.
///
/// The scan stops as soon as either side is exhausted, so only the common
/// prefix is compared. Callers that need equal lengths run [`check_length`]
/// first.
pub fn check_bytes<A, B>(mut a: A, mut b: B) -> io::Result<DivergencePoint>
where
    A: ByteSource,
    B: ByteSource,
{
    let mut offset = 0usize;
    loop {
        let left = match a.next_byte()? {
            Some(byte) => byte,
            None => return Ok(DivergencePoint::Equal),
        };
        let right = match b.next_byte()? {
            Some(byte) => byte,
            None => return Ok(DivergencePoint::Equal),
        };
        if left != right {
            return Ok(DivergencePoint::At(offset));
        }
        offset += 1;
    }
}

/// Length check followed by the byte scan.
pub fn compare_bodies(proxied: &[u8], direct: &[u8]) -> HarnessResult<()> {
    check_length(proxied, direct)?;
    check_bytes(proxied, direct)?.into_result()
}

#[cfg(test)]
#[path = "equality_tests.rs"]
mod equality_tests;
