//! Bounded and safe I/O utilities for untrusted attachment content.
//!
//! This module provides a `BoundedReader` that enforces a hard ceiling on
//! the number of bytes pulled from an untrusted stream, a text decoding
//! helper built on top of it, and the `sandbox` path resolver used when
//! writing files whose names come from report attachments.

pub mod error;
pub mod sandbox;

use crate::io::error::{IoError, Result};
use std::io::{self, Cursor, Read};
use tracing::{debug, trace, warn};

/// Default ceiling for decoding a single attachment (8MB).
pub const DEFAULT_READ_LIMIT: u64 = 8 * 1024 * 1024;

/// Reports how many bytes can be read without blocking.
pub trait Available {
    fn available(&self) -> u64;
}

impl<T: AsRef<[u8]>> Available for Cursor<T> {
    fn available(&self) -> u64 {
        let len = self.get_ref().as_ref().len() as u64;
        len.saturating_sub(self.position())
    }
}

impl Available for &[u8] {
    fn available(&self) -> u64 {
        self.len() as u64
    }
}

/// A reader that fails once more than `limit` bytes would be delivered.
///
/// Reads are clamped to the remaining budget. When the budget is spent the
/// next read either reports end-of-stream (the source ended exactly at the
/// limit) or fails with `IoError::ReadLimitExceeded`. The failure is sticky.
/// The wrapped source is owned and therefore closed exactly once on drop.
pub struct BoundedReader<R> {
    inner: R,
    bytes_read: u64,
    limit: u64,
    exceeded: bool,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(reader: R, limit: u64) -> Self {
        Self {
            inner: reader,
            bytes_read: 0,
            limit,
            exceeded: false,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.bytes_read)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn limit_error(&mut self) -> io::Error {
        self.exceeded = true;
        warn!(
            limit = self.limit,
            bytes_read = self.bytes_read,
            "BoundedReader limit exceeded"
        );
        IoError::ReadLimitExceeded { limit: self.limit }.into_io()
    }
}

impl<R: Available> Available for BoundedReader<R> {
    fn available(&self) -> u64 {
        std::cmp::min(
            self.inner.available(),
            self.limit.saturating_sub(self.bytes_read),
        )
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exceeded {
            return Err(IoError::ReadLimitExceeded { limit: self.limit }.into_io());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let remaining = self.remaining();
        if remaining == 0 {
            // Probe a single byte to tell a source that ends exactly at the
            // limit apart from one that keeps going.
            let mut probe = [0u8; 1];
            return match self.inner.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(self.limit_error()),
            };
        }

        let max_to_read = std::cmp::min(buf.len() as u64, remaining) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.bytes_read += n as u64;

        trace!(
            len = n,
            total_read = self.bytes_read,
            limit = self.limit,
            "BoundedReader read"
        );

        Ok(n)
    }
}

/// Reads at most `limit` bytes from `reader` and decodes them as text.
///
/// The encoding is sniffed from a byte-order mark (UTF-8 otherwise) and
/// malformed sequences are replaced. Content containing NUL bytes after
/// decoding is rejected as binary. The reader is consumed and dropped on
/// every path, including when the limit is exceeded.
pub fn read_text<R: Read>(reader: R, limit: u64) -> Result<String> {
    let mut bounded = BoundedReader::new(reader, limit);
    let mut data = Vec::new();
    bounded.read_to_end(&mut data)?;
    decode_text(&data)
}

/// Decodes a byte buffer as text, see [`read_text`].
pub fn decode_text(data: &[u8]) -> Result<String> {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(data);
    if had_errors {
        debug!(
            encoding = encoding.name(),
            len = data.len(),
            "Replaced malformed sequences while decoding"
        );
    }
    if memchr::memchr(0, text.as_bytes()).is_some() {
        return Err(IoError::Decode {
            encoding: encoding.name(),
        });
    }
    Ok(text.into_owned())
}
