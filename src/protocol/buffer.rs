//! Append-only byte buffer with a read cursor.
//!
//! This is the only piece of decoder state that ever holds bytes. Appends
//! are O(1) amortized (`BytesMut::extend_from_slice`); once a full line or a
//! full length-prefixed payload has been read, the consumed prefix is
//! dropped via `BytesMut::split_to`, which is O(1) because `Bytes`/`BytesMut`
//! are reference-counted views over a shared allocation — no memmove of the
//! unconsumed tail.
//!
//! `pos` may advance ahead of any committed split (see [`Buffer::read_one_byte`])
//! to let a partially-read frame header survive a suspend/resume cycle
//! without re-reading the type tag.

use crate::protocol::types::CRLF;
use bytes::{Bytes, BytesMut};

#[derive(Debug, Default)]
pub struct Buffer {
    buf: BytesMut,
    pos: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
            pos: 0,
        }
    }

    /// Appends bytes arriving from the transport.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Bytes currently buffered but not yet consumed, from `pos` onward.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Reads one byte past `pos` and advances `pos` by one. Returns `None`
    /// without any side effect if no byte is available yet.
    pub fn read_one_byte(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Scans for the first CRLF at or after `pos`. On success, returns the
    /// bytes strictly between `pos` and the CRLF, drops the consumed prefix
    /// (everything up to and including the CRLF) from the buffer, and resets
    /// `pos` to 0. Returns `None` without consuming anything if no CRLF is
    /// buffered yet — the caller simply retries after more bytes arrive,
    /// re-scanning from `pos`, which is the explicitly-allowed simplification
    /// for this reader.
    pub fn read_line_until_crlf(&mut self) -> Option<Bytes> {
        let haystack = &self.buf[self.pos..];
        let rel = memchr::memmem::find(haystack, CRLF)?;
        let crlf_at = self.pos + rel;
        let consumed_through = crlf_at + CRLF.len();
        let line_start = self.pos;
        let frozen = self.buf.split_to(consumed_through).freeze();
        self.pos = 0;
        tracing::trace!(consumed = consumed_through, "compacted buffer after line read");
        Some(frozen.slice(line_start..crlf_at))
    }

    /// Ensures `n + 2` bytes are available at `pos`, verifies the trailing
    /// CRLF, and returns the `n` bytes in between. `Ok(None)` means more
    /// data is needed; `Err` means the trailing CRLF was missing once `n`
    /// bytes *were* available (a genuine protocol violation, not a
    /// suspension).
    pub fn read_exact_then_crlf(&mut self, n: usize) -> Result<Option<Bytes>, ()> {
        let needed = self.pos + n + CRLF.len();
        if self.buf.len() < needed {
            return Ok(None);
        }
        if &self.buf[self.pos + n..needed] != CRLF {
            return Err(());
        }
        let data_start = self.pos;
        let frozen = self.buf.split_to(needed).freeze();
        self.pos = 0;
        tracing::trace!(consumed = needed, "compacted buffer after payload read");
        Ok(Some(frozen.slice(data_start..data_start + n)))
    }
}
