//! # resp-sansio - An Incremental RESP2/RESP3 Decoder
//!
//! `resp-sansio` decodes the Redis wire protocol (RESP2 and RESP3) without
//! ever touching a socket. It is a "sans-I/O" decoder: the caller owns the
//! transport, and simply hands the decoder whatever bytes arrive, in
//! whatever chunk sizes the transport happens to deliver them.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          RespDecoder                            │
//! │                                                                  │
//! │   feed(&[u8]) ───> ┌────────┐                                   │
//! │                     │ Buffer │  append-only, O(1) prefix drop    │
//! │                     └───┬────┘                                   │
//! │                         │                                        │
//! │   parse_one() ───>  ┌───┴────┐     ┌──────────────┐              │
//! │                     │ Pending │<───>│ Frame stack   │             │
//! │                     │ (1 leaf)│     │ (aggregates)  │             │
//! │                     └───┬────┘     └──────┬────────┘             │
//! │                         │                  │                     │
//! │                         ▼                  ▼                     │
//! │                     RespValue  <──────  bubbled up on completion  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller drives two calls in a loop: [`RespDecoder::feed`] whenever
//! more bytes arrive, and [`RespDecoder::parse_one`] until it returns
//! `Ok(None)` (not enough data yet). Nothing about the decoder assumes a
//! particular I/O model — it is equally at home behind a blocking
//! `std::net::TcpStream`, a `tokio::net::TcpStream`, or a unit test feeding
//! bytes one at a time.
//!
//! ## Quick Start
//!
//! ```
//! use resp_sansio::RespDecoder;
//!
//! let mut decoder = RespDecoder::new();
//!
//! // Bytes can arrive split anywhere, including mid type tag.
//! decoder.feed(b"*2\r\n$3\r\nGET");
//! assert!(decoder.parse_one().unwrap().is_none());
//!
//! decoder.feed(b"\r\n$4\r\nname\r\n");
//! let value = decoder.parse_one().unwrap().unwrap();
//! let items = value.as_array().unwrap();
//! assert_eq!(items[0].as_str(), Some("GET"));
//! assert_eq!(items[1].as_str(), Some("name"));
//! ```
//!
//! ## Supported Types
//!
//! | RESP2 | RESP3 |
//! |---|---|
//! | simple string, error, integer, bulk string, array | + big number, double, boolean, null, verbatim string, map, set, push |
//!
//! `Push` (`>`) decodes as an ordinary array; RESP3 out-of-band push
//! messages are not given a distinct value variant (see [`protocol::types::RespValue`]).
//!
//! ## Module Overview
//!
//! - [`protocol`]: value types, the incremental decoder, and decode errors
//!
//! ## Design Highlights
//!
//! ### Resumable Without Coroutines
//!
//! Recursive-descent parsers typically suspend by pausing a call stack.
//! Rust has no stable stackful-coroutine primitive, so this decoder makes
//! the aggregate call stack an explicit `Vec` of frames instead: a suspend
//! just means "return from `parse_one`, the frame stack is still there next
//! time." No bytes are re-read or re-validated across a suspend.
//!
//! ### Zero-Copy Buffering
//!
//! Input is held in a `bytes::BytesMut` and consumed via `split_to` +
//! `freeze`, which is a pointer-and-refcount operation rather than a memory
//! copy. Decoded `Text::Bytes` values borrow directly from the fed input.
//!
//! ### Sticky Protocol Errors
//!
//! A framing violation (bad tag, bad length, missing CRLF, nesting too
//! deep) poisons the decoder: every subsequent `parse_one` call re-raises
//! the same error. A server-reported `-ERR ...` reply, by contrast, is
//! never an error at all — it comes back as an ordinary
//! [`protocol::types::RespValue::Error`] value, exactly as the wire
//! protocol intends.
//!
//! ### Configurable Encoding
//!
//! By default string-bearing scalars are delivered as raw `bytes::Bytes`.
//! Configuring an `encoding` via [`protocol::parser::DecoderOptions`] decodes
//! them to `String` instead, with `strict`/`replace`/`ignore` policies for
//! invalid byte sequences.

pub mod protocol;

pub use protocol::{
    DecodeError, DecoderOptions, Encoding, EncodingErrors, RespDecoder, RespValue, Text,
};

/// Version of `resp-sansio`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
