//! Error types for the RESP decoder.
//!
//! Two categories exist, matching the wire-level distinction in the RESP
//! protocol itself: a [`DecodeError::Protocol`] means the byte stream is no
//! longer a valid RESP stream and the connection must be torn down, while a
//! server-reported `-ERR ...` reply is never an `Err` here at all — it comes
//! back as an ordinary [`crate::protocol::types::RespValue::Error`] value.

use thiserror::Error;

/// Errors produced by [`crate::RespDecoder`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// The byte stream violates RESP framing: an unknown type tag, a
    /// non-numeric length, a missing trailing CRLF, a numeric token that
    /// does not parse, or nesting past the configured depth limit.
    ///
    /// Once raised, the decoder latches this error and re-raises it from
    /// every subsequent [`crate::RespDecoder::parse_one`] call.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A scalar's bytes could not be decoded under the configured
    /// `encoding`/`encoding_errors` policy. Framing is still intact — the
    /// decoder knows exactly where this frame ends — so this does not latch
    /// a sticky error; the next `parse_one` call proceeds normally.
    #[error("invalid text under configured encoding: {0}")]
    InvalidText(String),

    /// Misuse of the decoder's configuration surface: an unsupported
    /// encoding name at construction time, or an attempt to switch encoding
    /// while an aggregate parse is suspended mid-flight.
    #[error("decoder configuration error: {0}")]
    Config(String),
}

impl DecodeError {
    /// The default `protocol_error_ctor` referenced by §6 of the
    /// specification: wraps a message into [`DecodeError::Protocol`].
    pub fn protocol(message: impl Into<String>) -> Self {
        DecodeError::Protocol(message.into())
    }
}
