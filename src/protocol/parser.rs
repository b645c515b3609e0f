//! Resumable RESP2/RESP3 decoder.
//!
//! ## Design Philosophy
//!
//! 1. **Sans-I/O**: the decoder never reads from or writes to a socket. The
//!    owner calls [`RespDecoder::feed`] with whatever bytes it just read,
//!    then [`RespDecoder::parse_one`] as many times as that returns a value.
//! 2. **Resumable**: a parse can suspend at any byte boundary — mid type
//!    tag, mid length, mid payload — and continue later without re-reading
//!    already-consumed bytes or re-validating already-checked framing.
//! 3. **No stackful coroutines**: Rust has no stable generator/coroutine
//!    primitive, so aggregate nesting (array of array of map of …) is
//!    tracked with an explicit stack of [`Frame`]s rather than a suspended
//!    call chain. Each individual scalar read stays a single function call;
//!    only the *aggregate* bookkeeping needs to survive a `parse_one` return.
//!
//! ## How the decoder resumes
//!
//! Every call to `parse_one` either completes a value, or returns `Ok(None)`
//! leaving two pieces of state intact for the next call:
//!
//! - [`Pending`] remembers the type tag (and, for length-prefixed scalars,
//!   the already-parsed length) of whatever leaf value is mid-read.
//! - `stack` remembers every aggregate that is still waiting on children.
//!
//! Nothing else needs to survive a suspend: low-level reads never commit a
//! partial line or payload, so re-entering them after more bytes arrive is
//! just re-running the same check against a longer buffer.

use crate::protocol::buffer::Buffer;
use crate::protocol::error::DecodeError;
use crate::protocol::types::{prefix, RespValue, Text};
use bytes::Bytes;
use std::fmt;

/// Maximum aggregate nesting depth, carried over from the teacher crate's
/// own array parser guard. Protects the explicit parse stack from unbounded
/// growth on adversarial input; it is an engineering safeguard, not a wire
/// feature, and never rejects well-formed replies below this depth.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Upper bound on how eagerly a declared aggregate length preallocates its
/// backing `Vec`, since that count arrives from the wire before any of its
/// elements do.
const MAX_PREALLOC: usize = 4096;

/// Text encodings this decoder can produce. RESP has no universally agreed
/// multi-codec registry the way Python's `codecs` module does, so only the
/// wire's native text encoding is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
}

fn parse_encoding_name(name: &str) -> Result<Encoding, DecodeError> {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(Encoding::Utf8),
        other => Err(DecodeError::Config(format!(
            "unsupported encoding {other:?}; only utf-8 is supported"
        ))),
    }
}

/// Policy applied when a byte sequence cannot be decoded under the
/// configured `encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingErrors {
    Strict,
    Replace,
    Ignore,
}

impl Default for EncodingErrors {
    fn default() -> Self {
        EncodingErrors::Strict
    }
}

/// Configuration for a [`RespDecoder`], built fluently and handed to
/// [`RespDecoder::with_options`].
pub struct DecoderOptions {
    encoding: Option<Encoding>,
    encoding_errors: EncodingErrors,
    protocol_error_ctor: Box<dyn Fn(String) -> DecodeError + Send + Sync>,
    reply_error_ctor: Box<dyn Fn(String) -> RespValue + Send + Sync>,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            encoding_errors: EncodingErrors::default(),
            protocol_error_ctor: Box::new(DecodeError::protocol),
            reply_error_ctor: Box::new(RespValue::error),
        }
    }
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode string-bearing scalars (simple string, bulk string, verbatim
    /// string) as text under `name`. Only `"utf-8"` (any ASCII case) is
    /// recognized; anything else is a configuration error.
    pub fn with_encoding(mut self, name: &str) -> Result<Self, DecodeError> {
        self.encoding = Some(parse_encoding_name(name)?);
        Ok(self)
    }

    pub fn with_encoding_errors(mut self, policy: EncodingErrors) -> Self {
        self.encoding_errors = policy;
        self
    }

    /// Overrides the factory used to build the value stored in
    /// `sticky_error` and returned by `parse_one` on a wire violation.
    pub fn with_protocol_error_ctor(
        mut self,
        ctor: impl Fn(String) -> DecodeError + Send + Sync + 'static,
    ) -> Self {
        self.protocol_error_ctor = Box::new(ctor);
        self
    }

    /// Overrides the factory used to turn a `-ERR ...` line into the value
    /// returned from `parse_one` (never raised).
    pub fn with_reply_error_ctor(
        mut self,
        ctor: impl Fn(String) -> RespValue + Send + Sync + 'static,
    ) -> Self {
        self.reply_error_ctor = Box::new(ctor);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeqKind {
    Array,
    Set,
}

/// A suspended aggregate awaiting more children.
#[derive(Debug)]
enum Frame {
    Seq {
        kind: SeqKind,
        remaining: usize,
        items: Vec<RespValue>,
    },
    Map {
        remaining: usize,
        pairs: Vec<(RespValue, RespValue)>,
        pending_key: Option<RespValue>,
    },
}

impl Frame {
    /// Feeds a just-completed child value into this frame. Returns `true`
    /// once the frame has all the children it declared.
    fn accept(&mut self, value: RespValue) -> bool {
        match self {
            Frame::Seq { kind: SeqKind::Set, remaining, items } => {
                RespValue::set_insert(items, value);
                *remaining -= 1;
                *remaining == 0
            }
            Frame::Seq { kind: SeqKind::Array, remaining, items } => {
                items.push(value);
                *remaining -= 1;
                *remaining == 0
            }
            Frame::Map {
                remaining,
                pairs,
                pending_key,
            } => match pending_key.take() {
                None => {
                    *pending_key = Some(value);
                    false
                }
                Some(key) => {
                    RespValue::map_insert(pairs, key, value);
                    *remaining -= 1;
                    *remaining == 0
                }
            },
        }
    }

    fn into_value(self) -> RespValue {
        match self {
            Frame::Seq { kind: SeqKind::Array, items, .. } => RespValue::Array(items),
            Frame::Seq { kind: SeqKind::Set, items, .. } => RespValue::Set(items),
            Frame::Map { pairs, .. } => RespValue::Map(pairs),
        }
    }
}

/// What's mid-read for the single leaf value currently in flight. Only one
/// of these is ever active regardless of aggregate depth, since a parent
/// frame never resumes reading until its current child has fully resolved.
#[derive(Debug, Clone, Copy)]
enum Pending {
    /// No leaf value is in progress; the next byte read is a fresh type tag.
    None,
    /// The type tag has been read; its line/header has not.
    Tag(u8),
    /// A length-prefixed scalar's length has been committed; waiting on
    /// `length` payload bytes plus trailing CRLF.
    Length { tag: u8, length: i64 },
}

enum StepOutcome {
    Suspended,
    /// An aggregate header was read and a frame pushed; the stack driver
    /// should immediately attempt the first child rather than returning.
    Continue,
    Value(RespValue),
}

enum Resolved {
    Done(RespValue),
    Continue,
}

/// An incremental, transport-agnostic RESP2/RESP3 decoder.
///
/// # Example
///
/// ```
/// use resp_sansio::RespDecoder;
///
/// let mut decoder = RespDecoder::new();
/// decoder.feed(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n");
/// let value = decoder.parse_one().unwrap().unwrap();
/// assert!(value.as_array().is_some());
/// ```
pub struct RespDecoder {
    buf: Buffer,
    pending: Pending,
    stack: Vec<Frame>,
    sticky_error: Option<DecodeError>,
    encoding: Option<Encoding>,
    encoding_errors: EncodingErrors,
    protocol_error_ctor: Box<dyn Fn(String) -> DecodeError + Send + Sync>,
    reply_error_ctor: Box<dyn Fn(String) -> RespValue + Send + Sync>,
}

impl fmt::Debug for RespDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RespDecoder")
            .field("pending", &self.pending)
            .field("stack_depth", &self.stack.len())
            .field("sticky_error", &self.sticky_error)
            .field("encoding", &self.encoding)
            .field("encoding_errors", &self.encoding_errors)
            .finish_non_exhaustive()
    }
}

impl Default for RespDecoder {
    fn default() -> Self {
        Self::with_options(DecoderOptions::default())
    }
}

impl RespDecoder {
    /// Creates a decoder with default options: no text decoding (scalars
    /// deliver raw bytes), strict encoding errors, and the built-in error
    /// constructors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a [`DecoderOptions`] to pass to [`Self::with_options`].
    pub fn builder() -> DecoderOptions {
        DecoderOptions::new()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            buf: Buffer::new(),
            pending: Pending::None,
            stack: Vec::new(),
            sticky_error: None,
            encoding: options.encoding,
            encoding_errors: options.encoding_errors,
            protocol_error_ctor: options.protocol_error_ctor,
            reply_error_ctor: options.reply_error_ctor,
        }
    }

    /// Appends bytes arriving from the transport.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.feed(bytes);
    }

    /// Switches the configured encoding. Refused while a parse is suspended
    /// mid-aggregate or mid-scalar, since reinterpreting an already-declared
    /// frame's still-to-come children under a new encoding would violate
    /// "no effect on a frame already in progress".
    pub fn set_encoding(&mut self, name: &str) -> Result<(), DecodeError> {
        if !matches!(self.pending, Pending::None) || !self.stack.is_empty() {
            return Err(DecodeError::Config(
                "cannot change encoding while a parse is in progress".to_string(),
            ));
        }
        self.encoding = Some(parse_encoding_name(name)?);
        Ok(())
    }

    /// Advances the parse by whatever is currently buffered.
    ///
    /// Returns `Ok(Some(value))` on a completed reply, `Ok(None)` if more
    /// bytes are needed, or `Err(_)` on a protocol violation. Once an `Err`
    /// is returned for a framing violation, every subsequent call returns
    /// the same error without consuming anything further.
    pub fn parse_one(&mut self) -> Result<Option<RespValue>, DecodeError> {
        if let Some(err) = &self.sticky_error {
            return Err(err.clone());
        }
        loop {
            let outcome = match self.next_value() {
                Ok(outcome) => outcome,
                Err(err) => {
                    if matches!(err, DecodeError::InvalidText(_)) {
                        // Not a framing violation: the stream position is
                        // still sound, but whatever frame (possibly a
                        // nested child) was mid-read is not. Abandon it
                        // rather than let a stale `Pending`/frame stack
                        // resynchronize onto unrelated bytes, mirroring
                        // the reference parser discarding its generator
                        // on a decode error.
                        self.pending = Pending::None;
                        self.stack.clear();
                    } else {
                        tracing::warn!(error = %err, "resp decoder poisoned by protocol violation");
                        self.sticky_error = Some(err.clone());
                    }
                    return Err(err);
                }
            };
            match outcome {
                StepOutcome::Suspended => return Ok(None),
                StepOutcome::Continue => continue,
                StepOutcome::Value(value) => match self.resolve(value) {
                    Resolved::Done(value) => return Ok(Some(value)),
                    Resolved::Continue => continue,
                },
            }
        }
    }

    /// Merges a just-completed value into the top of the aggregate stack,
    /// bubbling completed aggregates up as far as they go.
    fn resolve(&mut self, mut value: RespValue) -> Resolved {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                return Resolved::Done(value);
            };
            if !frame.accept(value) {
                return Resolved::Continue;
            }
            let frame = self.stack.pop().expect("frame observed above");
            value = frame.into_value();
        }
    }

    /// Parses exactly one step forward: a scalar, a pushed aggregate frame,
    /// or "not enough data".
    fn next_value(&mut self) -> Result<StepOutcome, DecodeError> {
        if matches!(self.pending, Pending::None) {
            let tag = match self.buf.read_one_byte() {
                Some(byte) => byte,
                None => return Ok(StepOutcome::Suspended),
            };
            self.pending = Pending::Tag(tag);
        }
        match self.pending {
            Pending::None => unreachable!("just ensured pending is set"),
            Pending::Tag(tag) => self.dispatch_tag(tag),
            Pending::Length { tag, length } => self.dispatch_payload(tag, length),
        }
    }

    fn dispatch_tag(&mut self, tag: u8) -> Result<StepOutcome, DecodeError> {
        match tag {
            prefix::SIMPLE_STRING => self.read_scalar_line(RespValue::SimpleString),
            prefix::ERROR => self.read_error_line(),
            prefix::INTEGER => self.read_integer_line(false),
            prefix::BIG_NUMBER => self.read_integer_line(true),
            prefix::DOUBLE => self.read_double_line(),
            prefix::BOOLEAN => self.read_boolean_line(),
            prefix::NULL => self.read_null_line(),
            prefix::BULK_STRING | prefix::VERBATIM_STRING => self.begin_length_prefixed(tag),
            prefix::ARRAY | prefix::PUSH => self.begin_sequence(SeqKind::Array),
            prefix::SET => self.begin_sequence(SeqKind::Set),
            prefix::MAP => self.begin_map(),
            b'|' => Err(self.protocol_error("RESP3 attribute frames are not supported")),
            other => {
                let rendered = String::from_utf8_lossy(&[other]).into_owned();
                Err(self.protocol_error(format!(
                    "unknown type prefix {other:#04x} ({rendered:?})"
                )))
            }
        }
    }

    fn read_scalar_line(&mut self, ctor: fn(Text) -> RespValue) -> Result<StepOutcome, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(StepOutcome::Suspended),
            Some(line) => {
                self.pending = Pending::None;
                Ok(StepOutcome::Value(ctor(self.decode_bytes(line)?)))
            }
        }
    }

    fn read_error_line(&mut self) -> Result<StepOutcome, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(StepOutcome::Suspended),
            Some(line) => {
                self.pending = Pending::None;
                // Server error text is always decoded leniently, independent
                // of the configured `encoding_errors` policy, matching the
                // reference parser's handling of `-ERR ...` lines.
                let message = String::from_utf8_lossy(&line).into_owned();
                Ok(StepOutcome::Value((self.reply_error_ctor)(message)))
            }
        }
    }

    fn read_integer_line(&mut self, big: bool) -> Result<StepOutcome, DecodeError> {
        match self.read_int()? {
            None => Ok(StepOutcome::Suspended),
            Some(n) => {
                self.pending = Pending::None;
                Ok(StepOutcome::Value(if big {
                    RespValue::BigNumber(n)
                } else {
                    RespValue::Integer(n)
                }))
            }
        }
    }

    fn read_double_line(&mut self) -> Result<StepOutcome, DecodeError> {
        match self.read_float()? {
            None => Ok(StepOutcome::Suspended),
            Some(d) => {
                self.pending = Pending::None;
                Ok(StepOutcome::Value(RespValue::Double(d)))
            }
        }
    }

    fn read_boolean_line(&mut self) -> Result<StepOutcome, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(StepOutcome::Suspended),
            Some(line) => {
                self.pending = Pending::None;
                // Permissive per the reference parser: anything other than
                // `t` is false, `f` is not specially validated.
                Ok(StepOutcome::Value(RespValue::Boolean(line.as_ref() == b"t")))
            }
        }
    }

    fn read_null_line(&mut self) -> Result<StepOutcome, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(StepOutcome::Suspended),
            Some(_) => {
                self.pending = Pending::None;
                Ok(StepOutcome::Value(RespValue::Null))
            }
        }
    }

    fn begin_length_prefixed(&mut self, tag: u8) -> Result<StepOutcome, DecodeError> {
        let length = match self.read_length()? {
            None => return Ok(StepOutcome::Suspended),
            Some(length) => length,
        };
        if length == -1 {
            self.pending = Pending::None;
            return Ok(StepOutcome::Value(RespValue::Null));
        }
        if length < 0 {
            return Err(self.protocol_error(format!("invalid bulk string length: {length}")));
        }
        self.pending = Pending::Length { tag, length };
        self.dispatch_payload(tag, length)
    }

    fn dispatch_payload(&mut self, tag: u8, length: i64) -> Result<StepOutcome, DecodeError> {
        let raw = match self.buf.read_exact_then_crlf(length as usize) {
            Ok(None) => return Ok(StepOutcome::Suspended),
            Ok(Some(data)) => data,
            Err(()) => {
                return Err(self.protocol_error("missing trailing CRLF after declared payload"))
            }
        };
        self.pending = Pending::None;
        if tag == prefix::VERBATIM_STRING {
            let colon = memchr::memchr(b':', &raw)
                .ok_or_else(|| self.protocol_error("verbatim string missing format separator"))?;
            let payload = raw.slice(colon + 1..);
            Ok(StepOutcome::Value(RespValue::Verbatim(self.decode_bytes(payload)?)))
        } else {
            Ok(StepOutcome::Value(RespValue::BulkString(self.decode_bytes(raw)?)))
        }
    }

    fn begin_sequence(&mut self, kind: SeqKind) -> Result<StepOutcome, DecodeError> {
        let count = match self.read_length()? {
            None => return Ok(StepOutcome::Suspended),
            Some(count) => count,
        };
        if count == -1 {
            self.pending = Pending::None;
            return Ok(StepOutcome::Value(RespValue::Null));
        }
        if count < 0 {
            return Err(self.protocol_error(format!("invalid array length: {count}")));
        }
        self.pending = Pending::None;
        let count = count as usize;
        if count == 0 {
            return Ok(StepOutcome::Value(match kind {
                SeqKind::Array => RespValue::Array(Vec::new()),
                SeqKind::Set => RespValue::Set(Vec::new()),
            }));
        }
        self.push_frame(Frame::Seq {
            kind,
            remaining: count,
            items: Vec::with_capacity(count.min(MAX_PREALLOC)),
        })
    }

    fn begin_map(&mut self) -> Result<StepOutcome, DecodeError> {
        let count = match self.read_length()? {
            None => return Ok(StepOutcome::Suspended),
            Some(count) => count,
        };
        if count == -1 {
            self.pending = Pending::None;
            return Ok(StepOutcome::Value(RespValue::Null));
        }
        if count < 0 {
            return Err(self.protocol_error(format!("invalid map length: {count}")));
        }
        self.pending = Pending::None;
        let count = count as usize;
        if count == 0 {
            return Ok(StepOutcome::Value(RespValue::Map(Vec::new())));
        }
        self.push_frame(Frame::Map {
            remaining: count,
            pairs: Vec::with_capacity(count.min(MAX_PREALLOC)),
            pending_key: None,
        })
    }

    fn push_frame(&mut self, frame: Frame) -> Result<StepOutcome, DecodeError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(self.protocol_error(format!(
                "maximum nesting depth exceeded: {MAX_NESTING_DEPTH}"
            )));
        }
        self.stack.push(frame);
        Ok(StepOutcome::Continue)
    }

    /// Reads a length/count prefix line. Distinguishes the RESP3 streamed
    /// length marker (`?`) from an ordinary malformed numeric so a caller
    /// can tell "the server turned on a feature we don't support" from a
    /// genuine wire bug.
    fn read_length(&mut self) -> Result<Option<i64>, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(None),
            Some(line) if line.as_ref() == b"?" => Err(self.protocol_error(
                "RESP3 streamed strings/aggregates (length marker '?') are not supported",
            )),
            Some(line) => {
                let text = std::str::from_utf8(&line)
                    .map_err(|e| self.protocol_error(format!("invalid length: {e}")))?;
                text.parse::<i64>()
                    .map(Some)
                    .map_err(|e| self.protocol_error(format!("invalid length {text:?}: {e}")))
            }
        }
    }

    /// `read_int`: reads a line and parses it as a signed 64-bit integer.
    fn read_int(&mut self) -> Result<Option<i64>, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(None),
            Some(line) => {
                let text = std::str::from_utf8(&line)
                    .map_err(|e| self.protocol_error(format!("invalid integer: {e}")))?;
                text.parse::<i64>()
                    .map(Some)
                    .map_err(|e| self.protocol_error(format!("invalid integer {text:?}: {e}")))
            }
        }
    }

    /// `read_float`: reads a line and parses it as an IEEE-754 double,
    /// accepting `inf`/`-inf`/`nan` as Rust's `f64::from_str` already does.
    fn read_float(&mut self) -> Result<Option<f64>, DecodeError> {
        match self.buf.read_line_until_crlf() {
            None => Ok(None),
            Some(line) => {
                let text = std::str::from_utf8(&line)
                    .map_err(|e| self.protocol_error(format!("invalid double: {e}")))?;
                text.parse::<f64>()
                    .map(Some)
                    .map_err(|e| self.protocol_error(format!("invalid double {text:?}: {e}")))
            }
        }
    }

    fn decode_bytes(&self, bytes: Bytes) -> Result<Text, DecodeError> {
        match self.encoding {
            None => Ok(Text::Bytes(bytes)),
            Some(Encoding::Utf8) => match self.encoding_errors {
                EncodingErrors::Strict => std::str::from_utf8(&bytes)
                    .map(|s| Text::Str(s.to_string()))
                    .map_err(|e| DecodeError::InvalidText(e.to_string())),
                EncodingErrors::Replace => {
                    Ok(Text::Str(String::from_utf8_lossy(&bytes).into_owned()))
                }
                EncodingErrors::Ignore => Ok(Text::Str(decode_utf8_ignoring_invalid(&bytes))),
            },
        }
    }

    fn protocol_error(&self, message: impl Into<String>) -> DecodeError {
        (self.protocol_error_ctor)(message.into())
    }
}

/// Decodes as much of `bytes` as is valid UTF-8, silently dropping any
/// invalid sequences rather than substituting a replacement character.
fn decode_utf8_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::new();
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(err) => {
                let valid_up_to = err.valid_up_to();
                out.push_str(std::str::from_utf8(&bytes[..valid_up_to]).expect("already validated"));
                let skip = err.error_len().unwrap_or(bytes.len() - valid_up_to);
                bytes = &bytes[valid_up_to + skip..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(input: &[u8]) -> RespValue {
        let mut decoder = RespDecoder::new();
        decoder.feed(input);
        decoder.parse_one().unwrap().unwrap()
    }

    #[test]
    fn simple_string_raw_bytes_by_default() {
        assert_eq!(
            decode_all(b"+OK\r\n"),
            RespValue::SimpleString(Text::Bytes(Bytes::from_static(b"OK")))
        );
    }

    #[test]
    fn error_is_returned_not_raised() {
        let value = decode_all(b"-ERR unknown command\r\n");
        assert!(value.is_error());
        assert_eq!(value.as_str(), Some("ERR unknown command"));
    }

    #[test]
    fn integer() {
        assert_eq!(decode_all(b":1000\r\n"), RespValue::Integer(1000));
        assert_eq!(decode_all(b":-42\r\n"), RespValue::Integer(-42));
    }

    #[test]
    fn big_number_parses_as_i64() {
        assert_eq!(decode_all(b"(1234567890\r\n"), RespValue::BigNumber(1234567890));
    }

    #[test]
    fn big_number_overflowing_i64_is_a_protocol_error() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"(3492890328409238509324850943850943825024385\r\n");
        assert!(decoder.parse_one().is_err());
    }

    #[test]
    fn double() {
        assert_eq!(decode_all(b",3.14\r\n"), RespValue::Double(3.14));
        assert_eq!(decode_all(b",inf\r\n"), RespValue::Double(f64::INFINITY));
    }

    #[test]
    fn boolean_is_permissive() {
        assert_eq!(decode_all(b"#t\r\n"), RespValue::Boolean(true));
        assert_eq!(decode_all(b"#f\r\n"), RespValue::Boolean(false));
        assert_eq!(decode_all(b"#x\r\n"), RespValue::Boolean(false));
    }

    #[test]
    fn null_variants() {
        assert!(decode_all(b"_\r\n").is_null());
        assert!(decode_all(b"$-1\r\n").is_null());
        assert!(decode_all(b"*-1\r\n").is_null());
    }

    #[test]
    fn bulk_string() {
        assert_eq!(
            decode_all(b"$5\r\nhello\r\n"),
            RespValue::BulkString(Text::Bytes(Bytes::from_static(b"hello")))
        );
    }

    #[test]
    fn empty_bulk_string() {
        assert_eq!(
            decode_all(b"$0\r\n\r\n"),
            RespValue::BulkString(Text::Bytes(Bytes::new()))
        );
    }

    #[test]
    fn verbatim_string_drops_format_prefix() {
        assert_eq!(
            decode_all(b"=15\r\ntxt:Some string\r\n"),
            RespValue::Verbatim(Text::Bytes(Bytes::from_static(b"Some string")))
        );
    }

    #[test]
    fn array_of_scalars() {
        let value = decode_all(b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n");
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("GET"));
        assert_eq!(items[1].as_str(), Some("name"));
    }

    #[test]
    fn empty_array() {
        assert_eq!(decode_all(b"*0\r\n"), RespValue::Array(Vec::new()));
    }

    #[test]
    fn nested_arrays() {
        let value = decode_all(b"*2\r\n*1\r\n:1\r\n*1\r\n:2\r\n");
        let outer = value.as_array().unwrap();
        assert_eq!(outer[0].as_array().unwrap()[0], RespValue::Integer(1));
        assert_eq!(outer[1].as_array().unwrap()[0], RespValue::Integer(2));
    }

    #[test]
    fn set_is_decoded_as_a_value() {
        let value = decode_all(b"~2\r\n:1\r\n:2\r\n");
        assert!(matches!(value, RespValue::Set(_)));
    }

    #[test]
    fn set_last_write_wins_on_duplicate_elements() {
        let value = decode_all(b"~3\r\n:1\r\n:2\r\n:1\r\n");
        match value {
            RespValue::Set(items) => {
                assert_eq!(items, vec![RespValue::Integer(1), RespValue::Integer(2)])
            }
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn map_last_write_wins() {
        let value = decode_all(b"%2\r\n:1\r\n+a\r\n:1\r\n+b\r\n");
        match value {
            RespValue::Map(pairs) => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].1.as_str(), Some("b"));
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn push_type_decodes_as_array() {
        let value = decode_all(b">1\r\n+message\r\n");
        assert!(value.as_array().is_some());
    }

    #[test]
    fn streamed_length_marker_is_reported_as_unsupported() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"$?\r\n");
        let err = decoder.parse_one().unwrap_err();
        assert!(err.to_string().contains("streamed"));
    }

    #[test]
    fn attribute_frame_is_reported_as_unsupported() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"|1\r\n+key\r\n+value\r\n");
        let err = decoder.parse_one().unwrap_err();
        assert!(err.to_string().contains("attribute"));
    }

    #[test]
    fn unknown_tag_is_a_protocol_error() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"!oops\r\n");
        assert!(decoder.parse_one().is_err());
    }

    #[test]
    fn protocol_error_is_sticky() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"!oops\r\n");
        assert!(decoder.parse_one().is_err());
        decoder.feed(b"+OK\r\n");
        assert!(decoder.parse_one().is_err());
    }

    #[test]
    fn chunk_independent_across_every_boundary() {
        let whole = b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n";
        for split_at in 0..whole.len() {
            let mut decoder = RespDecoder::new();
            decoder.feed(&whole[..split_at]);
            assert!(decoder.parse_one().unwrap().is_none());
            decoder.feed(&whole[split_at..]);
            let value = decoder.parse_one().unwrap().unwrap();
            let items = value.as_array().unwrap();
            assert_eq!(items[0].as_str(), Some("GET"));
            assert_eq!(items[1].as_str(), Some("name"));
        }
    }

    #[test]
    fn tag_byte_survives_suspension() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"$");
        assert!(decoder.parse_one().unwrap().is_none());
        decoder.feed(b"5\r\nhel");
        assert!(decoder.parse_one().unwrap().is_none());
        decoder.feed(b"lo\r\n");
        assert_eq!(
            decoder.parse_one().unwrap().unwrap(),
            RespValue::BulkString(Text::Bytes(Bytes::from_static(b"hello")))
        );
    }

    #[test]
    fn missing_crlf_after_payload_is_a_protocol_error() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"$5\r\nhelloXX");
        assert!(decoder.parse_one().is_err());
    }

    #[test]
    fn decodes_as_text_when_encoding_configured() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new().with_encoding("utf-8").unwrap(),
        );
        decoder.feed(b"$5\r\nhello\r\n");
        match decoder.parse_one().unwrap().unwrap() {
            RespValue::BulkString(Text::Str(s)) => assert_eq!(s, "hello"),
            other => panic!("expected decoded text, got {other:?}"),
        }
    }

    #[test]
    fn invalid_encoding_name_is_a_config_error() {
        assert!(DecoderOptions::new().with_encoding("latin-1").is_err());
    }

    #[test]
    fn strict_invalid_utf8_is_not_sticky() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new().with_encoding("utf-8").unwrap(),
        );
        decoder.feed(b"$3\r\n\xff\xfe\xfd\r\n");
        assert!(decoder.parse_one().is_err());
        decoder.feed(b"+OK\r\n");
        assert_eq!(
            decoder.parse_one().unwrap().unwrap(),
            RespValue::SimpleString(Text::Str("OK".to_string()))
        );
    }

    #[test]
    fn invalid_utf8_mid_aggregate_abandons_the_frame_instead_of_corrupting_it() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new().with_encoding("utf-8").unwrap(),
        );
        // An array whose first element is invalid UTF-8; a naive implementation
        // that leaves the in-progress `Seq` frame on the stack would swallow
        // the following `:5` as that array's second element instead of
        // returning it as its own top-level value.
        decoder.feed(b"*2\r\n$1\r\n\xff\r\n:5\r\n");
        assert!(decoder.parse_one().is_err());
        assert_eq!(decoder.parse_one().unwrap().unwrap(), RespValue::Integer(5));
    }

    #[test]
    fn replace_policy_substitutes_invalid_sequences() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new()
                .with_encoding("utf-8")
                .unwrap()
                .with_encoding_errors(EncodingErrors::Replace),
        );
        decoder.feed(b"$3\r\n\xff\xfe\xfd\r\n");
        match decoder.parse_one().unwrap().unwrap() {
            RespValue::BulkString(Text::Str(s)) => assert!(s.contains('\u{FFFD}')),
            other => panic!("expected decoded text, got {other:?}"),
        }
    }

    #[test]
    fn ignore_policy_drops_invalid_sequences() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new()
                .with_encoding("utf-8")
                .unwrap()
                .with_encoding_errors(EncodingErrors::Ignore),
        );
        decoder.feed(b"$5\r\na\xffb\xfec\r\n");
        match decoder.parse_one().unwrap().unwrap() {
            RespValue::BulkString(Text::Str(s)) => assert_eq!(s, "abc"),
            other => panic!("expected decoded text, got {other:?}"),
        }
    }

    #[test]
    fn set_encoding_rejected_mid_aggregate() {
        let mut decoder = RespDecoder::new();
        decoder.feed(b"*2\r\n:1\r\n");
        assert!(decoder.parse_one().unwrap().is_none());
        assert!(decoder.set_encoding("utf-8").is_err());
    }

    #[test]
    fn nesting_beyond_limit_is_a_protocol_error() {
        let mut decoder = RespDecoder::new();
        let mut input = Vec::new();
        for _ in 0..=MAX_NESTING_DEPTH {
            input.extend_from_slice(b"*1\r\n");
        }
        input.extend_from_slice(b":1\r\n");
        decoder.feed(&input);
        assert!(decoder.parse_one().is_err());
    }

    #[test]
    fn custom_reply_error_ctor_is_used() {
        let mut decoder = RespDecoder::with_options(
            DecoderOptions::new().with_reply_error_ctor(|msg| RespValue::simple_string(format!("wrapped: {msg}"))),
        );
        decoder.feed(b"-boom\r\n");
        let value = decoder.parse_one().unwrap().unwrap();
        assert_eq!(value.as_str(), Some("wrapped: boom"));
    }
}
