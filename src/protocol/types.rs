//! RESP2/RESP3 value types.
//!
//! This module defines the decoded value tree. Every scalar that can carry
//! text (simple string, bulk string, verbatim string) is represented by
//! [`Text`], which is either raw bytes or a decoded `String` depending on
//! whether the owning [`crate::RespDecoder`] was configured with an
//! `encoding`. Aggregates nest the same [`RespValue`] recursively.
//!
//! ## Protocol Format
//!
//! Each RESP type starts with a type prefix byte; all types are terminated
//! with CRLF (`\r\n`).
//!
//! | Tag | Kind |
//! |---|---|
//! | `+` | simple string |
//! | `-` | error |
//! | `:` | integer |
//! | `(` | big number |
//! | `,` | double |
//! | `#` | boolean |
//! | `_` | null |
//! | `$` | bulk string |
//! | `=` | verbatim string |
//! | `*` | array |
//! | `~` | set |
//! | `%` | map |
//! | `>` | push (decoded as an array; see crate docs) |

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used throughout RESP.
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes.
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BIG_NUMBER: u8 = b'(';
    pub const DOUBLE: u8 = b',';
    pub const BOOLEAN: u8 = b'#';
    pub const NULL: u8 = b'_';
    pub const BULK_STRING: u8 = b'$';
    pub const VERBATIM_STRING: u8 = b'=';
    pub const ARRAY: u8 = b'*';
    pub const SET: u8 = b'~';
    pub const MAP: u8 = b'%';
    pub const PUSH: u8 = b'>';
}

/// A string-bearing scalar, delivered as raw bytes or as decoded text
/// depending on the decoder's configured `encoding`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Bytes(Bytes),
    Str(String),
}

impl Text {
    /// Borrow the underlying bytes regardless of which variant this is.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Text::Bytes(b) => b,
            Text::Str(s) => s.as_bytes(),
        }
    }

    /// Borrow as `&str` if this is the decoded variant, or if the raw bytes
    /// happen to be valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Text::Str(s) => Some(s),
            Text::Bytes(b) => std::str::from_utf8(b).ok(),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "(binary data, {} bytes)", self.as_bytes().len()),
        }
    }
}

/// A fully decoded RESP2/RESP3 reply value.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+<string>\r\n`
    SimpleString(Text),
    /// `-<message>\r\n` — a server-reported error, returned as a value, never raised.
    Error(String),
    /// `:<integer>\r\n`
    Integer(i64),
    /// `(<integer>\r\n` — parsed identically to `Integer`.
    BigNumber(i64),
    /// `,<float>\r\n`
    Double(f64),
    /// `#t\r\n` / `#f\r\n`
    Boolean(bool),
    /// `_\r\n`, or a null bulk string (`$-1\r\n`) / null aggregate (`*-1\r\n`).
    Null,
    /// `$<length>\r\n<data>\r\n`
    BulkString(Text),
    /// `=<length>\r\n<fmt>:<data>\r\n` — only `<data>` is kept; the 3-byte
    /// format tag is discarded.
    Verbatim(Text),
    /// `*<count>\r\n<element>...`
    Array(Vec<RespValue>),
    /// `~<count>\r\n<element>...` — later duplicate elements overwrite
    /// earlier ones (last-write-wins), mirroring `Map`'s duplicate-key
    /// handling. Backed by `Vec` rather than a hash set because
    /// `RespValue` carries `f64` and so cannot implement `Hash`/`Eq`.
    Set(Vec<RespValue>),
    /// `%<count>\r\n<key><value>...` — later duplicate keys overwrite
    /// earlier ones; key order is otherwise insertion order and not
    /// meaningful.
    Map(Vec<(RespValue, RespValue)>),
}

impl RespValue {
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(Text::Str(s.into()))
    }

    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Text::Bytes(data.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RespValue::Error(_))
    }

    /// Borrows the inner text for `SimpleString`, `BulkString`, or `Verbatim`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespValue::SimpleString(t) | RespValue::BulkString(t) | RespValue::Verbatim(t) => {
                t.as_str()
            }
            RespValue::Error(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RespValue]> {
        match self {
            RespValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Inserts a key/value pair into a map's backing vector, overwriting any
    /// existing entry with an equal key (last-write-wins, per the wire
    /// semantics documented on [`RespValue::Map`]).
    pub(crate) fn map_insert(pairs: &mut Vec<(RespValue, RespValue)>, key: RespValue, value: RespValue) {
        if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            pairs.push((key, value));
        }
    }

    /// Inserts an element into a set's backing vector, overwriting any
    /// existing equal element in place (last-write-wins, per the wire
    /// semantics documented on [`RespValue::Set`]).
    pub(crate) fn set_insert(items: &mut Vec<RespValue>, value: RespValue) {
        if let Some(slot) = items.iter_mut().find(|existing| **existing == value) {
            *slot = value;
        } else {
            items.push(value);
        }
    }

    /// Serializes the value back into its RESP wire form.
    ///
    /// This is test/debug tooling (round-trip verification, bench input
    /// generation), not a command encoder — the decoder's non-goal is
    /// encoding outgoing *commands*, which this does not do.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(t) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(t.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::BigNumber(n) => {
                buf.push(prefix::BIG_NUMBER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Double(d) => {
                buf.push(prefix::DOUBLE);
                buf.extend_from_slice(format_double(*d).as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Boolean(b) => {
                buf.push(prefix::BOOLEAN);
                buf.push(if *b { b't' } else { b'f' });
                buf.extend_from_slice(CRLF);
            }
            RespValue::Null => {
                buf.push(prefix::NULL);
                buf.extend_from_slice(CRLF);
            }
            RespValue::BulkString(t) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(t.as_bytes().len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(t.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Verbatim(t) => {
                let payload = t.as_bytes();
                buf.push(prefix::VERBATIM_STRING);
                buf.extend_from_slice((payload.len() + 4).to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(b"txt:");
                buf.extend_from_slice(payload);
                buf.extend_from_slice(CRLF);
            }
            RespValue::Array(values) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
            RespValue::Set(values) => {
                buf.push(prefix::SET);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
            RespValue::Map(pairs) => {
                buf.push(prefix::MAP);
                buf.extend_from_slice(pairs.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for (k, v) in pairs {
                    k.serialize_into(buf);
                    v.serialize_into(buf);
                }
            }
        }
    }
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "nan".to_string()
    } else if d.is_infinite() {
        if d > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        d.to_string()
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(t) => write!(f, "\"{t}\""),
            RespValue::Error(s) => write!(f, "(error) {s}"),
            RespValue::Integer(n) | RespValue::BigNumber(n) => write!(f, "(integer) {n}"),
            RespValue::Double(d) => write!(f, "(double) {d}"),
            RespValue::Boolean(b) => write!(f, "(boolean) {b}"),
            RespValue::Null => write!(f, "(nil)"),
            RespValue::BulkString(t) | RespValue::Verbatim(t) => write!(f, "\"{t}\""),
            RespValue::Array(values) | RespValue::Set(values) => {
                if values.is_empty() {
                    write!(f, "(empty collection)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {v}", i + 1)?;
                    }
                    Ok(())
                }
            }
            RespValue::Map(pairs) => {
                if pairs.is_empty() {
                    write!(f, "(empty map)")
                } else {
                    writeln!(f)?;
                    for (k, v) in pairs {
                        writeln!(f, "{k} => {v}")?;
                    }
                    Ok(())
                }
            }
        }
    }
}
