//! RESP2/RESP3 wire protocol: value types and the incremental decoder.

pub mod buffer;
pub mod error;
pub mod parser;
pub mod types;

pub use error::DecodeError;
pub use parser::{DecoderOptions, Encoding, EncodingErrors, RespDecoder, MAX_NESTING_DEPTH};
pub use types::{prefix, RespValue, Text, CRLF};
