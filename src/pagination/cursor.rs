//! Continuation token codec.
//!
//! # Wire format (version 1)
//!
//! A token is the unpadded URL-safe base64 (RFC 4648 §5) encoding of the
//! boundary record id as an 8-byte big-endian unsigned integer. Every token
//! is therefore exactly 11 characters from `[A-Za-z0-9_-]`.
//!
//! Decoding is strict: padding, non-canonical trailing bits, any length other
//! than 8 bytes, and the id `0` are all rejected. This format is fixed for the
//! deployment; tokens held by clients must stay decodable.

use crate::error::ServiceError;
use crate::storage::RecordId;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

/// Length of an encoded token in characters.
pub const TOKEN_LEN: usize = 11;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("expected 8 bytes, decoded {0}")]
    Length(usize),

    #[error("identifier 0 is never issued")]
    ZeroId,
}

impl From<CursorError> for ServiceError {
    fn from(err: CursorError) -> Self {
        ServiceError::MalformedToken {
            reason: err.to_string(),
        }
    }
}

/// Encodes a record id as a continuation token.
#[must_use]
pub fn encode_cursor(id: RecordId) -> String {
    URL_SAFE_NO_PAD.encode(id.get().to_be_bytes())
}

/// Decodes a continuation token back into the record id it carries.
pub fn decode_cursor(token: &str) -> Result<RecordId, CursorError> {
    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let raw: [u8; 8] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| CursorError::Length(bytes.len()))?;
    RecordId::new(u64::from_be_bytes(raw)).ok_or(CursorError::ZeroId)
}
