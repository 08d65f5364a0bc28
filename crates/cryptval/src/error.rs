//! Error types for cipher and storage-form operations.

use crate::aes256gcm::NONCE_LEN;

/// Errors produced by cryptval operations.
///
/// Each variant names the stage that failed. Variants never wrap an error from
/// a different stage, so callers can tell corrupt data apart from a wrong key.
#[derive(Debug, thiserror::Error)]
pub enum CryptError {
    /// The key handed to a cipher constructor has the wrong length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// The OS random source could not supply a nonce.
    #[error("secure random source failed: {0}")]
    RandomSource(String),

    /// The ciphertext is too short to even hold a nonce.
    #[error("malformed ciphertext: {len} bytes, need at least {min}")]
    MalformedCiphertext { len: usize, min: usize },

    /// Authentication tag mismatch (wrong key, tampering, or corruption).
    #[error("message authentication failed")]
    Authentication,

    /// The AEAD refused to seal the plaintext (length limit exceeded).
    #[error("aead seal failed")]
    Seal,

    /// The stored form is not valid padded base64.
    #[error("storable form is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The storage layer handed over a cell that is not a byte sequence.
    #[error("unexpected stored cell: {0}")]
    UnexpectedCell(String),

    /// Database error while reading a stored cell.
    #[cfg(feature = "sqlx")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CryptError {
    pub(crate) fn malformed(len: usize) -> Self {
        Self::MalformedCiphertext {
            len,
            min: NONCE_LEN,
        }
    }
}
