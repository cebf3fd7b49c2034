// ── Crate Errors ────────────────────────────────────────────────────────────
// Single canonical error enum for the whole crate, built with `thiserror`.
//
// Design rules:
//   • Variants are grouped by the crate area they come from (codec,
//     multi-recipient, GUID, identifier providers, streaming, config).
//   • No variant carries private key or symmetric key material in its message
//     or its `source_data`.
//   • `source_data` is bounded to 64 bytes so a malformed envelope can never
//     make an error balloon to the size of the input.

use thiserror::Error;

/// Maximum number of offending bytes an error carries for diagnostics.
pub const MAX_SOURCE_DATA: usize = 64;

/// Truncate `bytes` to [`MAX_SOURCE_DATA`] for embedding in an error.
pub(crate) fn truncate_source_data(bytes: &[u8]) -> Vec<u8> {
    bytes[..bytes.len().min(MAX_SOURCE_DATA)].to_vec()
}

#[derive(Debug, Error)]
pub enum EciesError {
    // ── ECIES codec / primitives ──────────────────────────────────────
    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("invalid public key: point is not on the curve")]
    InvalidPublicKey,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("recipient not found in envelope")]
    RecipientNotFound,

    #[error("too many recipients: {count} exceeds configured maximum {max}")]
    TooManyRecipients { count: usize, max: usize },

    #[error("unsupported envelope version: {0}")]
    InvalidEnvelopeVersion(u8),

    // ── GUID ───────────────────────────────────────────────────────────
    #[error("invalid GUID ({shape}, len={len})")]
    InvalidGuid {
        shape: &'static str,
        len: usize,
        source_data: Vec<u8>,
    },

    #[error("invalid GUID length: {0}")]
    InvalidGuidLength(usize),

    #[error("invalid GUID brand/version: {0}")]
    InvalidGuidBrand(String),

    // ── Identifier providers ────────────────────────────────────────────
    #[error("input must be a string")]
    InputMustBeString,

    #[error("invalid string length: expected {expected}, got {actual}")]
    InvalidStringLength { expected: usize, actual: usize },

    #[error("invalid characters in identifier string")]
    InvalidCharacters,

    #[error("failed to parse identifier: {0}")]
    ParseFailed(String),

    #[error("invalid byte-length parameter: {0}")]
    InvalidByteLengthParameter(usize),

    #[error("deserialized identifier failed validation")]
    InvalidDeserializedId,

    // ── Streaming ────────────────────────────────────────────────────
    #[error("value is null")]
    ValueIsNull,

    #[error("decrypted value length mismatch: expected {expected}, got {actual}")]
    DecryptedValueLengthMismatch { expected: usize, actual: usize },

    #[error("decrypted value checksum mismatch")]
    DecryptedValueChecksumMismatch,

    #[error("operation aborted by cancellation")]
    Aborted,

    // ── Config & invariants ───────────────────────────────────────────
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Catch-all for wrapping a lower-level primitive failure with the
    /// offset/bytes it failed on. Prefer a dedicated variant in new code.
    #[error("{message} (at offset {offset})")]
    WithSourceData {
        message: String,
        offset: usize,
        source_data: Vec<u8>,
    },
}

pub type EciesResult<T> = Result<T, EciesError>;

impl EciesError {
    /// Wrap a lower-level codec failure with the offset/bytes it occurred at,
    /// bounding the captured bytes to [`MAX_SOURCE_DATA`].
    pub fn with_source_data(message: impl Into<String>, offset: usize, bytes: &[u8]) -> Self {
        EciesError::WithSourceData {
            message: message.into(),
            offset,
            source_data: truncate_source_data(bytes),
        }
    }
}
