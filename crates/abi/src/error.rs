//! Error types for the codec.

/// Errors produced while encoding or decoding ABI data.
///
/// Encoding and decoding are all-or-nothing: any of these aborts the whole
/// call and no partial buffer or result is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No value was supplied for a declared parameter.
    #[error("missing value for parameter '{0}'")]
    MissingParameter(String),
    /// The number of supplied values does not match the declared parameter list.
    #[error("expected {expected} values, got {got}")]
    ValueCountMismatch {
        /// Number of declared parameters.
        expected: usize,
        /// Number of values supplied by the caller.
        got: usize,
    },
    /// A value's run-time shape does not match its declared ABI type.
    #[error("type mismatch for '{name}': expected {expected}, got {got}")]
    TypeMismatch {
        /// Name of the offending parameter.
        name: String,
        /// The declared ABI type.
        expected: String,
        /// A description of the value that was supplied.
        got: String,
    },
    /// A type string could not be parsed as a canonical ABI type.
    #[error("invalid ABI type '{0}'")]
    InvalidType(String),
    /// The type cannot be represented in packed encoding.
    #[error("type '{0}' is not supported in packed encoding")]
    UnsupportedPackedType(String),
    /// An offset or length read from the buffer exceeds the buffer's bounds.
    #[error("out-of-bounds read: need {needed} bytes at offset {offset}, buffer holds {available}")]
    OutOfBounds {
        /// Byte offset at which the read was attempted.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes actually available in the buffer.
        available: usize,
    },
    /// Decoded `string` data is not valid UTF-8.
    #[error("invalid utf-8 in string data")]
    InvalidUtf8,
    /// Internal error: a violated invariant, never expected in normal operation.
    #[error("internal error: {0}")]
    Eyre(#[from] eyre::Report),
}
