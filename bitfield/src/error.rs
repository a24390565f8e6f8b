//! Error types for bit field operations.

use thiserror::Error;

/// Result type for bit field operations.
pub type BitFieldResult<T> = Result<T, BitFieldError>;

/// Errors that can occur when building or reading a bit field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitFieldError {
    /// The flag is not part of the schema the bit field was built from.
    ///
    /// This is a caller bug, not a wire condition.
    #[error("flag {flag} is not declared in this {schema_len}-flag schema")]
    UnknownFlag {
        /// Name of the offending flag.
        flag: &'static str,
        /// Number of flags in the schema.
        schema_len: usize,
    },

    /// A raw bit index beyond the schema width.
    #[error("bit index {index} out of range for {schema_len}-flag schema")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of flags in the schema.
        schema_len: usize,
    },

    /// Not enough input bytes to hold the bit field.
    #[error("bit field needs {needed} bytes but only {available} available")]
    Truncated {
        /// Bytes required by the schema.
        needed: usize,
        /// Bytes present in the input.
        available: usize,
    },
}
