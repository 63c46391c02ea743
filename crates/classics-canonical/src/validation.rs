use thiserror::Error;

/// Validation errors for canonical identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When an encoded value cannot be decoded.
    #[error("{field} is not decodable: {reason}")]
    Encoding {
        /// Field name that failed to decode.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },
}
