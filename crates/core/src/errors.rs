//! Error types for the wrapperaudit core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type.
//!
//! Check failures are *not* errors: they are reported as outcomes in an
//! [`AuditReport`](crate::report::AuditReport).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Properties(#[from] PropertiesError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

// ---------------------------------------------------------------------------
// Properties errors
// ---------------------------------------------------------------------------

/// Errors from loading a `.properties` document into a map.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// The properties file does not exist.
    #[error("properties file not found: {0}")]
    FileNotFound(String),

    /// A `\uXXXX` escape was truncated or contained a non-hex digit.
    #[error("malformed \\uXXXX escape on line {line}: {detail}")]
    MalformedEscape { line: usize, detail: String },

    /// Generic I/O error reading the file.
    #[error("properties I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Policy errors
// ---------------------------------------------------------------------------

/// Errors from audit policy loading and validation.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy file not found.
    #[error("policy file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("policy parse error: {0}")]
    ParseError(String),

    /// A policy value is invalid.
    #[error("invalid policy value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the policy file.
    #[error("policy I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
