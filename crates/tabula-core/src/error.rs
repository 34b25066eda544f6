use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::shape::Diagnostic;

/// Constructor-level validation errors for identifiers and timestamps.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} id cannot be empty")]
    EmptyId { kind: &'static str },
    #[error("{kind} id '{value}' must start with '{prefix}'")]
    IdPrefix {
        kind: &'static str,
        prefix: &'static str,
        value: String,
    },
    #[error("{kind} id length {len} outside {min}..={max}")]
    IdLength {
        kind: &'static str,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Malformed shape declarations. These are defects in calling code and are
/// reported when a schema is built, never during a remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{path}: min length {min} exceeds max length {max}")]
    LengthBounds { path: String, min: usize, max: usize },
    #[error("{path}: range minimum {min} exceeds maximum {max}")]
    RangeBounds { path: String, min: i64, max: i64 },
    #[error("{path}: union must list at least one member")]
    EmptyUnion { path: String },
    #[error("{path}: enum must list at least one value")]
    EmptyEnum { path: String },
    #[error("{path}: duplicate object key '{key}'")]
    DuplicateKey { path: String, key: String },
}

/// Missing or invalid client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AIRTABLE_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid timeout '{value}': expected milliseconds")]
    InvalidTimeout { value: String },
}

/// Failure category of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// Arguments or response payload did not match the declared shape.
    Validation,
    /// The remote call itself failed: transport, timeout, or non-2xx status.
    Integration,
}

/// Tagged failure returned by every network-touching operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    kind: CallErrorKind,
    message: String,
    status: Option<u16>,
    diagnostic: Option<Diagnostic>,
}

impl CallError {
    pub fn validation(context: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            kind: CallErrorKind::Validation,
            message: format!("{}: {diagnostic}", context.into()),
            status: None,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn integration(message: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Integration,
            message: message.into(),
            status: None,
            diagnostic: None,
        }
    }

    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: CallErrorKind::Integration,
            message: message.into(),
            status: Some(status),
            diagnostic: None,
        }
    }

    pub const fn kind(&self) -> CallErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self.kind, CallErrorKind::Validation)
    }

    pub const fn is_integration(&self) -> bool {
        matches!(self.kind, CallErrorKind::Integration)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            CallErrorKind::Validation => "call.validation",
            CallErrorKind::Integration => "call.integration",
        }
    }
}

impl Display for CallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for CallError {}

/// Result of a validated remote call.
pub type CallResult<T> = Result<T, CallError>;
