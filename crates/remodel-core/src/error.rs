//! Error types for the remodel library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which generation operation produced a [`RemodelError::Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    StepImage,
    VariantImage,
    ProductImage,
    NarrationAudio,
    Video,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::StepImage => "step image",
            GenerationKind::VariantImage => "variant image",
            GenerationKind::ProductImage => "product image",
            GenerationKind::NarrationAudio => "narration audio",
            GenerationKind::Video => "video",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comprehensive error type for all session operations.
#[derive(Error, Debug)]
pub enum RemodelError {
    /// Initial plan synthesis failed or returned a malformed plan. Fatal to
    /// the session.
    #[error("Planning failed: {message}")]
    Planning { message: String },
    /// A media synthesis call failed. Recoverable.
    #[error("{kind} generation failed: {message}")]
    Generation {
        kind: GenerationKind,
        message: String,
    },
    /// A single-flight guard refused a duplicate request
    #[error("{what} is already in progress")]
    InFlight { what: String },
    /// A result arrived after the session was reset or its input was
    /// invalidated, and was dropped
    #[error("{what} result discarded: the session changed while it was generating")]
    Discarded { what: String },
    /// The session has no plan yet
    #[error("No plan loaded in this session")]
    NoPlan,
    /// A step or substep index did not resolve
    #[error("{what} not found")]
    NotFound { what: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Transport-level failure talking to a generation backend
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration errors, including missing credentials
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> RemodelError {
        RemodelError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl RemodelError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    pub fn planning(message: impl Into<String>) -> Self {
        Self::Planning {
            message: message.into(),
        }
    }

    pub fn generation(kind: GenerationKind, message: impl Into<String>) -> Self {
        Self::Generation {
            kind,
            message: message.into(),
        }
    }

    pub fn in_flight(what: impl Into<String>) -> Self {
        Self::InFlight { what: what.into() }
    }

    pub fn discarded(what: impl Into<String>) -> Self {
        Self::Discarded { what: what.into() }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true for errors the user can retry from a local control.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RemodelError::Planning { .. } | RemodelError::NoPlan)
    }

    /// Re-tags a gateway error as a failure of the given operation so that
    /// transport and decoding problems surface as generation failures.
    pub(crate) fn into_generation(self, kind: GenerationKind) -> Self {
        match self {
            RemodelError::Generation { .. } => self,
            other => RemodelError::generation(kind, other.to_string()),
        }
    }

    pub(crate) fn into_planning(self) -> Self {
        match self {
            RemodelError::Planning { .. } => self,
            other => RemodelError::planning(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for RemodelError {
    fn from(source: reqwest::Error) -> Self {
        RemodelError::Http {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Result type alias for remodel operations
pub type Result<T> = std::result::Result<T, RemodelError>;
