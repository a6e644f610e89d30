//! One-line outcome messages for CLI feedback.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Warning,
    Failure,
}

/// Wrapper type for displaying the outcome of one operation.
pub struct OperationStatus {
    pub message: String,
    pub outcome: Outcome,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            outcome: Outcome::Success,
        }
    }

    /// Something was skipped or only partly succeeded.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            outcome: Outcome::Warning,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            outcome: Outcome::Failure,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.outcome {
            Outcome::Success => "Success:",
            Outcome::Warning => "Warning:",
            Outcome::Failure => "Error:",
        };
        writeln!(f, "{label} {}", self.message)
    }
}
