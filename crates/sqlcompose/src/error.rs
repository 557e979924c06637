//! Error types for sqlcompose

use thiserror::Error;

/// Result type alias for query building
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while building or rendering a query.
///
/// Rendering either succeeds with complete SQL text or fails with one of these;
/// a partially written buffer is never handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QbError {
    /// Invalid builder input (e.g. a malformed identifier)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The target dialect cannot express a construct used by the query
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        dialect: &'static str,
        feature: String,
    },

    /// More bound parameters than the dialect accepts in one statement
    #[error("Too many bind parameters: {count} (max {max})")]
    TooManyParams { count: usize, max: usize },
}

impl QbError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an unsupported-feature error
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an unsupported-feature error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_names_dialect_and_feature() {
        let err = QbError::unsupported("sqlite", "INTERSECT ALL");
        assert_eq!(err.to_string(), "sqlite does not support INTERSECT ALL");
        assert!(err.is_unsupported());
        assert!(!err.is_validation());
    }

    #[test]
    fn too_many_params_message() {
        let err = QbError::TooManyParams { count: 2101, max: 2100 };
        assert_eq!(err.to_string(), "Too many bind parameters: 2101 (max 2100)");
    }
}
