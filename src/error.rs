/// Result type for blocksim operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Main error type for the blocksim library.
///
/// These are usage errors: a caller handed the core something it cannot
/// interpret. Model inconsistencies and learner invariant violations are not
/// errors; they travel as [`crate::diagnostics::Diagnostic`] values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A predicate key that is not part of the estimator's schema
    #[error("Unknown predicate '{0}'")]
    UnknownPredicate(String),

    /// A predicate key string that does not parse
    #[error("Invalid predicate key '{0}'")]
    InvalidKey(String),

    /// An action was invoked without a parameter one of its rules needs
    #[error("Missing action parameter '{param}'")]
    MissingParameter { param: String },

    /// A parameter used as an object index holds something else
    #[error("Parameter '{param}' must name an object, got {value}")]
    NotAnObject { param: String, value: String },

    /// No action model or learner is registered under this name
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// Generality is only defined between compatible literals
    #[error("Generality check between incompatible literals {left} and {right}")]
    IncompatibleLiterals { left: String, right: String },

    /// Terms of different declared kinds are never compared
    #[error("Cannot compare terms of kinds '{left}' and '{right}'")]
    KindMismatch { left: String, right: String },

    /// A split would need more hypotheses than can be counted
    #[error("Cannot split on {width} unknown predicates at once")]
    SplitTooWide { width: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl SimError {
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        SimError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn incompatible_literals<A: ToString, B: ToString>(left: &A, right: &B) -> Self {
        SimError::IncompatibleLiterals {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn unknown_predicate<K: ToString>(key: &K) -> Self {
        SimError::UnknownPredicate(key.to_string())
    }
}
