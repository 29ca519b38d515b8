use thiserror::Error;

/// Core error types for rsvpd operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Capacity exceeded: {event_id}/{cohort} is full")]
    CapacityExceeded { event_id: String, cohort: String },

    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    #[error("Email already present: {email}")]
    DuplicateEmail { email: String },

    #[error("Unknown event occurrence: {0}")]
    UnknownOccurrence(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new CapacityExceeded error
    pub fn capacity_exceeded(event_id: impl Into<String>, cohort: impl Into<String>) -> Self {
        Self::CapacityExceeded {
            event_id: event_id.into(),
            cohort: cohort.into(),
        }
    }

    /// Create a new NotFound error
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a new DuplicateEmail error
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Create a new UnknownOccurrence error
    pub fn unknown_occurrence(id: impl Into<String>) -> Self {
        Self::UnknownOccurrence(id.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a new Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::CapacityExceeded { .. }
                | Self::NotFound { .. }
                | Self::DuplicateEmail { .. }
                | Self::UnknownOccurrence(_)
                | Self::InvalidTimestamp(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Persistence(_) | Self::JsonError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::UnknownOccurrence(_) | Self::InvalidTimestamp(_) => {
                ErrorCategory::Validation
            }
            Self::CapacityExceeded { .. } => ErrorCategory::Capacity,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::DuplicateEmail { .. } => ErrorCategory::Conflict,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Persistence(_) => ErrorCategory::Persistence,
            Self::JsonError(_) => ErrorCategory::Serialization,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Capacity,
    NotFound,
    Conflict,
    Serialization,
    Configuration,
    Persistence,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Capacity => write!(f, "capacity"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
