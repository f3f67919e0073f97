//! Error types for agent sessions.

use thiserror::Error;

/// Primary error type for all session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session already running")]
    SessionAlreadyRunning,

    #[error("max steps exceeded ({steps})")]
    MaxStepsExceeded { steps: usize },

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Output decoding failed: {message}")]
    OutputDecoding { message: String },

    #[error("Model client error: {message}")]
    ModelClient { message: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Session,
    Limit,
    Tool,
    Decoding,
    ModelClient,
    Configuration,
    Serialization,
}

impl SessionError {
    /// Wrap any model client failure. Errors that already are
    /// [`SessionError::ModelClient`] pass through untouched.
    pub fn model_client(err: impl Into<SessionError>) -> Self {
        match err.into() {
            err @ Self::ModelClient { .. } => err,
            other => Self::ModelClient {
                message: other.to_string(),
            },
        }
    }

    /// Create a tool execution error.
    pub fn tool_execution(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Create an output decoding error.
    pub fn output_decoding(message: impl Into<String>) -> Self {
        Self::OutputDecoding {
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SessionAlreadyRunning | Self::InvalidState(_) => ErrorCategory::Session,
            Self::MaxStepsExceeded { .. } => ErrorCategory::Limit,
            Self::ToolNotFound(_) | Self::ToolExecution { .. } | Self::InvalidArgument(_) => {
                ErrorCategory::Tool
            }
            Self::OutputDecoding { .. } => ErrorCategory::Decoding,
            Self::ModelClient { .. } => ErrorCategory::ModelClient,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether this error ends a run when it reaches the loop.
    ///
    /// Tool failures are folded back into the conversation as error results
    /// and never end a run.
    pub fn is_loop_fatal(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Tool)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_client_wrapping_is_idempotent() {
        let wrapped = SessionError::model_client(SessionError::InvalidArgument("bad".into()));
        assert_eq!(wrapped.to_string(), "Model client error: Invalid argument: bad");

        let again = SessionError::model_client(wrapped);
        assert_eq!(again.to_string(), "Model client error: Invalid argument: bad");
    }

    #[test]
    fn tool_errors_are_not_loop_fatal() {
        assert!(!SessionError::ToolNotFound("lookup".into()).is_loop_fatal());
        assert!(!SessionError::tool_execution("lookup", "boom").is_loop_fatal());
        assert!(SessionError::MaxStepsExceeded { steps: 3 }.is_loop_fatal());
        assert!(SessionError::output_decoding("eof").is_loop_fatal());
    }

    #[test]
    fn max_steps_message_names_the_budget() {
        let err = SessionError::MaxStepsExceeded { steps: 5 };
        assert_eq!(err.to_string(), "max steps exceeded (5)");
        assert_eq!(err.category(), ErrorCategory::Limit);
    }
}
