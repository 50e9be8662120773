use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("{operation} request failed: {message}")]
    Transport { operation: String, message: String },

    #[error("{operation} returned a malformed payload: {message}")]
    MalformedPayload { operation: String, message: String },

    #[error("unknown user identifier: {0}")]
    UnknownIdentifier(String),

    #[error("member {0} has neither a display name nor a real name")]
    EmptyDisplayName(String),

    #[error("malformed message timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("thread {0} returned no messages")]
    EmptyThread(String),

    #[error("failed to publish {path}: {message}")]
    Publish { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BackupError {
    pub fn transport(operation: &str, message: impl ToString) -> Self {
        BackupError::Transport {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub fn malformed(operation: &str, message: impl ToString) -> Self {
        BackupError::MalformedPayload {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}
