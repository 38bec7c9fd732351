use thiserror::Error;

/// Failures at the identity and data service boundaries.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("session expired or invalid, run `sentinel login` to authenticate")]
    Unauthorized,
    #[error("{operation} was rejected ({status}): {message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },
    #[error("failed to call {operation}: {message}")]
    Transport { operation: String, message: String },
    #[error("failed to decode {what}: {message}")]
    Decode { what: String, message: String },
    #[error("{collection} row {id} not found")]
    NotFound { collection: String, id: String },
}

impl ServiceError {
    pub fn transport(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: err.to_string(),
        }
    }

    pub fn decode(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            what: what.into(),
            message: err.to_string(),
        }
    }
}
