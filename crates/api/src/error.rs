#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Capability denied: {method}: {reason}")]
    CapabilityDenied { method: String, reason: String },
    #[error("Request failed: {method}: {reason}")]
    RequestFailed { method: String, reason: String },
    #[error("Connection disposed")]
    Disconnected,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, ApiError::Disconnected | ApiError::InvalidArgument(_))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
