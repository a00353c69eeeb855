use serde_json::Value;

/// Failures of the transport itself, before any response was read
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport failure: {0}")]
    Client(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered without a truthy `success` marker
    #[error("Server returned error: {payload} (code {status})")]
    OperationFailed { status: u16, payload: Value },

    /// Rejected on the client before anything was uploaded
    #[error("Invalid upload request: {reason}")]
    InvalidUploadRequest { reason: String },

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub(crate) fn invalid_upload(reason: impl Into<String>) -> Self {
        Self::InvalidUploadRequest {
            reason: reason.into(),
        }
    }

    /// HTTP status code of a failed operation
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OperationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Diagnostic payload the server sent with a failed operation
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::OperationFailed { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
