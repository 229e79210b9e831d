use thiserror::Error;

/// Text shown in the outcome panel for every transport-level failure.
pub const TRANSPORT_ERROR_MESSAGE: &str = "An error occurred while sending the command.";

/// Why a submission could not produce a parsed response.
///
/// The detail is kept for the log only; the form always collapses it to
/// [`TRANSPORT_ERROR_MESSAGE`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("execution endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("request to execution endpoint timed out")]
    Timeout,

    #[error("request to execution endpoint failed: {0}")]
    Request(String),

    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    #[error("response body does not match the expected schema: {0}")]
    Schema(String),
}

impl TransportError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unreachable(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(err.to_string())
    }
}
