//! Errors produced while relaying a conversation

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// A required request field was absent or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Chat was attempted before a credential was set
    #[error("apiKey is required, set one with POST /apiKey first")]
    MissingCredential,

    #[error("Failed to build provider client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Provider responded with {status}: {body}")]
    UpstreamStatus { status: StatusCode, body: String },

    /// An error event sent in place of a completion chunk
    #[error("Provider reported an error mid-stream: {0}")]
    UpstreamEvent(String),

    #[error("Malformed completion chunk: {0}")]
    MalformedChunk(#[from] serde_json::Error),

    /// The task relaying the reply stopped before finishing the turn
    #[error("Relay interrupted: {0}")]
    Interrupted(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::MissingCredential => StatusCode::PRECONDITION_FAILED,
            RelayError::ClientBuild(_) | RelayError::Interrupted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Upstream(_)
            | RelayError::UpstreamStatus { .. }
            | RelayError::UpstreamEvent(_)
            | RelayError::MalformedChunk(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
