//! Remote reasoning backend: wire types, HTTP client, sequential
//! interview, and the local/remote blend.

pub mod blend;
pub mod client;
pub mod interview;
pub mod types;

use std::time::Duration;

use thiserror::Error;

pub use client::{HttpTriageBackend, TriageBackend};
pub use types::{
    InterviewGoal, InterviewRequest, InterviewResponse, QaPair, RemoteTriageRequest,
    RemoteTriageResponse,
};

/// Failures talking to the backend. Every variant is recoverable: the
/// session degrades to the local result and flags the fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("backend unreachable: {0}")]
    Connection(String),

    #[error("http transport error: {0}")]
    Http(String),

    #[error("backend returned status {status}")]
    Status { status: u16 },

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("superseded by a newer turn")]
    Superseded,
}

impl RemoteError {
    /// Classify a reqwest failure the way the session needs it.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::Http(err.to_string())
        }
    }
}
