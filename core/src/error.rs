//! Error types for the ToyDB client.
//!
//! # Design
//! Validation failures are raised before any request exists, so they carry
//! only a message. Non-200 replies from the status-checking endpoints land in
//! `Server` with the raw status and body; the body is the server's own error
//! text and is what callers usually want to show.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by `DbClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base endpoint is not an absolute http(s) address.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A required parameter was missing or empty. No request was sent.
    #[error("{0}")]
    Validation(String),

    /// The round trip itself failed (connection refused, DNS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body was not the JSON the endpoint promises.
    #[error("parse failed: {0}")]
    Parse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Raw response body for `Server` errors.
    pub fn server_body(&self) -> Option<&str> {
        match self {
            ClientError::Server { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
