//! Error handling and custom error types
//!
//! Provides unified error handling across the orchestrator using thiserror.
//! HTTP status mapping lives with the server in `server.rs`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polling cancelled")]
    Cancelled,

    #[error("Generation {id} still pending after {attempts} status checks")]
    PollExhausted { id: String, attempts: u32 },
}

impl Error {
    /// True when the failure came from reaching or decoding a provider.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Upstream(_) | Error::Http(_) | Error::Serialization(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
