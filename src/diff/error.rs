//! Error types for the snapshot differ.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to decode JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to pretty-print JSON: {0}")]
    Render(#[source] serde_json::Error),

    #[error("Stream ended inside a JSON value ({pending} bytes pending)")]
    Truncated { pending: usize },

    #[error("Failed to GET {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub type DiffResult<T> = Result<T, DiffError>;
