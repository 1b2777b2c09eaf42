//! Error types for udr-tables

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Route table not found: {table}")]
    NotFound { table: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid route table JSON from {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed route table from {origin}: {message}")]
    Malformed { origin: String, message: String },

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request to {url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Route table {table} changed since it was read")]
    Conflict { table: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    #[error("Missing backend setting: {name}")]
    MissingSetting { name: &'static str },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            origin: origin.into(),
            source,
        }
    }
}

impl From<Error> for udr_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { table } => udr_core::Error::RouteTableNotFound { table },
            other => udr_core::Error::backend(other),
        }
    }
}
