// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PriceSyncError>;

/// Which side of the merge a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Supplier,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Base => write!(f, "base"),
            Side::Supplier => write!(f, "supplier"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PriceSyncError {
    /// Feed download or upload transport failure (including non-2xx feed responses).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A required credential is missing from the environment.
    #[error("missing credential: environment variable {0} is not set")]
    AuthConfig(&'static str),

    /// The token endpoint refused the client credentials.
    #[error("token exchange failed with status {status}: {body}")]
    Auth { status: StatusCode, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0} price list has a header row but no data rows")]
    EmptyInput(Side),

    #[error("{side} price list has no column named {column:?}")]
    MissingColumn { side: Side, column: String },

    /// The marketplace answered the upload with a non-success status.
    #[error("upload rejected with status {status}: {body}")]
    Upload { status: StatusCode, body: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl PriceSyncError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        PriceSyncError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl From<csv::Error> for PriceSyncError {
    fn from(err: csv::Error) -> Self {
        PriceSyncError::Parse(err.to_string())
    }
}
