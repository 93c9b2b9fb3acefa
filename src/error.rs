use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Marker used in diagnostics when a response carried no body at all.
pub const EMPTY_RESPONSE: &str = "empty response";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure from the HTTP transport. Never retried.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse response as JSON: {reason}. Response: {body}")]
    InvalidJson { reason: String, body: String },
    #[error("assertion failed: {0}")]
    Assertion(String),
}

impl Error {
    pub fn assertion<S: Into<String>>(message: S) -> Self {
        Error::Assertion(message.into())
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Error::Config(Box::new(e))
    }
}
