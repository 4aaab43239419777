//! Error taxonomy shared by every leaf component.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlexError>;

#[derive(Debug, Error)]
pub enum PlexError {
    /// Settings path unreadable/unwritable or config malformed.
    #[error("config error: {0}")]
    Config(String),

    /// No stored credential, or the stored one was rejected.
    #[error("Plex authentication required (run with --auth)")]
    AuthRequired,

    #[error("no player selected")]
    NoPlayerSelected,

    #[error("no server selected")]
    NoServerSelected,

    /// Transport-level failure: connect refused, timeout, broken body.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The remote end answered with a status we do not accept.
    #[error("server returned status {0}")]
    Status(u16),

    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A required form field was empty or invalid.
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("authentication timed out")]
    AuthTimedOut,
}

impl From<serde_json::Error> for PlexError {
    fn from(e: serde_json::Error) -> Self {
        PlexError::Parse(e.to_string())
    }
}
