//! Error types for cinesearch
//!
//! Every failure inside the fetch cycle is collapsed into a display state;
//! these variants carry the diagnostic detail that ends up in the log.

use thiserror::Error;

/// Main error type for cinesearch operations
#[derive(Error, Debug)]
pub enum CineSearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Fetch worker stopped")]
    WorkerGone,

    #[error("Fetch panicked: {0}")]
    Panicked(String),
}

/// Result type alias for cinesearch operations
pub type Result<T> = std::result::Result<T, CineSearchError>;

impl CineSearchError {
    /// Whether the error came from talking to the remote API, as opposed to
    /// local setup
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CineSearchError::Http(_) | CineSearchError::Status(_) | CineSearchError::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_is_remote() {
        assert!(CineSearchError::Status(500).is_remote());
        assert!(!CineSearchError::Config("missing".into()).is_remote());
        assert!(!CineSearchError::WorkerGone.is_remote());
    }

    #[test]
    fn decode_error_message_mentions_body() {
        let err: CineSearchError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Malformed response body"));
    }
}
