//! Display state of the results panel

use crate::api::{Movie, SearchPayload};

/// Shown for transport, status and decoding failures
pub const GENERIC_FETCH_ERROR: &str = "Error fetching movies. Please try again later.";

/// Shown for a logical-failure payload that carries no message of its own
pub const FALLBACK_FETCH_ERROR: &str = "Failed to fetch movies";

/// Exactly one of these is active at any time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DisplayState {
    #[default]
    Loading,
    Error(String),
    Loaded(Vec<Movie>),
}

impl DisplayState {
    /// State for a request that failed before a usable payload arrived
    pub fn failed() -> Self {
        DisplayState::Error(GENERIC_FETCH_ERROR.to_string())
    }

    /// Interpret a successfully decoded payload
    pub fn from_payload(payload: SearchPayload) -> Self {
        if payload.is_logical_failure() {
            let message = payload
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_FETCH_ERROR.to_string());
            return DisplayState::Error(message);
        }
        DisplayState::Loaded(payload.results.unwrap_or_default())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayState::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            DisplayState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Results to render. Empty unless loaded.
    pub fn movies(&self) -> &[Movie] {
        match self {
            DisplayState::Loaded(movies) => movies,
            _ => &[],
        }
    }

    /// One-line description for the log
    pub fn summary(&self) -> String {
        match self {
            DisplayState::Loading => "loading".to_string(),
            DisplayState::Error(msg) => format!("error '{}'", msg),
            DisplayState::Loaded(movies) => format!("{} movies", movies.len()),
        }
    }
}
