//! cinesearch - terminal movie search over the TMDB API
//!
//! Type to search, wait for the input to settle, get a list of movie cards.
//!
//! # Features
//!
//! - **Debounced input**: a query is only sent once typing pauses for the
//!   quiet interval (500 ms by default)
//! - **Popular by default**: an empty query shows the popularity-sorted
//!   discover listing immediately at startup
//! - **Latest query wins**: responses to superseded queries are discarded
//! - **Terminal UI and one-shot CLI** sharing the same fetch cycle
//!
//! # Example
//!
//! ```no_run
//! use cinesearch::{ApiConfig, SearchSession, TmdbClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn main() -> cinesearch::Result<()> {
//!     let client = TmdbClient::new(ApiConfig::from_env())?;
//!     let mut session = SearchSession::new(Arc::new(client));
//!
//!     session.commit("blade runner")?;
//!     session.wait(Duration::from_secs(10));
//!
//!     for movie in session.display().movies() {
//!         println!("{} ({})", movie.display_title(), movie.release_year());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod session;
pub mod state;
pub mod tui;

// Re-export main types
pub use api::{Endpoint, Movie, MovieSource, SearchPayload, TmdbClient};
pub use config::{ApiConfig, AppConfig};
pub use debounce::DebounceGate;
pub use error::{CineSearchError, Result};
pub use session::SearchSession;
pub use state::DisplayState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
