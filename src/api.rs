//! Movie metadata API client
//!
//! Two endpoints are used: free-text search and the popularity-sorted
//! discover listing. Result records are passed through as received; only the
//! fields the cards display are typed.

use crate::config::ApiConfig;
use crate::error::{CineSearchError, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image CDN prefix for poster paths
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Public movie page prefix
pub const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

/// One result record.
///
/// Display fields that arrive with an unexpected JSON type are left `None`
/// and kept verbatim in `extra`, so one odd record never sinks a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    /// Display key
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Everything else the API sent, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Movie {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra = Map::<String, Value>::deserialize(deserializer)?;
        let id = match extra.remove("id") {
            Some(v) => u64::deserialize(v).map_err(<D::Error as de::Error>::custom)?,
            None => return Err(<D::Error as de::Error>::missing_field("id")),
        };

        Ok(Movie {
            id,
            title: take_typed(&mut extra, "title"),
            poster_path: take_typed(&mut extra, "poster_path"),
            release_date: take_typed(&mut extra, "release_date"),
            vote_average: take_typed(&mut extra, "vote_average"),
            original_language: take_typed(&mut extra, "original_language"),
            overview: take_typed(&mut extra, "overview"),
            extra,
        })
    }
}

/// Move `key` out of `map` if it decodes as `T`; otherwise leave it in place
fn take_typed<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let parsed = map.get(key).and_then(|v| T::deserialize(v).ok())?;
    map.remove(key);
    Some(parsed)
}

/// `Some` only when the field holds a `T`; any other type reads as absent
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

impl Movie {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Rating with one decimal, or `N/A`
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v > 0.0 => format!("{:.1}", v),
            _ => "N/A".to_string(),
        }
    }

    /// Year part of the release date, or `N/A`
    pub fn release_year(&self) -> String {
        self.release_date
            .as_deref()
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.format("%Y").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn language_label(&self) -> String {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| l.to_uppercase())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", POSTER_BASE_URL, p))
    }

    pub fn page_url(&self) -> String {
        format!("{}/{}", MOVIE_PAGE_BASE_URL, self.id)
    }
}

/// Response body shared by both endpoints.
///
/// Only `results` must have the right shape. The scalar fields are read
/// leniently: a flag or count of an unexpected type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub results: Option<Vec<Movie>>,
    /// `"False"` signals a logical failure
    #[serde(default, deserialize_with = "lenient")]
    pub response: Option<String>,
    /// Message accompanying a logical failure
    #[serde(default, rename = "Error", deserialize_with = "lenient")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_results: Option<u64>,
}

impl SearchPayload {
    pub fn is_logical_failure(&self) -> bool {
        self.response.as_deref() == Some("False")
    }
}

/// Which listing to request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Popularity-sorted default listing
    Discover,
    /// Free-text title search
    Search(String),
}

impl Endpoint {
    /// Empty query means the popular listing. Whitespace counts as text.
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            Endpoint::Discover
        } else {
            Endpoint::Search(query.to_string())
        }
    }

    pub fn url(&self, base: &str) -> String {
        match self {
            Endpoint::Discover => format!("{}/discover/movie?sort_by=popularity.desc", base),
            Endpoint::Search(q) => {
                format!("{}/search/movie?query={}", base, urlencoding::encode(q))
            }
        }
    }
}

/// Something that can answer an endpoint with a payload.
///
/// `TmdbClient` talks HTTP; tests substitute in-memory sources.
pub trait MovieSource: Send + Sync {
    fn fetch(&self, endpoint: &Endpoint) -> Result<SearchPayload>;

    /// URL used for logging
    fn describe(&self, endpoint: &Endpoint) -> String {
        endpoint.url("")
    }
}

/// HTTP client for the TMDB v3 API
pub struct TmdbClient {
    config: ApiConfig,
    client: Client,
}

impl TmdbClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

}

impl MovieSource for TmdbClient {
    fn fetch(&self, endpoint: &Endpoint) -> Result<SearchPayload> {
        let url = endpoint.url(&self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(CineSearchError::Status(status.as_u16()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self, endpoint: &Endpoint) -> String {
        endpoint.url(&self.config.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_query_selects_discover() {
        assert_eq!(Endpoint::for_query(""), Endpoint::Discover);
        assert_eq!(
            Endpoint::for_query("").url("https://api.example"),
            "https://api.example/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn search_query_is_url_encoded() {
        let url = Endpoint::for_query("the matrix & co/2").url("https://api.example");
        assert_eq!(
            url,
            "https://api.example/search/movie?query=the%20matrix%20%26%20co%2F2"
        );
    }

    #[test]
    fn whitespace_only_query_still_searches() {
        assert_eq!(Endpoint::for_query(" "), Endpoint::Search(" ".to_string()));
    }

    #[test]
    fn movie_keeps_unknown_fields() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 603,
            "title": "The Matrix",
            "adult": false,
            "genre_ids": [28, 878]
        }))
        .unwrap();

        assert_eq!(movie.id, 603);
        assert_eq!(movie.extra.get("adult"), Some(&json!(false)));
        assert_eq!(movie.extra.get("genre_ids"), Some(&json!([28, 878])));

        let back = serde_json::to_value(&movie).unwrap();
        assert_eq!(back["genre_ids"], json!([28, 878]));
    }

    #[test]
    fn card_labels() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 1,
            "title": "Heat",
            "vote_average": 7.94,
            "release_date": "1995-12-15",
            "original_language": "en",
            "poster_path": "/heat.jpg"
        }))
        .unwrap();

        assert_eq!(movie.rating_label(), "7.9");
        assert_eq!(movie.release_year(), "1995");
        assert_eq!(movie.language_label(), "EN");
        assert_eq!(
            movie.poster_url().as_deref(),
            Some("https://image.tmdb.org/t/p/w500/heat.jpg")
        );
        assert_eq!(movie.page_url(), "https://www.themoviedb.org/movie/1");
    }

    #[test]
    fn card_labels_fall_back() {
        let movie: Movie = serde_json::from_value(json!({ "id": 2, "release_date": "" })).unwrap();
        assert_eq!(movie.display_title(), "Untitled");
        assert_eq!(movie.rating_label(), "N/A");
        assert_eq!(movie.release_year(), "N/A");
        assert_eq!(movie.language_label(), "N/A");
        assert_eq!(movie.poster_url(), None);
    }

    #[test]
    fn payload_detects_logical_failure() {
        let payload: SearchPayload =
            serde_json::from_value(json!({ "response": "False", "Error": "no results" })).unwrap();
        assert!(payload.is_logical_failure());
        assert_eq!(payload.error.as_deref(), Some("no results"));
        assert_eq!(payload.results, None);

        let payload: SearchPayload = serde_json::from_value(json!({ "response": "True" })).unwrap();
        assert!(!payload.is_logical_failure());
    }

    #[test]
    fn oddly_typed_display_field_keeps_the_listing() {
        let payload: SearchPayload = serde_json::from_value(json!({
            "results": [
                { "id": 1, "title": "Alien" },
                { "id": 2, "title": 42, "vote_average": "7.5", "release_date": null }
            ]
        }))
        .unwrap();

        let results = payload.results.unwrap();
        assert_eq!(results.len(), 2);
        let odd = &results[1];
        assert_eq!(odd.title, None);
        assert_eq!(odd.vote_average, None);
        assert_eq!(odd.rating_label(), "N/A");
        assert_eq!(odd.extra.get("title"), Some(&json!(42)));
        assert_eq!(odd.extra.get("vote_average"), Some(&json!("7.5")));

        let back = serde_json::to_value(odd).unwrap();
        assert_eq!(back["vote_average"], json!("7.5"));
        assert_eq!(back["release_date"], Value::Null);
    }

    #[test]
    fn integer_rating_still_reads_as_number() {
        let movie: Movie = serde_json::from_value(json!({ "id": 5, "vote_average": 8 })).unwrap();
        assert_eq!(movie.rating_label(), "8.0");
        assert!(movie.extra.is_empty());
    }

    #[test]
    fn non_string_response_flag_is_not_a_failure() {
        let payload: SearchPayload = serde_json::from_value(json!({
            "results": [{ "id": 1 }],
            "response": true,
            "total_results": "many"
        }))
        .unwrap();
        assert!(!payload.is_logical_failure());
        assert_eq!(payload.total_results, None);
        assert_eq!(payload.results.map(|r| r.len()), Some(1));
    }

    #[test]
    fn record_without_id_is_rejected() {
        assert!(serde_json::from_value::<Movie>(json!({ "title": "Nameless" })).is_err());
    }

    #[test]
    fn client_rejects_bad_base_url() {
        let cfg = ApiConfig::default().with_base_url("ftp://nope");
        assert!(matches!(TmdbClient::new(cfg), Err(CineSearchError::Config(_))));
    }
}
