//! Error taxonomy for product rank lookups.
//!
//! "Item not found" is not represented here: a search that completes without
//! locating the item returns `Ok(None)`.

/// Errors surfaced by a rank search.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Caller-supplied query or item id violates input constraints.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The first result page never produced a usable payload.
    #[error("search service is unavailable or returned malformed data")]
    General,

    /// The query has no results at all.
    #[error("no products found for this query")]
    NoProducts,

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl RankError {
    /// Stable identifier front-ends can map to their own messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::General => "GENERAL",
            Self::NoProducts => "NO_PRODUCTS",
            Self::Config(_) => "CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, RankError>;

/// A single failed attempt against the search endpoint.
///
/// These never leave the fetcher; they are logged and counted as one
/// consumed retry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode payload: {0}")]
    Decode(#[from] serde_json::Error),
}
