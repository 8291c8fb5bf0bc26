//! Request shaping for the search endpoint: query parameters, headers and
//! the per-search correlation id.
//!
//! Templates are plain values; every page request works on its own copy.

use std::fmt;

use chrono::Utc;
use nanoid::nanoid;
use serde::Serialize;

const DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Browser headers replayed on every search request.
const DEFAULT_SEARCH_HEADERS: &[(&str, &str)] = &[
    ("Accept", "*/*"),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Origin", "https://www.wildberries.ru"),
    ("Connection", "keep-alive"),
    ("Referer", "https://www.wildberries.ru/"),
    ("Sec-Fetch-Dest", "empty"),
    ("Sec-Fetch-Mode", "cors"),
    ("Sec-Fetch-Site", "cross-site"),
    ("Sec-GPC", "1"),
    ("Priority", "u=4"),
];

pub const QUERY_ID_HEADER: &str = "query_id";

/// Query parameters for one page request.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    ab_testing: bool,
    #[serde(rename = "appType")]
    app_type: u8,
    curr: &'static str,
    /// Delivery region (Moscow).
    dest: i64,
    resultset: &'static str,
    sort: &'static str,
    spp: u32,
    #[serde(rename = "suppressSpellcheck")]
    suppress_spellcheck: bool,
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
}

impl SearchParams {
    /// Parameters for `query`. With no page, the server answers with page 1.
    pub fn new(query: &str, page: Option<u32>) -> SearchParams {
        SearchParams {
            ab_testing: false,
            app_type: 1,
            curr: "rub",
            dest: -1257786,
            resultset: "catalog",
            sort: "popular",
            spp: 30,
            suppress_spellcheck: false,
            query: query.to_string(),
            page,
        }
    }

    /// Copy of these parameters pointing at `page`.
    pub fn with_page(&self, page: u32) -> SearchParams {
        SearchParams {
            page: Some(page),
            ..self.clone()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }
}

/// Header set shared by every page request of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHeaders {
    entries: Vec<(&'static str, String)>,
}

impl SearchHeaders {
    pub fn new(query_id: Option<&CorrelationId>) -> SearchHeaders {
        let mut entries: Vec<(&'static str, String)> = DEFAULT_SEARCH_HEADERS
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        if let Some(id) = query_id {
            entries.push((QUERY_ID_HEADER, id.as_str().to_string()));
        }
        SearchHeaders { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Opaque token tying together the page requests of one search.
///
/// Layout: `qid` + random digits + unix seconds + `%Y%m%d%H%M%S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> CorrelationId {
        let now = Utc::now();
        let random_part = nanoid!(10, &DIGITS);
        CorrelationId(format!(
            "qid{}{}{}",
            random_part,
            now.timestamp(),
            now.format("%Y%m%d%H%M%S")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
