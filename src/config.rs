use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::search_client::ClientOptions;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://search.wb.ru/exactmatch/ru/common/v5/search";

/// Longest query the upstream search accepts.
pub const MAX_QUERY_LENGTH: usize = 300;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        search_endpoint: get_env_or_default("WB_SEARCH_ENDPOINT", DEFAULT_SEARCH_ENDPOINT),
        max_retries: get_env_parsed_or_default("WB_MAX_RETRIES", 10),
        max_pages: get_env_parsed_or_default("WB_MAX_PAGES", 50),
        page_item_count: get_env_parsed_or_default("WB_PAGE_ITEM_COUNT", 100),
        retry_delay_ms: get_env_parsed_or_default("WB_RETRY_DELAY_MS", 200),
        request_timeout_secs: get_env_parsed_or_default("WB_REQUEST_TIMEOUT_SECS", 10),
        search_timeout_secs: get_env_parsed_or_default("WB_SEARCH_TIMEOUT_SECS", 60),
        server_addr: get_env_or_default("SERVER_ADDR", "0.0.0.0:3000"),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub search_endpoint: String,
    pub max_retries: u32,
    pub max_pages: u32,
    pub page_item_count: u32,
    pub retry_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub server_addr: String,
}

impl Config {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self.search_endpoint.clone(),
            max_retries: self.max_retries,
            max_pages: self.max_pages,
            page_item_count: self.page_item_count,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}
