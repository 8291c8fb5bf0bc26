pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod fetcher;
pub mod request;
pub mod search_client;
pub mod service;

pub use data_models::{Product, ProductRankResult};
pub use error::{RankError, Result};
pub use search_client::{ClientOptions, WbSearchClient};
