//! Letterboxd watchlist scraping: page fetch, record extraction, pagination.

pub mod client;
pub mod error;
pub mod pagination;
pub mod parse;

pub use client::{PageFetch, WatchlistClient};
pub use error::ScraperError;
pub use pagination::{PaginationSettings, PaginationStop, WatchlistScrape};
pub use parse::{extract_records, WatchlistPage};
