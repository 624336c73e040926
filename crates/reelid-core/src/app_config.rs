use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub listing_base_url: String,
    pub tmdb_base_url: String,
    pub tmdb_api_key: String,
    pub scraper_user_agent: String,
    pub request_timeout_secs: u64,
    pub max_pages: u32,
    pub page_delay_ms: u64,
    pub tmdb_max_attempts: u32,
    pub tmdb_retry_delay_ms: u64,
    pub resolve_batch_size: usize,
    pub batch_pause_ms: u64,
    pub refiner_api_key: Option<String>,
    pub refiner_base_url: String,
    pub refiner_model: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("listing_base_url", &self.listing_base_url)
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("tmdb_api_key", &"[redacted]")
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_pages", &self.max_pages)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("tmdb_max_attempts", &self.tmdb_max_attempts)
            .field("tmdb_retry_delay_ms", &self.tmdb_retry_delay_ms)
            .field("resolve_batch_size", &self.resolve_batch_size)
            .field("batch_pause_ms", &self.batch_pause_ms)
            .field(
                "refiner_api_key",
                &self.refiner_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("refiner_base_url", &self.refiner_base_url)
            .field("refiner_model", &self.refiner_model)
            .finish()
    }
}
