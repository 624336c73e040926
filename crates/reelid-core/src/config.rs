use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Desktop Chrome user agent; the listing site turns away obvious bots.
pub const DEFAULT_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let tmdb_api_key = require("TMDB_API_KEY")?;

    let env = parse_environment(&or_default("REELID_ENV", "development"))?;

    let bind_addr = or_default("REELID_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("REELID_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("REELID_LOG_LEVEL", "info");

    let listing_base_url = or_default("REELID_LISTING_BASE_URL", "https://letterboxd.com");
    let tmdb_base_url = or_default("REELID_TMDB_BASE_URL", "https://api.themoviedb.org/3");
    let scraper_user_agent = or_default("REELID_SCRAPER_USER_AGENT", DEFAULT_BROWSER_USER_AGENT);
    let request_timeout_secs = parse_u64("REELID_REQUEST_TIMEOUT_SECS", "30")?;

    let max_pages = parse_u32("REELID_MAX_PAGES", "50")?;
    if max_pages == 0 {
        return Err(invalid("REELID_MAX_PAGES", "must be at least 1".to_string()));
    }
    let page_delay_ms = parse_u64("REELID_PAGE_DELAY_MS", "100")?;

    let tmdb_max_attempts = parse_u32("REELID_TMDB_MAX_ATTEMPTS", "3")?;
    if tmdb_max_attempts == 0 {
        return Err(invalid(
            "REELID_TMDB_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let tmdb_retry_delay_ms = parse_u64("REELID_TMDB_RETRY_DELAY_MS", "1000")?;

    let resolve_batch_size = parse_usize("REELID_RESOLVE_BATCH_SIZE", "10")?;
    if resolve_batch_size == 0 {
        return Err(invalid(
            "REELID_RESOLVE_BATCH_SIZE",
            "must be at least 1".to_string(),
        ));
    }
    let batch_pause_ms = parse_u64("REELID_BATCH_PAUSE_MS", "500")?;

    let refiner_api_key = lookup("REELID_REFINER_API_KEY")
        .or_else(|_| lookup("OPENAI_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty());
    let refiner_base_url = or_default("REELID_REFINER_BASE_URL", "https://api.openai.com/v1");
    let refiner_model = or_default("REELID_REFINER_MODEL", "gpt-4o-mini");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        listing_base_url,
        tmdb_base_url,
        tmdb_api_key,
        scraper_user_agent,
        request_timeout_secs,
        max_pages,
        page_delay_ms,
        tmdb_max_attempts,
        tmdb_retry_delay_ms,
        resolve_batch_size,
        batch_pause_ms,
        refiner_api_key,
        refiner_base_url,
        refiner_model,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REELID_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
