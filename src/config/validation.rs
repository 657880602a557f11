use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Largest page size the remote API accepts
pub const MAX_PAGE_SIZE: u32 = 200;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API access configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.api_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key cannot be empty (set it in [api] or pass --api-key)".to_string(),
        ));
    }

    if config.min_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "min_interval_ms must be >= 100ms, got {}ms",
            config.min_interval_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl policy configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.accept_field.is_empty() {
        return Err(ConfigError::Validation(
            "accept_field cannot be empty".to_string(),
        ));
    }

    if config.accept_value.is_empty() {
        return Err(ConfigError::Validation(
            "accept_value cannot be empty".to_string(),
        ));
    }

    if config.max_accepted < 1 {
        return Err(ConfigError::Validation(format!(
            "max_accepted must be >= 1, got {}",
            config.max_accepted
        )));
    }

    if config.history_page_size < 1 || config.history_page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "history_page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.history_page_size
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("names_path", &config.names_path),
        ("expanded_path", &config.expanded_path),
        ("scrobbles_path", &config.scrobbles_path),
        ("done_path", &config.done_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
