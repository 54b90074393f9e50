use crate::config::types::{
    ArchiveConfig, Config, CrawlerConfig, FetchConfig, SeedConfig, StorageConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_storage_config(&config.storage)?;
    validate_archive_config(&config.archive)?;
    validate_seed_config(&config.seeds)?;
    Ok(())
}

/// Validates worker and frontier sizing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.frontier_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "frontier_capacity must be >= 1, got {}",
            config.frontier_capacity
        )));
    }

    if config.wait_timeout_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout_ms must be >= 10ms, got {}ms",
            config.wait_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeouts must be >= 1s, got timeout={}s connect={}s",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    if config.documents_dir.is_empty() {
        return Err(ConfigError::Validation(
            "documents_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates inline seeds; a seed file is checked when it is read
fn validate_seed_config(config: &SeedConfig) -> Result<(), ConfigError> {
    if config.urls.is_empty() && config.file.is_none() {
        return Err(ConfigError::Validation(
            "at least one seed URL or a seed file is required".to_string(),
        ));
    }

    if matches!(&config.file, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "seed file path cannot be empty".to_string(),
        ));
    }

    for seed in &config.urls {
        validate_seed_url(seed)?;
    }

    Ok(())
}

/// Seeds must be absolute http(s) URLs
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use the http or https scheme",
            seed
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
