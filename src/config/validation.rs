use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the mirrored host
///
/// The host is used verbatim as a substring in admission decisions and as the
/// authority of every request, so it must be a bare `host[:port]`.
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    let host = config.host.as_str();

    if host.is_empty() {
        return Err(ConfigError::InvalidHost("host cannot be empty".to_string()));
    }

    if host.contains("://") {
        return Err(ConfigError::InvalidHost(format!(
            "host '{}' must not include a scheme; use the protocol setting",
            host
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':')
    {
        return Err(ConfigError::InvalidHost(format!(
            "host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') {
        return Err(ConfigError::InvalidHost(format!(
            "host '{}' cannot start or end with '.' or start with '-'",
            host
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_connections < 1 || config.max_connections > 100 {
        return Err(ConfigError::Validation(format!(
            "max_connections must be between 1 and 100, got {}",
            config.max_connections
        )));
    }

    if config.tick_interval_ms < 1 {
        return Err(ConfigError::Validation(
            "tick_interval_ms must be >= 1".to_string(),
        ));
    }

    if config.idle_ticks < 1 {
        return Err(ConfigError::Validation(
            "idle_ticks must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
