use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
///
/// Jackett host and API key are deliberately not required here: a missing
/// value is reported per request through the generator envelope.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().is_none_or(str::is_empty)
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key is required when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.fetch.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.max_attempts must be at least 1".to_string(),
        ));
    }

    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.timeout_secs cannot be 0".to_string(),
        ));
    }

    let host = config.jackett.host.trim();
    if !host.is_empty() && !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "jackett.host must start with http:// or https://, got {:?}",
            host
        )));
    }

    Ok(())
}
