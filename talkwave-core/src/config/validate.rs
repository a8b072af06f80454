//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let endpoint = config.client.endpoint.trim();
    if endpoint.is_empty() {
        errors.push("client.endpoint must not be empty".to_string());
    } else if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
        errors.push("client.endpoint must start with ws:// or wss://".to_string());
    }
    if config.client.display_name.trim().is_empty() {
        errors.push("client.display_name must not be empty".to_string());
    }
    if config.client.data_dir.trim().is_empty() {
        errors.push("client.data_dir must not be empty".to_string());
    }
    if let Some(path) = &config.client.responses_path {
        if path.trim().is_empty() {
            errors.push("client.responses_path must not be blank when set".to_string());
        }
    }

    if config.broker.host.trim().is_empty() {
        errors.push("broker.host must not be empty".to_string());
    }
    if config.broker.port == 0 {
        errors.push("broker.port must be > 0".to_string());
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(format!(
            "logging.level must be one of trace, debug, info, warn, error (got '{}')",
            config.logging.level
        ));
    }
    let format = config.logging.format.to_ascii_lowercase();
    if format != "text" && format != "json" {
        errors.push(format!(
            "logging.format must be 'text' or 'json' (got '{}')",
            config.logging.format
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
