use crate::config::types::{Config, PacingConfig, QueueConfig, SearchConfig, SyncConfig};
use crate::storage::{column_index, RangeSpec};
use crate::url::spreadsheet_id_from_input;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_queue_config(&config.queue)?;
    validate_search_config(&config.search)?;
    validate_pacing_config(&config.pacing)?;
    validate_sync_config(&config.sync)?;
    Ok(())
}

/// Validates the work-queue location and column layout
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    spreadsheet_id_from_input(&config.spreadsheet).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid spreadsheet '{}': {}", config.spreadsheet, e))
    })?;

    if config.sheet.trim().is_empty() {
        return Err(ConfigError::Validation("sheet cannot be empty".to_string()));
    }

    let range = RangeSpec::parse(&config.sheet, &config.columns)
        .map_err(|e| ConfigError::Validation(format!("Invalid columns: {}", e)))?;

    let named = [
        ("url-column", &config.url_column),
        ("result-column", &config.result_column),
        ("status-column", &config.status_column),
        ("name-column", &config.name_column),
    ];
    for (key, letter) in named {
        let index = column_index(letter).ok_or_else(|| {
            ConfigError::Validation(format!("{} must be a column letter, got '{}'", key, letter))
        })?;
        if !range.contains_column(index) {
            return Err(ConfigError::Validation(format!(
                "{} '{}' lies outside columns {}",
                key, letter, config.columns
            )));
        }
    }

    // The name column may share a cell with anything; the three working columns may not
    let url = column_index(&config.url_column);
    let result = column_index(&config.result_column);
    let status = column_index(&config.status_column);
    if url == result || url == status || result == status {
        return Err(ConfigError::Validation(
            "url-column, result-column and status-column must be distinct".to_string(),
        ));
    }

    Ok(())
}

/// Validates keyword and walk bounds
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if !config.keyword.split(',').any(|term| !term.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keyword must contain at least one non-empty term".to_string(),
        ));
    }

    if config.window_days < 1 {
        return Err(ConfigError::Validation(format!(
            "window-days must be >= 1, got {}",
            config.window_days
        )));
    }

    if config.post_cap < 1 {
        return Err(ConfigError::Validation(format!(
            "post-cap must be >= 1, got {}",
            config.post_cap
        )));
    }

    if config.pinned_posts >= config.post_cap {
        return Err(ConfigError::Validation(format!(
            "pinned-posts ({}) must be less than post-cap ({})",
            config.pinned_posts, config.post_cap
        )));
    }

    Ok(())
}

/// Validates the delay and break ranges
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay-min-ms ({}) must be <= delay-max-ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.break_every_min < 1 {
        return Err(ConfigError::Validation(
            "break-every-min must be >= 1".to_string(),
        ));
    }

    if config.break_every_min > config.break_every_max {
        return Err(ConfigError::Validation(format!(
            "break-every-min ({}) must be <= break-every-max ({})",
            config.break_every_min, config.break_every_max
        )));
    }

    if config.break_min_secs > config.break_max_secs {
        return Err(ConfigError::Validation(format!(
            "break-min-secs ({}) must be <= break-max-secs ({})",
            config.break_min_secs, config.break_max_secs
        )));
    }

    if config.countdown_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "countdown-interval-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the write-back retry policy
fn validate_sync_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if !config.multiplier.is_finite() || config.multiplier < 1.0 {
        return Err(ConfigError::Validation(format!(
            "multiplier must be a finite number >= 1.0, got {}",
            config.multiplier
        )));
    }

    Ok(())
}
