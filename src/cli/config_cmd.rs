//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::capture::FacingMode;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;
    let value = validate_config_value(key, value)?;

    let mut config = store.load().await?;
    *field_mut(&mut config, key) = Some(value.clone());
    store.save(&config).await?;

    let shown = if key == "api_key" {
        mask_api_key(&value)
    } else {
        value
    };
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;
    let config = store.load().await?;
    presenter.output(&display_value(&config, key));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, &display_value(&config, key));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn field(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "backend_url" => config.backend_url.clone(),
        "api_key" => config.api_key.clone(),
        "bucket" => config.bucket.clone(),
        "table" => config.table.clone(),
        "max_duration" => config.max_duration.clone(),
        "facing_mode" => config.facing_mode.clone(),
        "share_origin" => config.share_origin.clone(),
        _ => None,
    }
}

fn field_mut<'a>(config: &'a mut AppConfig, key: &str) -> &'a mut Option<String> {
    match key {
        "backend_url" => &mut config.backend_url,
        "api_key" => &mut config.api_key,
        "bucket" => &mut config.bucket,
        "table" => &mut config.table,
        "max_duration" => &mut config.max_duration,
        "facing_mode" => &mut config.facing_mode,
        _ => &mut config.share_origin,
    }
}

/// Value as shown to the user, with the API key masked
fn display_value(config: &AppConfig, key: &str) -> String {
    match (key, field(config, key)) {
        (_, None) => NOT_SET.to_string(),
        ("api_key", Some(v)) => mask_api_key(&v),
        (_, Some(v)) => v,
    }
}

/// Validate a config value and return it in stored form
fn validate_config_value(key: &str, value: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let value = value.trim();

    match key {
        "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "facing_mode" => {
            let mode = value
                .parse::<FacingMode>()
                .map_err(|e| invalid(e.to_string()))?;
            return Ok(mode.to_string());
        }
        "backend_url" | "share_origin" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(
                    "Value must be an http:// or https:// URL".to_string(),
                ));
            }
            return Ok(value.trim_end_matches('/').to_string());
        }
        "bucket" | "table" => {
            if value.is_empty() || value.contains('/') || value.contains(char::is_whitespace) {
                return Err(invalid(
                    "Value must be a non-empty name without '/' or spaces".to_string(),
                ));
            }
        }
        _ => {
            if value.is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
        }
    }
    Ok(value.to_string())
}

/// Mask API key for display (show first 4 and last 4 chars)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
