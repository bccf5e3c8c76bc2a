//! Shared runner plumbing: exit codes, logging and configuration

use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::infrastructure::RestTestimonialStore;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "ECHO_LOG";

/// Environment variable overriding `backend_url`
pub const BACKEND_URL_ENV: &str = "ECHO_BACKEND_URL";

/// Environment variable overriding `api_key`
pub const API_KEY_ENV: &str = "ECHO_API_KEY";

const DEFAULT_LOG_FILTER: &str = "echo_capture=info";

/// Install the stderr log subscriber.
/// `--verbose` wins over `ECHO_LOG`, which wins over the default filter.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("echo_capture=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Config values taken from the environment
pub fn env_config() -> AppConfig {
    AppConfig {
        backend_url: env::var(BACKEND_URL_ENV).ok().filter(|s| !s.is_empty()),
        api_key: env::var(API_KEY_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

/// Load and merge configuration: defaults < file < env < cli
pub async fn load_merged_config<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = store.load_or_empty().await;

    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

/// Build the backend client from merged config
pub fn backend_store(config: &AppConfig) -> Result<RestTestimonialStore, String> {
    let backend_url = config.backend_url.as_deref().ok_or_else(|| {
        format!(
            "Missing backend URL. Set {} or run 'echo-capture config set backend_url <url>'",
            BACKEND_URL_ENV
        )
    })?;
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        format!(
            "Missing API key. Set {} or run 'echo-capture config set api_key <key>'",
            API_KEY_ENV
        )
    })?;

    Ok(RestTestimonialStore::new(backend_url, api_key)
        .with_bucket(config.bucket_or_default())
        .with_table(config.table_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_store_requires_url_and_key() {
        let missing_url = AppConfig {
            api_key: Some("key".into()),
            ..AppConfig::defaults()
        };
        assert!(backend_store(&missing_url)
            .unwrap_err()
            .contains("backend_url"));

        let missing_key = AppConfig {
            backend_url: Some("https://demo.supabase.co".into()),
            ..AppConfig::defaults()
        };
        assert!(backend_store(&missing_key).unwrap_err().contains("api_key"));

        let complete = AppConfig {
            backend_url: Some("https://demo.supabase.co".into()),
            api_key: Some("key".into()),
            ..AppConfig::defaults()
        };
        assert!(backend_store(&complete).is_ok());
    }
}
