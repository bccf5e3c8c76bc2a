//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::FacingMode;
use crate::domain::recording::Duration;

/// Default storage bucket for uploaded recordings
pub const DEFAULT_BUCKET: &str = "testimonial-media";

/// Default table holding testimonial rows
pub const DEFAULT_TABLE: &str = "testimonials";

/// Default origin used for shareable form links
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:8080";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: Option<String>,
    pub table: Option<String>,
    pub max_duration: Option<String>,
    pub facing_mode: Option<String>,
    pub share_origin: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            backend_url: None,
            api_key: None,
            bucket: Some(DEFAULT_BUCKET.to_string()),
            table: Some(DEFAULT_TABLE.to_string()),
            max_duration: Some("5m".to_string()),
            facing_mode: Some("user".to_string()),
            share_origin: Some(DEFAULT_SHARE_ORIGIN.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend_url: other.backend_url.or(self.backend_url),
            api_key: other.api_key.or(self.api_key),
            bucket: other.bucket.or(self.bucket),
            table: other.table.or(self.table),
            max_duration: other.max_duration.or(self.max_duration),
            facing_mode: other.facing_mode.or(self.facing_mode),
            share_origin: other.share_origin.or(self.share_origin),
        }
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get facing mode, or `user` if not set/invalid
    pub fn facing_mode_or_default(&self) -> FacingMode {
        self.facing_mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn bucket_or_default(&self) -> &str {
        self.bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }

    pub fn table_or_default(&self) -> &str {
        self.table.as_deref().unwrap_or(DEFAULT_TABLE)
    }

    pub fn share_origin_or_default(&self) -> &str {
        self.share_origin.as_deref().unwrap_or(DEFAULT_SHARE_ORIGIN)
    }
}
