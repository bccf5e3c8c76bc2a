//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, DEFAULT_BUCKET, DEFAULT_SHARE_ORIGIN, DEFAULT_TABLE};
