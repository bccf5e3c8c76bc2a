//! Recording time value objects

mod duration;

pub use duration::{format_elapsed, Duration, DEFAULT_MAX_DURATION_SECS, DEFAULT_RECORD_DURATION_SECS};
