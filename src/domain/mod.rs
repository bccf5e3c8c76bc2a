//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod playback;
pub mod recording;
pub mod testimonial;

// Re-export common types
pub use capture::{CaptureKind, CaptureState, CapturedArtifact, MediaMimeType, RecordingSession};
pub use config::AppConfig;
pub use error::*;
pub use playback::{PlaybackState, TransientUrl};
pub use recording::Duration;
pub use testimonial::{MediaType, ModerationBoard, ShareLink, Testimonial, TestimonialForm};
