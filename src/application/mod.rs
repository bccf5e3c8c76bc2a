//! Application layer - Use cases and port interfaces
//!
//! Contains the capture and playback controllers, the submission and
//! moderation use cases, and trait definitions for external systems.

pub mod capture;
pub mod moderation;
pub mod playback;
pub mod ports;
pub mod submit;
pub mod ticker;

// Re-export use cases
pub use capture::{
    ArtifactCallback, CaptureConfig, CaptureController, CaptureError, CaptureSummary,
    CaptureUpdate, DEFAULT_STOP_TIMEOUT,
};
pub use moderation::{ModerationError, ModerationUseCase};
pub use playback::{ObjectUrls, PlaybackController};
pub use submit::{SubmitError, SubmitTestimonialUseCase};
pub use ticker::{ElapsedTicker, TICK_PERIOD};
