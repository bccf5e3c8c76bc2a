//! Capture domain module

mod artifact;
mod kind;
mod lifecycle;
mod session;

pub use artifact::{CapturedArtifact, MediaMimeType};
pub use kind::{CaptureKind, DeviceLifecycle, DeviceRequest, FacingMode};
pub use lifecycle::{CaptureLifecycle, CaptureState, InvalidStateTransition};
pub use session::RecordingSession;
