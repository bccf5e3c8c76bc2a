//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod media_devices;
pub mod media_element;
pub mod testimonial_store;

// Re-export common types
pub use config::ConfigStore;
pub use media_devices::{
    DeviceError, DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, RecorderEventReceiver,
    RecorderEventSender,
};
pub use media_element::{MediaElement, MediaSource, PlaybackError};
pub use testimonial_store::{ListFilter, NewTestimonial, SubmissionError, TestimonialStore};
