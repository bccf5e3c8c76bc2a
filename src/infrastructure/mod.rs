//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: native and
//! synthetic capture devices, audio playback, the hosted backend client and
//! the config file store.

pub mod config;
pub mod device;
pub mod playback;
pub mod store;

// Re-export adapters
pub use config::XdgConfigStore;
pub use device::{CpalDevices, SyntheticDevices, SyntheticProbe};
pub use playback::RodioElement;
pub use store::RestTestimonialStore;
