//! Capture device adapters

mod cpal_device;
mod synthetic;
pub mod wav;

pub use cpal_device::CpalDevices;
pub use synthetic::{
    gradient_frame, tone_fragment, SyntheticDevices, SyntheticProbe, SYNTHETIC_FRAME_SIZE,
    SYNTHETIC_SAMPLE_RATE,
};
