//! Capture controller state machine

use std::fmt;
use thiserror::Error;

use super::kind::DeviceLifecycle;

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    DeviceReady,
    Recording,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DeviceReady => "device ready",
            Self::Recording => "recording",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Capture lifecycle entity.
///
/// State machine:
///   IDLE -> DEVICE_READY (activate)
///   DEVICE_READY -> IDLE (deactivate)
///   DEVICE_READY -> RECORDING (start)
///   RECORDING -> DEVICE_READY (stop, rearmable device)
///   RECORDING -> IDLE (stop, one-shot device)
///   any -> IDLE (release: deactivate, device loss, teardown)
#[derive(Debug, Default)]
pub struct CaptureLifecycle {
    state: CaptureState,
}

impl CaptureLifecycle {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    pub fn is_device_ready(&self) -> bool {
        self.state == CaptureState::DeviceReady
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Transition from IDLE to DEVICE_READY
    pub fn activate(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Idle {
            return Err(self.invalid("activate the device"));
        }
        self.state = CaptureState::DeviceReady;
        Ok(())
    }

    /// Transition from DEVICE_READY to RECORDING
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::DeviceReady {
            return Err(self.invalid("start recording"));
        }
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Transition out of RECORDING; where to depends on the device lifecycle
    pub fn stop(&mut self, lifecycle: DeviceLifecycle) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Recording {
            return Err(self.invalid("stop recording"));
        }
        self.state = match lifecycle {
            DeviceLifecycle::OneShot => CaptureState::Idle,
            DeviceLifecycle::Rearmable => CaptureState::DeviceReady,
        };
        Ok(())
    }

    /// Return to IDLE from any state
    pub fn release(&mut self) {
        self.state = CaptureState::Idle;
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}
