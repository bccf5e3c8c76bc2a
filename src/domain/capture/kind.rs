//! Capture kind, device request and device lifecycle value objects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::artifact::MediaMimeType;
use crate::domain::error::{InvalidCaptureKindError, InvalidFacingModeError};

/// Medium captured by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Audio,
    Video,
}

impl CaptureKind {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Container the platform recorder produces for this kind
    pub const fn default_mime_type(&self) -> MediaMimeType {
        match self {
            Self::Audio => MediaMimeType::AudioWebm,
            Self::Video => MediaMimeType::VideoWebm,
        }
    }

    /// Audio releases the microphone after one take; video keeps the camera
    /// open so the user can re-record immediately.
    pub const fn default_lifecycle(&self) -> DeviceLifecycle {
        match self {
            Self::Audio => DeviceLifecycle::OneShot,
            Self::Video => DeviceLifecycle::Rearmable,
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureKind {
    type Err = InvalidCaptureKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            _ => Err(InvalidCaptureKindError {
                input: s.to_string(),
            }),
        }
    }
}

/// Camera facing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the person recording
    #[default]
    User,
    /// Rear camera
    Environment,
}

impl FacingMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = InvalidFacingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "environment" => Ok(Self::Environment),
            _ => Err(InvalidFacingModeError {
                input: s.to_string(),
            }),
        }
    }
}

/// What happens to the device handle after a completed take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceLifecycle {
    /// Release the device after every stop
    OneShot,
    /// Keep the device open after stop, ready for the next take
    Rearmable,
}

/// Request sent to the device API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRequest {
    pub audio: bool,
    pub video: bool,
    pub facing_mode: Option<FacingMode>,
}

impl DeviceRequest {
    /// Build the request for a capture kind.
    /// Video always captures audio as well.
    pub fn for_kind(kind: CaptureKind, facing_mode: FacingMode) -> Self {
        match kind {
            CaptureKind::Audio => Self {
                audio: true,
                video: false,
                facing_mode: None,
            },
            CaptureKind::Video => Self {
                audio: true,
                video: true,
                facing_mode: Some(facing_mode),
            },
        }
    }

    /// Number of tracks a granted stream carries
    pub fn track_count(&self) -> usize {
        usize::from(self.audio) + usize::from(self.video)
    }
}
