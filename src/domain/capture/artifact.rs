//! Captured artifact value object

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use uuid::Uuid;

use super::kind::CaptureKind;
use crate::domain::error::InvalidMediaTypeError;

/// Content types a capture can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaMimeType {
    AudioWebm,
    VideoWebm,
    /// Streaming PCM16 WAV from the native microphone adapter
    AudioWav,
}

impl MediaMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AudioWebm => "audio/webm",
            Self::VideoWebm => "video/webm",
            Self::AudioWav => "audio/wav",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::AudioWebm | Self::VideoWebm => "webm",
            Self::AudioWav => "wav",
        }
    }

    /// Medium this content type carries
    pub const fn kind(&self) -> CaptureKind {
        match self {
            Self::AudioWebm | Self::AudioWav => CaptureKind::Audio,
            Self::VideoWebm => CaptureKind::Video,
        }
    }

    /// Guess a content type from a file extension and the intended medium
    pub fn from_extension(extension: &str, kind: CaptureKind) -> Option<Self> {
        match (extension.to_lowercase().as_str(), kind) {
            ("webm", CaptureKind::Audio) => Some(Self::AudioWebm),
            ("webm", CaptureKind::Video) => Some(Self::VideoWebm),
            ("wav", CaptureKind::Audio) => Some(Self::AudioWav),
            _ => None,
        }
    }
}

impl fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaMimeType {
    type Err = InvalidMediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio/webm" => Ok(Self::AudioWebm),
            "video/webm" => Ok(Self::VideoWebm),
            "audio/wav" | "audio/wave" | "audio/x-wav" => Ok(Self::AudioWav),
            _ => Err(InvalidMediaTypeError {
                input: s.to_string(),
            }),
        }
    }
}

/// Finished recording: immutable bytes plus a content type tag.
///
/// Cloning is cheap; the payload is reference counted.
#[derive(Debug, Clone)]
pub struct CapturedArtifact {
    id: Uuid,
    data: Bytes,
    mime_type: MediaMimeType,
}

impl CapturedArtifact {
    /// Create an artifact from its bytes
    pub fn new(data: impl Into<Bytes>, mime_type: MediaMimeType) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: data.into(),
            mime_type,
        }
    }

    /// Unique id of this artifact
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the raw bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume and return the raw bytes
    pub fn into_data(self) -> Bytes {
        self.data
    }

    pub fn mime_type(&self) -> MediaMimeType {
        self.mime_type
    }

    pub fn kind(&self) -> CaptureKind {
        self.mime_type.kind()
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Object name used when uploading to storage
    pub fn object_name(&self) -> String {
        format!("{}.{}", self.id, self.mime_type.extension())
    }
}
