//! Media element port interface

use bytes::Bytes;
use thiserror::Error;

use crate::domain::capture::MediaMimeType;
use crate::domain::playback::TransientUrl;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("No audio output device available: {0}")]
    OutputUnavailable(String),

    #[error("Unsupported media format {mime_type}: {message}")]
    Unsupported { mime_type: String, message: String },

    #[error("Playback failed: {0}")]
    Failed(String),
}

/// What a media element needs to load a source
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub url: TransientUrl,
    pub mime_type: MediaMimeType,
    pub data: Bytes,
}

/// Port for an element that plays media (an `<audio>`/`<video>` element, or
/// a native audio sink)
pub trait MediaElement {
    /// Bind a source, replacing whatever was bound before
    fn load(&mut self, source: MediaSource) -> Result<(), PlaybackError>;

    /// Start or resume playback of the bound source
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause, keeping the bound source
    fn pause(&mut self);

    /// Drop the bound source
    fn unload(&mut self);

    /// Whether the bound source has played through to its end
    fn has_ended(&self) -> bool;
}
