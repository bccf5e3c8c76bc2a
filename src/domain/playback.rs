//! Playback value objects

use std::fmt;

use uuid::Uuid;

/// Playback states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    pub fn is_playing(&self) -> bool {
        *self == Self::Playing
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Short-lived, revocable reference to an in-memory artifact (`blob:` URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransientUrl(String);

impl TransientUrl {
    /// Mint a fresh reference
    pub fn mint() -> Self {
        Self(format!("blob:echo-capture/{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransientUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
