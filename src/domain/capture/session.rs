//! Recording session entity

use bytes::{Bytes, BytesMut};

use super::artifact::{CapturedArtifact, MediaMimeType};

/// In-progress state between `start()` and `stop()`.
///
/// Fragments are kept in arrival order and only concatenated once, when the
/// session is finalized.
#[derive(Debug, Default)]
pub struct RecordingSession {
    active: bool,
    elapsed_secs: u64,
    chunks: Vec<Bytes>,
}

impl RecordingSession {
    /// Open a new, active session with a zeroed counter
    pub fn open() -> Self {
        Self {
            active: true,
            elapsed_secs: 0,
            chunks: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Number of buffered fragments
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total buffered bytes
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    /// Buffer a fragment. Empty fragments and fragments arriving after the
    /// session closed are dropped. Returns whether it was kept.
    pub fn push_fragment(&mut self, fragment: Bytes) -> bool {
        if !self.active || fragment.is_empty() {
            return false;
        }
        self.chunks.push(fragment);
        true
    }

    /// Advance the elapsed counter by one second
    pub fn tick(&mut self) -> u64 {
        if self.active {
            self.elapsed_secs += 1;
        }
        self.elapsed_secs
    }

    /// Raise the elapsed counter to `secs` if it lags behind
    pub fn catch_up(&mut self, secs: u64) -> u64 {
        if self.active && secs > self.elapsed_secs {
            self.elapsed_secs = secs;
        }
        self.elapsed_secs
    }

    /// Close the session and assemble its fragments into one artifact
    pub fn finalize(&mut self, mime_type: MediaMimeType) -> CapturedArtifact {
        self.active = false;
        let chunks = std::mem::take(&mut self.chunks);
        let data = match chunks.len() {
            0 => Bytes::new(),
            1 => chunks.into_iter().next().unwrap_or_default(),
            _ => {
                let mut buf = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
                for chunk in chunks {
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        };
        CapturedArtifact::new(data, mime_type)
    }

    /// Close the session, discarding buffered fragments
    pub fn discard(&mut self) {
        self.active = false;
        self.chunks.clear();
    }
}
