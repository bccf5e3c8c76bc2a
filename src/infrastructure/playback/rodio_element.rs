//! Rodio-based media element
//!
//! Plays audio artifacts on the default output device. Video artifacts are
//! rejected as unsupported.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::application::ports::{MediaElement, MediaSource, PlaybackError};
use crate::domain::capture::{CaptureKind, MediaMimeType};
use crate::infrastructure::device::wav;

/// Audio sink bound to the default output device.
///
/// Holds the output stream for as long as the element lives, so it is not
/// `Send` and must stay on the thread that created it.
pub struct RodioElement {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioElement {
    /// Open the default output device
    pub fn try_default() -> Result<Self, PlaybackError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
        })
    }

    fn decoder(source: &MediaSource) -> Result<Decoder<Cursor<bytes::Bytes>>, PlaybackError> {
        let data = match source.mime_type {
            MediaMimeType::AudioWav => wav::finalize_wav(&source.data),
            _ => source.data.clone(),
        };
        Decoder::new(Cursor::new(data)).map_err(|e| PlaybackError::Unsupported {
            mime_type: source.mime_type.to_string(),
            message: e.to_string(),
        })
    }
}

impl MediaElement for RodioElement {
    fn load(&mut self, source: MediaSource) -> Result<(), PlaybackError> {
        if source.mime_type.kind() == CaptureKind::Video {
            return Err(PlaybackError::Unsupported {
                mime_type: source.mime_type.to_string(),
                message: "video playback needs a display".to_string(),
            });
        }

        let decoder = Self::decoder(&source)?;
        let sink =
            Sink::try_new(&self.handle).map_err(|e| PlaybackError::Failed(e.to_string()))?;
        sink.pause();
        sink.append(decoder);

        self.unload();
        self.sink = Some(sink);
        tracing::debug!(url = %source.url, "media loaded into output sink");
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| PlaybackError::Failed("nothing loaded".to_string()))?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn has_ended(&self) -> bool {
        self.sink.as_ref().map_or(true, Sink::empty)
    }
}
