//! Synthetic capture devices
//!
//! Hardware-free stand-in for a microphone or camera. A [`SyntheticProbe`]
//! lets tests drive the device: refuse access, push fragments, revoke the
//! device mid-session and count live tracks. With a generator attached the
//! device also produces media on its own (a 440 Hz tone as streaming WAV, or
//! gradient frames for video), which is what the CLI uses for demos.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::wav;
use crate::application::ports::{
    DeviceError, DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, RecorderEventSender,
};
use crate::domain::capture::{CaptureKind, DeviceRequest};

/// Sample rate of the generated tone
pub const SYNTHETIC_SAMPLE_RATE: u32 = 16_000;

/// Frame size of the generated video
pub const SYNTHETIC_FRAME_SIZE: (u32, u32) = (64, 48);

const TONE_HZ: f64 = 440.0;

#[derive(Debug, Default)]
struct Shared {
    refusal: Option<DeviceError>,
    live_tracks: usize,
    opened: usize,
    recorder: Option<RecorderEventSender>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Synthetic device provider
#[derive(Debug, Clone, Default)]
pub struct SyntheticDevices {
    shared: Arc<Mutex<Shared>>,
    generator_period: Option<StdDuration>,
}

impl SyntheticDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce one generated fragment per `period` while recording
    pub fn with_generator(mut self, period: StdDuration) -> Self {
        self.generator_period = Some(period);
        self
    }

    /// Handle for observing and driving devices opened by this provider
    pub fn probe(&self) -> SyntheticProbe {
        SyntheticProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

#[async_trait]
impl MediaDevices for SyntheticDevices {
    async fn open(&self, request: DeviceRequest) -> Result<Box<dyn DeviceStream>, DeviceError> {
        let mut shared = lock(&self.shared);
        if let Some(refusal) = shared.refusal.clone() {
            tracing::debug!("synthetic device refused: {}", refusal);
            return Err(refusal);
        }

        let tracks = request.track_count();
        shared.opened += 1;
        shared.live_tracks += tracks;

        let kind = if request.video {
            CaptureKind::Video
        } else {
            CaptureKind::Audio
        };
        tracing::debug!(%kind, tracks, "synthetic device opened");

        Ok(Box::new(SyntheticStream {
            kind,
            tracks,
            shared: Arc::clone(&self.shared),
            generator_period: self.generator_period,
        }))
    }
}

/// Test handle onto a [`SyntheticDevices`] provider
#[derive(Debug, Clone)]
pub struct SyntheticProbe {
    shared: Arc<Mutex<Shared>>,
}

impl SyntheticProbe {
    /// Make every following `open` fail with `error`
    pub fn refuse(&self, error: DeviceError) {
        lock(&self.shared).refusal = Some(error);
    }

    /// Grant access again after [`Self::refuse`]
    pub fn allow(&self) {
        lock(&self.shared).refusal = None;
    }

    /// Push a fragment to the running recorder. `false` when none runs.
    pub fn emit(&self, fragment: &[u8]) -> bool {
        let shared = lock(&self.shared);
        shared.recorder.as_ref().is_some_and(|tx| {
            tx.send(RecorderEvent::Data(Bytes::copy_from_slice(fragment)))
                .is_ok()
        })
    }

    /// Simulate the platform revoking the device mid-session
    pub fn lose_device(&self, reason: &str) -> bool {
        let mut shared = lock(&self.shared);
        shared.live_tracks = 0;
        match shared.recorder.take() {
            Some(tx) => tx.send(RecorderEvent::DeviceLost(reason.to_string())).is_ok(),
            None => false,
        }
    }

    /// Tracks currently open across all streams
    pub fn live_tracks(&self) -> usize {
        lock(&self.shared).live_tracks
    }

    /// Number of granted device requests
    pub fn opened(&self) -> usize {
        lock(&self.shared).opened
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.shared).recorder.is_some()
    }
}

struct SyntheticStream {
    kind: CaptureKind,
    tracks: usize,
    shared: Arc<Mutex<Shared>>,
    generator_period: Option<StdDuration>,
}

impl DeviceStream for SyntheticStream {
    fn kind(&self) -> CaptureKind {
        self.kind
    }

    fn record(&mut self, events: RecorderEventSender) -> Result<Box<dyn MediaRecorder>, DeviceError> {
        if self.tracks == 0 {
            return Err(DeviceError::Failed("stream already stopped".to_string()));
        }

        lock(&self.shared).recorder = Some(events.clone());
        let generator = self
            .generator_period
            .map(|period| spawn_generator(self.kind, period, events));

        Ok(Box::new(SyntheticRecorder {
            shared: Arc::clone(&self.shared),
            generator,
        }))
    }

    fn stop_tracks(&mut self) {
        if self.tracks == 0 {
            return;
        }
        let mut shared = lock(&self.shared);
        shared.live_tracks = shared.live_tracks.saturating_sub(self.tracks);
        shared.recorder = None;
        self.tracks = 0;
    }

    fn is_live(&self) -> bool {
        self.tracks > 0
    }
}

struct SyntheticRecorder {
    shared: Arc<Mutex<Shared>>,
    generator: Option<JoinHandle<()>>,
}

impl MediaRecorder for SyntheticRecorder {
    fn stop(&mut self) {
        if let Some(task) = self.generator.take() {
            task.abort();
        }
        if let Some(tx) = lock(&self.shared).recorder.take() {
            let _ = tx.send(RecorderEvent::Stopped);
        }
    }
}

impl Drop for SyntheticRecorder {
    fn drop(&mut self) {
        if let Some(task) = self.generator.take() {
            task.abort();
        }
    }
}

fn spawn_generator(
    kind: CaptureKind,
    period: StdDuration,
    events: RecorderEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if kind == CaptureKind::Audio {
            let header = wav::streaming_header(SYNTHETIC_SAMPLE_RATE, 1);
            if events.send(RecorderEvent::Data(header)).is_err() {
                return;
            }
        }

        let samples = (u128::from(SYNTHETIC_SAMPLE_RATE) * period.as_millis() / 1000) as usize;
        let (width, height) = SYNTHETIC_FRAME_SIZE;
        let mut interval = interval_at(Instant::now() + period, period);
        let mut index = 0u64;

        loop {
            interval.tick().await;
            let fragment = match kind {
                CaptureKind::Audio => tone_fragment(index, samples),
                CaptureKind::Video => gradient_frame(index, width, height),
            };
            if events.send(RecorderEvent::Data(fragment)).is_err() {
                break;
            }
            index += 1;
        }
    })
}

/// PCM16 mono slice of a continuous 440 Hz tone
pub fn tone_fragment(index: u64, samples: usize) -> Bytes {
    let offset = index * samples as u64;
    let rate = f64::from(SYNTHETIC_SAMPLE_RATE);
    let pcm: Vec<i16> = (0..samples as u64)
        .map(|i| {
            let t = (offset + i) as f64 / rate;
            ((2.0 * std::f64::consts::PI * TONE_HZ * t).sin() * 0.3 * f64::from(i16::MAX)) as i16
        })
        .collect();
    wav::pcm16_bytes(&pcm)
}

/// RGB24 gradient that shifts every frame
pub fn gradient_frame(index: u64, width: u32, height: u32) -> Bytes {
    let base = (index % 256) as u8;
    let mut data = BytesMut::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                base.wrapping_add((x % 256) as u8),
                base.wrapping_add((y % 256) as u8),
                base.wrapping_add(((x + y) % 256) as u8),
            ]);
        }
    }
    data.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::FacingMode;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn refusal_is_reported() {
        let devices = SyntheticDevices::new();
        devices
            .probe()
            .refuse(DeviceError::PermissionDenied("denied".into()));

        let result = devices
            .open(DeviceRequest::for_kind(CaptureKind::Audio, FacingMode::User))
            .await;
        assert!(matches!(result, Err(DeviceError::PermissionDenied(_))));
        assert_eq!(devices.probe().opened(), 0);
    }

    #[tokio::test]
    async fn video_request_opens_two_tracks() {
        let devices = SyntheticDevices::new();
        let probe = devices.probe();
        let mut stream = devices
            .open(DeviceRequest::for_kind(CaptureKind::Video, FacingMode::User))
            .await
            .unwrap();

        assert_eq!(stream.kind(), CaptureKind::Video);
        assert_eq!(probe.live_tracks(), 2);

        stream.stop_tracks();
        stream.stop_tracks();
        assert_eq!(probe.live_tracks(), 0);
        assert!(!stream.is_live());
    }

    #[tokio::test]
    async fn recorder_emits_then_stops() {
        let devices = SyntheticDevices::new();
        let probe = devices.probe();
        let mut stream = devices
            .open(DeviceRequest::for_kind(CaptureKind::Audio, FacingMode::User))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut recorder = stream.record(tx).unwrap();
        assert!(probe.emit(b"abc"));
        recorder.stop();
        assert!(!probe.emit(b"late"));

        assert_eq!(
            rx.recv().await,
            Some(RecorderEvent::Data(Bytes::from_static(b"abc")))
        );
        assert_eq!(rx.recv().await, Some(RecorderEvent::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn generator_emits_header_then_tone() {
        let devices = SyntheticDevices::new().with_generator(StdDuration::from_millis(250));
        let mut stream = devices
            .open(DeviceRequest::for_kind(CaptureKind::Audio, FacingMode::User))
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _recorder = stream.record(tx).unwrap();

        match rx.recv().await {
            Some(RecorderEvent::Data(header)) => assert_eq!(&header[..4], b"RIFF"),
            other => panic!("expected header, got {other:?}"),
        }
        match rx.recv().await {
            // 250 ms at 16 kHz, two bytes per sample
            Some(RecorderEvent::Data(pcm)) => assert_eq!(pcm.len(), 4_000 * 2),
            other => panic!("expected pcm, got {other:?}"),
        }
    }

    #[test]
    fn gradient_frames_differ() {
        let a = gradient_frame(0, 8, 8);
        let b = gradient_frame(1, 8, 8);
        assert_eq!(a.len(), 8 * 8 * 3);
        assert_ne!(a, b);
    }
}
