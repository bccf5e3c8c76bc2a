//! Capture controller use case
//!
//! Owns one device handle, one recording session and one ticker for a single
//! medium. Every resource it acquires is released on `stop` (one-shot
//! devices), `deactivate`, device loss, `dispose` and `Drop`.

use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::capture::{
    CaptureKind, CaptureLifecycle, CaptureState, CapturedArtifact, DeviceLifecycle, DeviceRequest,
    FacingMode, InvalidStateTransition, MediaMimeType, RecordingSession,
};

use super::ports::{
    DeviceError, DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, RecorderEventReceiver,
};
use super::ticker::{ElapsedTicker, TICK_PERIOD};

/// How long `stop()` waits for the recorder's terminal event
pub const DEFAULT_STOP_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Receives every finished artifact; ownership passes to the callee
pub type ArtifactCallback = Box<dyn FnMut(CapturedArtifact) + Send>;

/// Errors from the capture controller
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Permission to use the {kind} device was denied: {message}")]
    PermissionDenied { kind: CaptureKind, message: String },

    #[error("No {kind} device available: {message}")]
    HardwareUnavailable { kind: CaptureKind, message: String },

    #[error("The {kind} device failed: {message}")]
    DeviceFailed { kind: CaptureKind, message: String },

    #[error("The {kind} device was lost while recording: {message}")]
    DeviceLost { kind: CaptureKind, message: String },

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}

impl CaptureError {
    fn from_device(kind: CaptureKind, error: DeviceError) -> Self {
        match error {
            DeviceError::PermissionDenied(message) => Self::PermissionDenied { kind, message },
            DeviceError::HardwareUnavailable(message) => Self::HardwareUnavailable { kind, message },
            DeviceError::Failed(message) => Self::DeviceFailed { kind, message },
        }
    }
}

/// Per-controller configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub kind: CaptureKind,
    /// Whether the device stays open after a completed take
    pub lifecycle: DeviceLifecycle,
    /// Content type tag put on finished artifacts
    pub mime_type: MediaMimeType,
    pub facing_mode: FacingMode,
    pub stop_timeout: StdDuration,
}

impl CaptureConfig {
    /// Defaults for a medium: webm container, one-shot audio, re-armable video
    pub fn for_kind(kind: CaptureKind) -> Self {
        Self {
            kind,
            lifecycle: kind.default_lifecycle(),
            mime_type: kind.default_mime_type(),
            facing_mode: FacingMode::default(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    pub fn audio() -> Self {
        Self::for_kind(CaptureKind::Audio)
    }

    pub fn video() -> Self {
        Self::for_kind(CaptureKind::Video)
    }

    pub fn with_lifecycle(mut self, lifecycle: DeviceLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_mime_type(mut self, mime_type: MediaMimeType) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = facing_mode;
        self
    }

    pub fn with_stop_timeout(mut self, stop_timeout: StdDuration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    /// Device request this configuration issues on activate
    pub fn request(&self) -> DeviceRequest {
        DeviceRequest::for_kind(self.kind, self.facing_mode)
    }
}

/// Metadata about an artifact handed to the callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSummary {
    pub artifact_id: Uuid,
    pub mime_type: MediaMimeType,
    pub size_bytes: usize,
    pub fragments: usize,
    pub elapsed_secs: u64,
}

/// Something the host may want to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// One more second elapsed
    Tick { elapsed_secs: u64 },
    /// A fragment was buffered
    Fragment { size: usize, buffered_bytes: usize },
    /// The recorder finished on its own and the artifact was handed off
    Finished(CaptureSummary),
}

/// Live device handle; stops every track when dropped
struct DeviceGuard {
    stream: Box<dyn DeviceStream>,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        self.stream.stop_tracks();
        tracing::debug!(kind = %self.stream.kind(), "device tracks stopped");
    }
}

/// Resources that exist only while recording
struct ActiveRecording {
    recorder: Box<dyn MediaRecorder>,
    events: RecorderEventReceiver,
    ticker: ElapsedTicker,
    started_at: Instant,
}

enum Wake {
    Tick(Option<()>),
    Event(Option<RecorderEvent>),
}

/// Capture controller for one medium.
///
/// State machine:
///   IDLE -> DEVICE_READY (activate)
///   DEVICE_READY -> RECORDING (start)
///   RECORDING -> DEVICE_READY | IDLE (stop, per device lifecycle)
///   any -> IDLE (deactivate, device loss, dispose)
pub struct CaptureController<D: MediaDevices> {
    devices: D,
    config: CaptureConfig,
    lifecycle: CaptureLifecycle,
    device: Option<DeviceGuard>,
    session: RecordingSession,
    recording: Option<ActiveRecording>,
    on_captured: ArtifactCallback,
}

impl<D: MediaDevices> CaptureController<D> {
    /// Create an idle controller
    pub fn new(devices: D, config: CaptureConfig, on_captured: ArtifactCallback) -> Self {
        Self {
            devices,
            config,
            lifecycle: CaptureLifecycle::new(),
            device: None,
            session: RecordingSession::default(),
            recording: None,
            on_captured,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.lifecycle.state()
    }

    pub fn is_recording(&self) -> bool {
        self.lifecycle.is_recording()
    }

    /// Whether a device handle is currently held
    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    /// Seconds recorded by the current or most recent session
    pub fn elapsed_secs(&self) -> u64 {
        self.session.elapsed_secs()
    }

    /// Bytes buffered by the current session
    pub fn buffered_bytes(&self) -> usize {
        self.session.buffered_bytes()
    }

    /// Request the device. A no-op when a device is already held.
    pub async fn activate(&mut self) -> Result<(), CaptureError> {
        match self.lifecycle.state() {
            CaptureState::DeviceReady => return Ok(()),
            CaptureState::Recording => {
                return Err(InvalidStateTransition {
                    current_state: CaptureState::Recording,
                    action: "activate the device".to_string(),
                }
                .into())
            }
            CaptureState::Idle => {}
        }

        let kind = self.config.kind;
        let stream = match self.devices.open(self.config.request()).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(%kind, "device request failed: {}", e);
                return Err(CaptureError::from_device(kind, e));
            }
        };

        self.device = Some(DeviceGuard { stream });
        self.lifecycle.activate()?;
        tracing::info!(%kind, "device ready");
        Ok(())
    }

    /// Open a new session and begin buffering fragments
    pub fn start(&mut self) -> Result<(), CaptureError> {
        self.lifecycle.start()?;

        let kind = self.config.kind;
        let (tx, events) = mpsc::unbounded_channel();
        let started = match self.device.as_mut() {
            Some(device) => device.stream.record(tx),
            None => Err(DeviceError::Failed("no device handle".to_string())),
        };

        let recorder = match started {
            Ok(recorder) => recorder,
            Err(e) => {
                tracing::warn!(%kind, "recorder failed to start: {}", e);
                self.release();
                return Err(CaptureError::from_device(kind, e));
            }
        };

        self.session = RecordingSession::open();
        self.recording = Some(ActiveRecording {
            recorder,
            events,
            ticker: ElapsedTicker::spawn(TICK_PERIOD),
            started_at: Instant::now(),
        });
        tracing::info!(%kind, "recording started");
        Ok(())
    }

    /// Activate if needed, then start
    pub async fn activate_and_start(&mut self) -> Result<(), CaptureError> {
        self.activate().await?;
        self.start()
    }

    /// Apply every event that is already pending, without waiting
    pub fn poll_events(&mut self) -> Result<Vec<CaptureUpdate>, CaptureError> {
        let mut updates = Vec::new();
        loop {
            let Some(recording) = self.recording.as_mut() else {
                break;
            };
            if recording.ticker.try_tick() {
                updates.push(CaptureUpdate::Tick {
                    elapsed_secs: self.session.tick(),
                });
                continue;
            }
            let event = match recording.events.try_recv() {
                Ok(event) => event,
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => RecorderEvent::Stopped,
            };
            if let Some(update) = self.apply(event)? {
                updates.push(update);
            }
        }
        Ok(updates)
    }

    /// Wait for the next tick or recorder event and apply it.
    /// Returns `Ok(None)` when not recording.
    pub async fn next_update(&mut self) -> Result<Option<CaptureUpdate>, CaptureError> {
        loop {
            let wake = {
                let Some(recording) = self.recording.as_mut() else {
                    return Ok(None);
                };
                tokio::select! {
                    tick = recording.ticker.next_tick() => Wake::Tick(tick),
                    event = recording.events.recv() => Wake::Event(event),
                }
            };

            let update = match wake {
                Wake::Tick(Some(())) => Some(CaptureUpdate::Tick {
                    elapsed_secs: self.session.tick(),
                }),
                Wake::Tick(None) => None,
                Wake::Event(Some(event)) => self.apply(event)?,
                Wake::Event(None) => self.apply(RecorderEvent::Stopped)?,
            };

            if update.is_some() {
                return Ok(update);
            }
        }
    }

    /// Finish the session and hand the artifact to the callback.
    /// A no-op returning `Ok(None)` when no session is active.
    pub async fn stop(&mut self) -> Result<Option<CaptureSummary>, CaptureError> {
        let Some(recording) = self.recording.take() else {
            tracing::debug!(kind = %self.config.kind, "stop without an active session");
            return Ok(None);
        };

        let ActiveRecording {
            mut recorder,
            mut events,
            ticker,
            started_at,
        } = recording;
        self.settle_elapsed(ticker, started_at);
        recorder.stop();

        let session = &mut self.session;
        let drained = tokio::time::timeout(self.config.stop_timeout, async {
            loop {
                match events.recv().await {
                    Some(RecorderEvent::Data(fragment)) => {
                        session.push_fragment(fragment);
                    }
                    Some(RecorderEvent::Stopped) | None => return Ok(()),
                    Some(RecorderEvent::DeviceLost(reason)) => return Err(reason),
                }
            }
        })
        .await;
        drop(recorder);

        match drained {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(self.device_lost(reason)),
            Err(_) => tracing::warn!(
                kind = %self.config.kind,
                timeout = ?self.config.stop_timeout,
                "recorder did not confirm stop; finalizing buffered fragments"
            ),
        }

        self.complete().map(Some)
    }

    /// Release the device unconditionally. An active session is aborted
    /// without producing an artifact. A no-op when already idle.
    pub fn deactivate(&mut self) {
        if let Some(mut recording) = self.recording.take() {
            recording.recorder.stop();
            self.settle_elapsed(recording.ticker, recording.started_at);
            self.session.discard();
            tracing::warn!(kind = %self.config.kind, "recording aborted, no artifact produced");
        }
        self.release();
    }

    /// Teardown: abort any session, cancel the ticker and release the device
    pub fn dispose(&mut self) {
        self.deactivate();
    }

    fn apply(&mut self, event: RecorderEvent) -> Result<Option<CaptureUpdate>, CaptureError> {
        match event {
            RecorderEvent::Data(fragment) => {
                let size = fragment.len();
                if self.session.push_fragment(fragment) {
                    Ok(Some(CaptureUpdate::Fragment {
                        size,
                        buffered_bytes: self.session.buffered_bytes(),
                    }))
                } else {
                    Ok(None)
                }
            }
            RecorderEvent::Stopped => {
                // Recorder ended on its own; hand off what was captured
                if let Some(recording) = self.recording.take() {
                    self.settle_elapsed(recording.ticker, recording.started_at);
                }
                self.complete().map(|summary| Some(CaptureUpdate::Finished(summary)))
            }
            RecorderEvent::DeviceLost(reason) => Err(self.device_lost(reason)),
        }
    }

    /// Count ticks that fired but were never polled, then stop ticking.
    /// The counter never lags the whole seconds since `start`.
    fn settle_elapsed(&mut self, mut ticker: ElapsedTicker, started_at: Instant) {
        while ticker.try_tick() {
            self.session.tick();
        }
        ticker.cancel();
        self.session
            .catch_up(started_at.elapsed().as_secs() / TICK_PERIOD.as_secs());
    }

    fn complete(&mut self) -> Result<CaptureSummary, CaptureError> {
        let fragments = self.session.chunk_count();
        let artifact = self.session.finalize(self.config.mime_type);
        self.lifecycle.stop(self.config.lifecycle)?;
        if self.config.lifecycle == DeviceLifecycle::OneShot {
            self.device = None;
        }

        let summary = CaptureSummary {
            artifact_id: artifact.id(),
            mime_type: artifact.mime_type(),
            size_bytes: artifact.size_bytes(),
            fragments,
            elapsed_secs: self.session.elapsed_secs(),
        };
        tracing::info!(
            kind = %self.config.kind,
            bytes = summary.size_bytes,
            fragments = summary.fragments,
            elapsed_secs = summary.elapsed_secs,
            "capture finished"
        );

        (self.on_captured)(artifact);
        Ok(summary)
    }

    fn device_lost(&mut self, reason: String) -> CaptureError {
        tracing::warn!(kind = %self.config.kind, "device lost while recording: {}", reason);
        self.recording = None;
        self.session.discard();
        self.release();
        CaptureError::DeviceLost {
            kind: self.config.kind,
            message: reason,
        }
    }

    fn release(&mut self) {
        if self.device.take().is_some() {
            tracing::info!(kind = %self.config.kind, "device released");
        }
        self.lifecycle.release();
    }
}

impl<D: MediaDevices> Drop for CaptureController<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
