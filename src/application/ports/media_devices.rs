//! Device and recorder port interfaces

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::capture::{CaptureKind, DeviceRequest};

/// Device acquisition errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No capture device available: {0}")]
    HardwareUnavailable(String),

    #[error("Device failure: {0}")]
    Failed(String),
}

/// Events a recorder emits while a session runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A fragment of encoded media, in arrival order
    Data(Bytes),
    /// Terminal event: all fragments of the session have been delivered
    Stopped,
    /// The platform revoked or lost the device mid-session
    DeviceLost(String),
}

/// Sending half handed to a recorder for one session
pub type RecorderEventSender = mpsc::UnboundedSender<RecorderEvent>;

/// Receiving half held by the capture controller for one session
pub type RecorderEventReceiver = mpsc::UnboundedReceiver<RecorderEvent>;

/// A running recorder bound to a device stream
pub trait MediaRecorder: Send {
    /// Ask the recorder to stop. It must deliver any pending fragments and
    /// then exactly one [`RecorderEvent::Stopped`].
    fn stop(&mut self);
}

/// A live device stream (microphone, or camera plus microphone)
pub trait DeviceStream: Send {
    /// Medium this stream was opened for
    fn kind(&self) -> CaptureKind;

    /// Begin recording this stream, delivering events on `events`
    fn record(&mut self, events: RecorderEventSender) -> Result<Box<dyn MediaRecorder>, DeviceError>;

    /// Stop every track and release the hardware. Must be idempotent.
    fn stop_tracks(&mut self);

    /// Whether any track is still live
    fn is_live(&self) -> bool;
}

/// Port for acquiring capture devices
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Request a device stream. Resolves once the platform grants or denies
    /// access.
    async fn open(&self, request: DeviceRequest) -> Result<Box<dyn DeviceStream>, DeviceError>;
}

/// Blanket implementation for boxed device providers
#[async_trait]
impl MediaDevices for Box<dyn MediaDevices> {
    async fn open(&self, request: DeviceRequest) -> Result<Box<dyn DeviceStream>, DeviceError> {
        self.as_ref().open(request).await
    }
}
