//! Native microphone adapter using cpal
//!
//! `cpal::Stream` is not `Send`, so each opened device lives on its own
//! thread which owns the stream for as long as the tracks are live. The
//! handle talks to that thread over a command channel. Recordings are
//! streamed as PCM16 mono WAV: a header fragment, then one fragment per
//! input callback.

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tokio::sync::oneshot;

use super::wav;
use crate::application::ports::{
    DeviceError, DeviceStream, MediaDevices, MediaRecorder, RecorderEvent, RecorderEventSender,
};
use crate::domain::capture::{CaptureKind, DeviceRequest};

/// Preferred capture rate; speech does not need more
const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Where the input callback forwards samples while a recorder runs
type Target = Arc<Mutex<Option<RecorderEventSender>>>;

enum Command {
    Record(RecorderEventSender),
    StopRecording,
    Shutdown,
}

/// Microphone provider backed by the default cpal host
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalDevices;

impl CpalDevices {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaDevices for CpalDevices {
    async fn open(&self, request: DeviceRequest) -> Result<Box<dyn DeviceStream>, DeviceError> {
        if request.video {
            return Err(DeviceError::HardwareUnavailable(
                "camera capture is not supported by the native adapter".to_string(),
            ));
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let (commands, command_rx) = std_mpsc::channel();
        std::thread::Builder::new()
            .name("echo-capture-mic".to_string())
            .spawn(move || device_thread(ready_tx, command_rx))
            .map_err(|e| DeviceError::Failed(format!("failed to spawn device thread: {}", e)))?;

        let sample_rate = ready_rx
            .await
            .map_err(|_| DeviceError::Failed("device thread exited".to_string()))??;
        tracing::debug!(sample_rate, "microphone opened");

        Ok(Box::new(CpalStream {
            commands,
            sample_rate,
            live: true,
        }))
    }
}

struct CpalStream {
    commands: std_mpsc::Sender<Command>,
    sample_rate: u32,
    live: bool,
}

impl DeviceStream for CpalStream {
    fn kind(&self) -> CaptureKind {
        CaptureKind::Audio
    }

    fn record(&mut self, events: RecorderEventSender) -> Result<Box<dyn MediaRecorder>, DeviceError> {
        if !self.live {
            return Err(DeviceError::Failed("microphone already released".to_string()));
        }
        tracing::debug!(sample_rate = self.sample_rate, "microphone recording");
        self.commands
            .send(Command::Record(events))
            .map_err(|_| DeviceError::Failed("device thread exited".to_string()))?;

        Ok(Box::new(CpalRecorder {
            commands: self.commands.clone(),
            stopped: false,
        }))
    }

    fn stop_tracks(&mut self) {
        if self.live {
            let _ = self.commands.send(Command::Shutdown);
            self.live = false;
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

struct CpalRecorder {
    commands: std_mpsc::Sender<Command>,
    stopped: bool,
}

impl MediaRecorder for CpalRecorder {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            let _ = self.commands.send(Command::StopRecording);
        }
    }
}

/// Owns the cpal stream until shutdown or until the handle is dropped
fn device_thread(
    ready: oneshot::Sender<Result<u32, DeviceError>>,
    commands: std_mpsc::Receiver<Command>,
) {
    let target: Target = Arc::new(Mutex::new(None));

    let (stream, sample_rate) = match build_stream(Arc::clone(&target)) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(DeviceError::Failed(e.to_string())));
        return;
    }
    if ready.send(Ok(sample_rate)).is_err() {
        return;
    }

    while let Ok(command) = commands.recv() {
        match command {
            Command::Record(events) => {
                if events
                    .send(RecorderEvent::Data(wav::streaming_header(sample_rate, 1)))
                    .is_ok()
                {
                    *target.lock().unwrap_or_else(PoisonError::into_inner) = Some(events);
                }
            }
            Command::StopRecording => {
                let events = target.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(events) = events {
                    let _ = events.send(RecorderEvent::Stopped);
                }
            }
            Command::Shutdown => break,
        }
    }

    target.lock().unwrap_or_else(PoisonError::into_inner).take();
    drop(stream);
    tracing::debug!("microphone released");
}

fn build_stream(target: Target) -> Result<(cpal::Stream, u32), DeviceError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| DeviceError::HardwareUnavailable("no default input device".to_string()))?;
    let (config, sample_format) = input_config(&device)?;
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    let error_target = Arc::clone(&target);
    let on_error = move |err: cpal::StreamError| {
        tracing::warn!("microphone stream error: {}", err);
        if matches!(err, cpal::StreamError::DeviceNotAvailable) {
            let events = error_target
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(events) = events {
                let _ = events.send(RecorderEvent::DeviceLost(err.to_string()));
            }
        }
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                forward(&target, &downmix(data, channels));
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let pcm: Vec<i16> = data.iter().map(|&s| (s * 32767.0) as i16).collect();
                forward(&target, &downmix(&pcm, channels));
            },
            on_error,
            None,
        ),
        other => {
            return Err(DeviceError::Failed(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(map_build_error)?;

    Ok((stream, sample_rate))
}

fn forward(target: &Target, mono: &[i16]) {
    if mono.is_empty() {
        return;
    }
    if let Ok(guard) = target.lock() {
        if let Some(events) = guard.as_ref() {
            let _ = events.send(RecorderEvent::Data(wav::pcm16_bytes(mono)));
        }
    }
}

fn map_build_error(err: cpal::BuildStreamError) -> DeviceError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => {
            DeviceError::HardwareUnavailable(err.to_string())
        }
        cpal::BuildStreamError::BackendSpecific { ref err }
            if err.description.to_lowercase().contains("permission") =>
        {
            DeviceError::PermissionDenied(err.description.clone())
        }
        other => DeviceError::Failed(other.to_string()),
    }
}

/// Pick an i16/f32 config, preferring fewer channels and 16 kHz support
fn input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), DeviceError> {
    let supported = device
        .supported_input_configs()
        .map_err(|e| DeviceError::Failed(format!("failed to query input configs: {}", e)))?;

    let includes_target = |range: &cpal::SupportedStreamConfigRange| {
        range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
    };

    let best = supported
        .filter(|c| matches!(c.sample_format(), SampleFormat::I16 | SampleFormat::F32))
        .min_by_key(|c| (!includes_target(c), c.channels()))
        .ok_or_else(|| DeviceError::HardwareUnavailable("no usable input format".to_string()))?;

    let sample_rate = if includes_target(&best) {
        cpal::SampleRate(TARGET_SAMPLE_RATE)
    } else {
        best.min_sample_rate()
    };

    let config = StreamConfig {
        channels: best.channels(),
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };
    Ok((config, best.sample_format()))
}

/// Average interleaved channels down to mono
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / frame.len() as i32) as i16
        })
        .collect()
}
