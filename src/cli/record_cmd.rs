//! `record` command runner

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use crate::application::ports::MediaDevices;
use crate::application::{
    CaptureConfig, CaptureController, CaptureSummary, CaptureUpdate, ObjectUrls,
    PlaybackController,
};
use crate::domain::capture::{CaptureKind, CapturedArtifact, MediaMimeType};
use crate::infrastructure::device::wav;
use crate::infrastructure::{CpalDevices, RodioElement, SyntheticDevices};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::{DeviceArg, RecordOptions};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Fragment cadence of the synthetic device
const SYNTHETIC_FRAGMENT_PERIOD: StdDuration = StdDuration::from_millis(250);

/// How often playback is checked for its natural end
const PLAYBACK_POLL: StdDuration = StdDuration::from_millis(100);

/// Run a single capture: activate, record until the duration elapses or
/// Ctrl+C, write the artifact and optionally play it back
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    let devices: Box<dyn MediaDevices> = match options.device {
        DeviceArg::Default => Box::new(CpalDevices::new()),
        DeviceArg::Synthetic => {
            Box::new(SyntheticDevices::new().with_generator(SYNTHETIC_FRAGMENT_PERIOD))
        }
    };

    // Both native and synthetic microphones stream PCM WAV
    let mime_type = match options.kind {
        CaptureKind::Audio => MediaMimeType::AudioWav,
        CaptureKind::Video => MediaMimeType::VideoWebm,
    };
    let config = CaptureConfig::for_kind(options.kind)
        .with_mime_type(mime_type)
        .with_facing_mode(options.facing_mode);

    let captured: Arc<Mutex<Option<CapturedArtifact>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&captured);
    let mut controller = CaptureController::new(
        devices,
        config,
        Box::new(move |artifact| {
            if let Ok(mut slot) = sink.lock() {
                *slot = Some(artifact);
            }
        }),
    );

    presenter.start_spinner(&format!("Requesting {} device...", options.kind));
    if let Err(e) = controller.activate().await {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    if let Err(e) = controller.start() {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let total_secs = options.duration.as_secs();
    presenter.update_recording_progress(0, total_secs);

    let deadline = tokio::time::sleep(options.duration.as_std());
    tokio::pin!(deadline);

    let finished: Option<CaptureSummary> = loop {
        tokio::select! {
            update = controller.next_update() => match update {
                Ok(Some(CaptureUpdate::Tick { elapsed_secs })) => {
                    presenter.update_recording_progress(elapsed_secs, total_secs);
                }
                Ok(Some(CaptureUpdate::Fragment { .. })) => {}
                Ok(Some(CaptureUpdate::Finished(summary))) => break Some(summary),
                Ok(None) => break None,
                Err(e) => {
                    presenter.spinner_fail(&e.to_string());
                    return ExitCode::from(EXIT_ERROR);
                }
            },
            _ = &mut deadline => break None,
            _ = shutdown.requested() => {
                presenter.update_spinner("Interrupted, finishing recording...");
                break None;
            }
        }
    };

    let summary = match finished {
        Some(summary) => summary,
        None => match controller.stop().await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                presenter.spinner_fail("Recording ended without producing media");
                return ExitCode::from(EXIT_ERROR);
            }
            Err(e) => {
                presenter.spinner_fail(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };
    controller.dispose();

    let Some(artifact) = captured.lock().ok().and_then(|mut slot| slot.take()) else {
        presenter.spinner_fail("Recording was not handed off");
        return ExitCode::from(EXIT_ERROR);
    };
    presenter.spinner_success(&format!(
        "Recorded {} of {} ({})",
        crate::domain::recording::format_elapsed(summary.elapsed_secs),
        artifact.mime_type(),
        artifact.human_readable_size()
    ));

    let path = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(artifact.object_name()));
    if let Err(e) = write_artifact(&artifact, &path).await {
        presenter.error(&format!("Failed to write {}: {}", path.display(), e));
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.output(&path.to_string_lossy());
    presenter.info(&format!(
        "Attach it with: echo-capture submit --media {} ...",
        path.display()
    ));

    if options.play && !shutdown.is_shutdown() {
        play_back(&artifact, &shutdown, &mut presenter).await;
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Write the artifact, completing WAV size fields first
async fn write_artifact(artifact: &CapturedArtifact, path: &Path) -> std::io::Result<()> {
    let data = match artifact.mime_type() {
        MediaMimeType::AudioWav => wav::finalize_wav(artifact.data()),
        _ => artifact.data().clone(),
    };
    tokio::fs::write(path, &data).await?;
    tracing::info!(path = %path.display(), bytes = data.len(), "recording written");
    Ok(())
}

async fn play_back(artifact: &CapturedArtifact, shutdown: &ShutdownSignal, presenter: &mut Presenter) {
    if artifact.kind() == CaptureKind::Video {
        presenter.warn("Video playback is not available in the terminal");
        return;
    }

    let element = match RodioElement::try_default() {
        Ok(element) => element,
        Err(e) => {
            presenter.warn(&e.to_string());
            return;
        }
    };
    let mut player = PlaybackController::new(element, ObjectUrls::new());
    if let Err(e) = player.play(artifact) {
        presenter.warn(&e.to_string());
        return;
    }

    presenter.start_spinner("Playing back...");
    tokio::select! {
        _ = player.wait_until_ended(PLAYBACK_POLL) => presenter.spinner_success("Playback finished"),
        _ = shutdown.requested() => {
            player.pause();
            presenter.stop_spinner();
        }
    }
    player.dispose();
}
