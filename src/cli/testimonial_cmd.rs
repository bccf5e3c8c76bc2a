//! Submission and moderation command handlers

use std::path::Path;

use thiserror::Error;

use crate::application::ports::TestimonialStore;
use crate::application::{
    ModerationError, ModerationUseCase, SubmitError, SubmitTestimonialUseCase,
};
use crate::domain::capture::{CaptureKind, CapturedArtifact, MediaMimeType};
use crate::domain::testimonial::{MediaType, ShareLink, TestimonialForm};

use super::args::SubmitArgs;
use super::presenter::Presenter;

/// Errors from testimonial commands
#[derive(Debug, Error)]
pub enum TestimonialCmdError {
    #[error("Failed to read media file {path}: {message}")]
    MediaRead { path: String, message: String },

    #[error("Cannot tell the medium of {0}; pass --media-type audio|video")]
    UnknownMedium(String),

    #[error("Unsupported media file {0}; expected .webm (audio or video) or .wav (audio)")]
    UnsupportedMedia(String),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Moderation(#[from] ModerationError),
}

impl TestimonialCmdError {
    /// Whether the failure stems from bad command-line input
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMedium(_) | Self::UnsupportedMedia(_) | Self::Submit(SubmitError::Invalid(_))
        )
    }
}

/// Handle `submit`
pub async fn handle_submit<S: TestimonialStore>(
    args: SubmitArgs,
    store: S,
    presenter: &mut Presenter,
) -> Result<(), TestimonialCmdError> {
    let media = match &args.media {
        Some(path) => {
            let kind = args.media_type.map(CaptureKind::from);
            Some(load_media(path, kind).await?)
        }
        None => None,
    };

    let form = TestimonialForm {
        name: args.name,
        email: args.email,
        company: args.company,
        position: args.position,
        text: args.text,
        rating: args.rating,
        media_type: media
            .as_ref()
            .map_or(MediaType::None, |artifact| artifact.kind().into()),
    };

    presenter.start_spinner("Submitting testimonial...");
    let use_case = SubmitTestimonialUseCase::new(store);
    match use_case.execute(form, media).await {
        Ok(testimonial) => {
            presenter.spinner_success("Testimonial submitted, awaiting approval");
            presenter.output(&testimonial.id);
            Ok(())
        }
        Err(e) => {
            presenter.stop_spinner();
            Err(e.into())
        }
    }
}

/// Read a media file into an artifact, inferring its content type
async fn load_media(
    path: &Path,
    kind: Option<CaptureKind>,
) -> Result<CapturedArtifact, TestimonialCmdError> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let kind = match (kind, extension.as_str()) {
        (Some(kind), _) => kind,
        (None, "wav") => CaptureKind::Audio,
        (None, _) => return Err(TestimonialCmdError::UnknownMedium(display)),
    };
    let mime_type = MediaMimeType::from_extension(&extension, kind)
        .ok_or_else(|| TestimonialCmdError::UnsupportedMedia(display.clone()))?;

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| TestimonialCmdError::MediaRead {
            path: display,
            message: e.to_string(),
        })?;
    Ok(CapturedArtifact::new(data, mime_type))
}

/// Handle `list`
pub async fn handle_list<S: TestimonialStore>(
    store: S,
    approved_only: bool,
    pending_only: bool,
    presenter: &Presenter,
) -> Result<(), TestimonialCmdError> {
    let moderation = ModerationUseCase::new(store);

    if approved_only {
        let published = moderation.published().await?;
        presenter.heading("Approved", published.len());
        published.iter().for_each(|t| presenter.testimonial(t));
        return Ok(());
    }

    let board = moderation.board().await?;
    presenter.heading("Pending", board.pending.len());
    board.pending.iter().for_each(|t| presenter.testimonial(t));
    if !pending_only {
        presenter.heading("Approved", board.approved.len());
        board.approved.iter().for_each(|t| presenter.testimonial(t));
    }
    Ok(())
}

/// Handle `approve` / `unapprove`
pub async fn handle_set_approved<S: TestimonialStore>(
    store: S,
    id: &str,
    approved: bool,
    presenter: &Presenter,
) -> Result<(), TestimonialCmdError> {
    let testimonial = ModerationUseCase::new(store)
        .set_approved(id, approved)
        .await?;
    let verb = if approved { "Approved" } else { "Unapproved" };
    presenter.success(&format!("{} testimonial from {}", verb, testimonial.name));
    Ok(())
}

/// Handle `delete`
pub async fn handle_delete<S: TestimonialStore>(
    store: S,
    id: &str,
    presenter: &Presenter,
) -> Result<(), TestimonialCmdError> {
    ModerationUseCase::new(store).delete(id).await?;
    presenter.success(&format!("Deleted testimonial {}", id));
    Ok(())
}

/// Handle `link`
pub fn handle_link(origin: &str, presenter: &Presenter) {
    let link = ShareLink::generate(origin);
    presenter.output(&link.url());
}
