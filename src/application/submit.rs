//! Submit testimonial use case

use thiserror::Error;

use crate::domain::capture::{CaptureKind, CapturedArtifact};
use crate::domain::error::FormValidationError;
use crate::domain::testimonial::{MediaType, Testimonial, TestimonialForm};

use super::ports::{NewTestimonial, SubmissionError, TestimonialStore};

/// Errors from the submit use case
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormValidationError),

    #[error("A {0} recording is required for this testimonial")]
    MissingMedia(MediaType),

    #[error("Expected a {expected} recording but got {actual}")]
    MediaMismatch {
        expected: MediaType,
        actual: CaptureKind,
    },

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

/// Submit testimonial use case
pub struct SubmitTestimonialUseCase<S: TestimonialStore> {
    store: S,
}

impl<S: TestimonialStore> SubmitTestimonialUseCase<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validate the form, pair it with its recording and hand both to the
    /// store. The stored testimonial awaits moderation.
    pub async fn execute(
        &self,
        form: TestimonialForm,
        media: Option<CapturedArtifact>,
    ) -> Result<Testimonial, SubmitError> {
        let form = form.normalized();
        form.validate()?;

        let media = match form.media_type.capture_kind() {
            None => {
                if media.is_some() {
                    tracing::debug!("media type is none, dropping attached recording");
                }
                None
            }
            Some(expected) => {
                let artifact = media
                    .filter(|a| !a.is_empty())
                    .ok_or(SubmitError::MissingMedia(form.media_type))?;
                if artifact.kind() != expected {
                    return Err(SubmitError::MediaMismatch {
                        expected: form.media_type,
                        actual: artifact.kind(),
                    });
                }
                Some(artifact)
            }
        };

        tracing::info!(
            media_type = %form.media_type,
            media_bytes = media.as_ref().map_or(0, CapturedArtifact::size_bytes),
            "submitting testimonial"
        );

        let testimonial = self
            .store
            .submit(&NewTestimonial { form, media })
            .await
            .inspect_err(|e| tracing::warn!("testimonial submission failed: {}", e))?;

        tracing::info!(id = %testimonial.id, "testimonial submitted, awaiting approval");
        Ok(testimonial)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::ports::ListFilter;
    use crate::domain::capture::MediaMimeType;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;
    use std::sync::Mutex;

    /// In-memory store shared by the use case tests
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub rows: Mutex<Vec<Testimonial>>,
        pub uploads: Mutex<Vec<CapturedArtifact>>,
        pub fail_with: Option<SubmissionError>,
    }

    impl MemoryStore {
        pub(crate) fn with_rows(rows: Vec<Testimonial>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl TestimonialStore for MemoryStore {
        async fn submit(
            &self,
            testimonial: &NewTestimonial,
        ) -> Result<Testimonial, SubmissionError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let media_url = testimonial.media.as_ref().map(|artifact| {
                self.uploads.lock().unwrap().push(artifact.clone());
                format!("https://cdn.test/{}", artifact.object_name())
            });
            let form = &testimonial.form;
            let row = Testimonial {
                id: format!("t-{}", self.rows.lock().unwrap().len() + 1),
                name: form.name.clone(),
                email: form.email.clone(),
                company: form.company.clone(),
                position: form.position.clone(),
                text: form.text.clone(),
                rating: Some(form.rating),
                media_type: form.media_type,
                media_url,
                approved: false,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn list(&self, filter: ListFilter) -> Result<Vec<Testimonial>, SubmissionError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|t| match filter {
                    ListFilter::All => true,
                    ListFilter::Approved => t.approved,
                    ListFilter::Pending => !t.approved,
                })
                .cloned()
                .collect())
        }

        async fn get(&self, id: &str) -> Result<Option<Testimonial>, SubmissionError> {
            Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn set_approved(
            &self,
            id: &str,
            approved: bool,
        ) -> Result<Option<Testimonial>, SubmissionError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|t| t.id == id).map(|t| {
                t.approved = approved;
                t.clone()
            }))
        }

        async fn delete(&self, id: &str) -> Result<bool, SubmissionError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|t| t.id != id);
            Ok(rows.len() != before)
        }
    }

    fn form(media_type: MediaType) -> TestimonialForm {
        TestimonialForm {
            name: "  Maya Chen ".to_string(),
            email: "maya@example.com".to_string(),
            company: Some("  ".to_string()),
            position: None,
            text: "Recording a quick clip was painless.".to_string(),
            rating: 4,
            media_type,
        }
    }

    fn clip(mime: MediaMimeType) -> CapturedArtifact {
        CapturedArtifact::new(Bytes::from_static(b"clip"), mime)
    }

    #[tokio::test]
    async fn submits_text_only_testimonial() {
        let use_case = SubmitTestimonialUseCase::new(MemoryStore::default());
        let stored = use_case.execute(form(MediaType::None), None).await.unwrap();

        assert_eq!(stored.name, "Maya Chen");
        assert_eq!(stored.company, None);
        assert!(!stored.approved);
        assert!(stored.media_url.is_none());
    }

    #[tokio::test]
    async fn drops_media_when_type_is_none() {
        let store = MemoryStore::default();
        let use_case = SubmitTestimonialUseCase::new(store);
        let stored = use_case
            .execute(form(MediaType::None), Some(clip(MediaMimeType::AudioWebm)))
            .await
            .unwrap();

        assert!(stored.media_url.is_none());
        assert!(use_case.store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn uploads_matching_media() {
        let use_case = SubmitTestimonialUseCase::new(MemoryStore::default());
        let stored = use_case
            .execute(form(MediaType::Video), Some(clip(MediaMimeType::VideoWebm)))
            .await
            .unwrap();

        assert!(stored.has_media());
        assert_eq!(use_case.store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn requires_media_for_audio() {
        let use_case = SubmitTestimonialUseCase::new(MemoryStore::default());
        let err = use_case.execute(form(MediaType::Audio), None).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingMedia(MediaType::Audio)));

        let empty = CapturedArtifact::new(Bytes::new(), MediaMimeType::AudioWebm);
        let err = use_case
            .execute(form(MediaType::Audio), Some(empty))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::MissingMedia(_)));
    }

    #[tokio::test]
    async fn rejects_mismatched_media() {
        let use_case = SubmitTestimonialUseCase::new(MemoryStore::default());
        let err = use_case
            .execute(form(MediaType::Audio), Some(clip(MediaMimeType::VideoWebm)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmitError::MediaMismatch {
                expected: MediaType::Audio,
                actual: CaptureKind::Video
            }
        ));
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_store() {
        let use_case = SubmitTestimonialUseCase::new(MemoryStore::default());
        let bad = TestimonialForm {
            name: "M".to_string(),
            email: "nope".to_string(),
            text: "short".to_string(),
            ..Default::default()
        };

        match use_case.execute(bad, None).await.unwrap_err() {
            SubmitError::Invalid(e) => assert_eq!(e.fields.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
        assert!(use_case.store.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = MemoryStore {
            fail_with: Some(SubmissionError::StorageQuota("bucket full".into())),
            ..Default::default()
        };
        let use_case = SubmitTestimonialUseCase::new(store);
        let err = use_case.execute(form(MediaType::None), None).await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Submission(SubmissionError::StorageQuota(_))
        ));
        assert!(err.to_string().contains("bucket full"));
    }
}
