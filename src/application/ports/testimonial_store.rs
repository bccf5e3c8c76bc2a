//! Testimonial store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::CapturedArtifact;
use crate::domain::testimonial::{Testimonial, TestimonialForm};

/// Failures reported by the hosted backend
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    #[error("Rejected by backend: {0}")]
    Validation(String),

    #[error("Storage quota exceeded: {0}")]
    StorageQuota(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authorized. Check ECHO_API_KEY or 'echo-capture config set api_key <key>'")]
    Unauthorized,

    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse backend response: {0}")]
    Parse(String),
}

/// Which testimonials to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    Approved,
    Pending,
}

/// A validated form together with its optional recording
#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub form: TestimonialForm,
    pub media: Option<CapturedArtifact>,
}

/// Port for the hosted backend that stores testimonials and their media
#[async_trait]
pub trait TestimonialStore: Send + Sync {
    /// Upload the media (if any) and insert the testimonial row.
    ///
    /// # Returns
    /// The stored testimonial, unapproved
    async fn submit(&self, testimonial: &NewTestimonial) -> Result<Testimonial, SubmissionError>;

    /// List testimonials, newest first
    async fn list(&self, filter: ListFilter) -> Result<Vec<Testimonial>, SubmissionError>;

    /// Fetch a single testimonial
    async fn get(&self, id: &str) -> Result<Option<Testimonial>, SubmissionError>;

    /// Set the approval flag. `None` when no testimonial has this id.
    async fn set_approved(
        &self,
        id: &str,
        approved: bool,
    ) -> Result<Option<Testimonial>, SubmissionError>;

    /// Delete a testimonial. `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, SubmissionError>;
}
