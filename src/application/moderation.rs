//! Moderation use case (operator dashboard)

use thiserror::Error;

use crate::domain::testimonial::{ModerationBoard, Testimonial};

use super::ports::{ListFilter, SubmissionError, TestimonialStore};

/// Errors from the moderation use case
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Testimonial not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] SubmissionError),
}

/// Moderation use case
pub struct ModerationUseCase<S: TestimonialStore> {
    store: S,
}

impl<S: TestimonialStore> ModerationUseCase<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All testimonials, split into pending and approved
    pub async fn board(&self) -> Result<ModerationBoard, ModerationError> {
        let all = self.store.list(ListFilter::All).await?;
        let board = ModerationBoard::from_testimonials(all);
        tracing::debug!(
            pending = board.pending.len(),
            approved = board.approved.len(),
            "loaded moderation board"
        );
        Ok(board)
    }

    /// Approved testimonials only, newest first
    pub async fn published(&self) -> Result<Vec<Testimonial>, ModerationError> {
        let mut approved = self.store.list(ListFilter::Approved).await?;
        approved.retain(|t| t.approved);
        approved.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(approved)
    }

    pub async fn get(&self, id: &str) -> Result<Testimonial, ModerationError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(id.to_string()))
    }

    pub async fn set_approved(
        &self,
        id: &str,
        approved: bool,
    ) -> Result<Testimonial, ModerationError> {
        let updated = self
            .store
            .set_approved(id, approved)
            .await?
            .ok_or_else(|| ModerationError::NotFound(id.to_string()))?;
        tracing::info!(%id, approved, "testimonial status updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ModerationError> {
        if !self.store.delete(id).await? {
            return Err(ModerationError::NotFound(id.to_string()));
        }
        tracing::info!(%id, "testimonial deleted");
        Ok(())
    }
}
