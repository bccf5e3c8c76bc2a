//! Stored testimonial entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::form::MediaType;

/// A testimonial as stored by the hosted backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    pub text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    /// Whether this testimonial carries recorded media
    pub fn has_media(&self) -> bool {
        self.media_type != MediaType::None
            && self.media_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Operator's view: testimonials split by approval status, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModerationBoard {
    pub pending: Vec<Testimonial>,
    pub approved: Vec<Testimonial>,
}

impl ModerationBoard {
    /// Split and order a list of testimonials
    pub fn from_testimonials(mut testimonials: Vec<Testimonial>) -> Self {
        testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let (approved, pending) = testimonials.into_iter().partition(|t| t.approved);
        Self { pending, approved }
    }

    pub fn total(&self) -> usize {
        self.pending.len() + self.approved.len()
    }
}
