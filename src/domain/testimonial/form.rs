//! Testimonial form value object and validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::capture::CaptureKind;
use crate::domain::error::{FieldError, FormValidationError, InvalidMediaTypeError};

/// Minimum name length (characters, after trimming)
pub const MIN_NAME_CHARS: usize = 2;

/// Minimum testimonial text length (characters, after trimming)
pub const MIN_TEXT_CHARS: usize = 10;

/// Accepted star ratings
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Media attached to a testimonial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
    #[default]
    None,
}

impl MediaType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::None => "none",
        }
    }

    /// Capture kind required by this media type, if any
    pub const fn capture_kind(&self) -> Option<CaptureKind> {
        match self {
            Self::Audio => Some(CaptureKind::Audio),
            Self::Video => Some(CaptureKind::Video),
            Self::None => None,
        }
    }
}

impl From<CaptureKind> for MediaType {
    fn from(kind: CaptureKind) -> Self {
        match kind {
            CaptureKind::Audio => Self::Audio,
            CaptureKind::Video => Self::Video,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = InvalidMediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "none" | "text" => Ok(Self::None),
            _ => Err(InvalidMediaTypeError {
                input: s.to_string(),
            }),
        }
    }
}

/// Fields an end user fills in when submitting a testimonial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialForm {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub text: String,
    pub rating: u8,
    pub media_type: MediaType,
}

impl Default for TestimonialForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            company: None,
            position: None,
            text: String::new(),
            rating: 5,
            media_type: MediaType::None,
        }
    }
}

impl TestimonialForm {
    /// Check every field, collecting all failures
    pub fn validate(&self) -> Result<(), FormValidationError> {
        let mut fields = Vec::new();

        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            fields.push(FieldError {
                field: "name",
                message: format!("Name must be at least {} characters", MIN_NAME_CHARS),
            });
        }

        if !is_valid_email(&self.email) {
            fields.push(FieldError {
                field: "email",
                message: "Please enter a valid email address".to_string(),
            });
        }

        if self.text.trim().chars().count() < MIN_TEXT_CHARS {
            fields.push(FieldError {
                field: "text",
                message: format!("Testimonial must be at least {} characters", MIN_TEXT_CHARS),
            });
        }

        if !RATING_RANGE.contains(&self.rating) {
            fields.push(FieldError {
                field: "rating",
                message: format!(
                    "Rating must be between {} and {}",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                ),
            });
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(FormValidationError { fields })
        }
    }

    /// Trimmed copy with blank optional fields turned into `None`
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: non_blank(self.company.as_deref()),
            position: non_blank(self.position.as_deref()),
            text: self.text.trim().to_string(),
            rating: self.rating,
            media_type: self.media_type,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
