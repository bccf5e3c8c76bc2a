//! Domain error types

use std::fmt;

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, or <number>m<number>s (e.g., 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown capture kind is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid capture kind: \"{input}\". Valid kinds are: audio, video")]
pub struct InvalidCaptureKindError {
    pub input: String,
}

/// Error when an unknown camera facing mode is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid facing mode: \"{input}\". Valid modes are: user, environment")]
pub struct InvalidFacingModeError {
    pub input: String,
}

/// Error when an unknown media type or MIME type is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid media type: \"{input}\"")]
pub struct InvalidMediaTypeError {
    pub input: String,
}

/// A single rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error when a testimonial form fails validation.
/// Carries every rejected field, not just the first.
#[derive(Debug, Clone, Error)]
#[error("Invalid testimonial form: {}", join_fields(.fields))]
pub struct FormValidationError {
    pub fields: Vec<FieldError>,
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormValidationError {
    /// Message for a given field, if it was rejected
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_error_lists_every_field() {
        let err = FormValidationError {
            fields: vec![
                FieldError {
                    field: "name",
                    message: "Name must be at least 2 characters".to_string(),
                },
                FieldError {
                    field: "text",
                    message: "Testimonial must be at least 10 characters".to_string(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("name: Name must be at least 2 characters"));
        assert!(msg.contains("text: Testimonial must be at least 10 characters"));
        assert_eq!(
            err.message_for("text"),
            Some("Testimonial must be at least 10 characters")
        );
        assert!(err.message_for("email").is_none());
    }
}
