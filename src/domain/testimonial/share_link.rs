//! Shareable form link value object

use std::fmt;

use uuid::Uuid;

/// Length of the generated form id
pub const FORM_ID_LEN: usize = 8;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Link an operator sends to customers to open the testimonial form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    origin: String,
    form_id: String,
}

impl ShareLink {
    /// Generate a link with a random base-36 form id
    pub fn generate(origin: &str) -> Self {
        Self::with_form_id(origin, random_form_id())
    }

    /// Build a link for a known form id
    pub fn with_form_id(origin: &str, form_id: impl Into<String>) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            form_id: form_id.into(),
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn url(&self) -> String {
        format!("{}/testimonial/{}", self.origin, self.form_id)
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

fn random_form_id() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(FORM_ID_LEN);
    for _ in 0..FORM_ID_LEN {
        id.push(char::from(BASE36[(value % 36) as usize]));
        value /= 36;
    }
    id
}
