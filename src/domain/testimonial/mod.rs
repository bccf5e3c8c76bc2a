//! Testimonial domain module

mod form;
mod record;
mod share_link;

pub use form::{is_valid_email, MediaType, TestimonialForm, MIN_NAME_CHARS, MIN_TEXT_CHARS, RATING_RANGE};
pub use record::{ModerationBoard, Testimonial};
pub use share_link::ShareLink;
