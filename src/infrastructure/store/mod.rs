//! Hosted backend adapters

mod rest;

pub use rest::RestTestimonialStore;
