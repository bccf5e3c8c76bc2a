//! Echo Capture - audio/video testimonial capture
//!
//! This crate records short audio or video testimonials from a capture
//! device, previews them, and submits them to a hosted backend where
//! they wait for moderation.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture lifecycle, artifacts, testimonials, config and errors
//! - **Application**: Capture and playback controllers, use cases and port traits
//! - **Infrastructure**: Adapters (cpal microphone, synthetic devices, rodio
//!   playback, REST backend, XDG config)
//! - **CLI**: Command-line interface, argument parsing and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
