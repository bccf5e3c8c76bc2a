//! Media element adapters

mod rodio_element;

pub use rodio_element::RodioElement;
