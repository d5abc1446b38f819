//! Axum extractors.

pub mod input_output;

pub use input_output::InputOutput;
