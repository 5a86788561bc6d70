//! Error handling module
//!
//! Defines the error taxonomy of the checkout sequence with exit codes

pub mod types;

pub use types::*;
