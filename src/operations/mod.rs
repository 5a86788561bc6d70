//! Operations module
//!
//! Coordinates the tag checkout session: fetch, tag resolution, checkout and
//! sparse prune

pub mod checkout;

pub use checkout::*;
