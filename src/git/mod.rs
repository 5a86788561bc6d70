//! Git operations module
//!
//! Handles fetching, tag resolution, tree checkout and sparse pruning

pub mod credentials;
pub mod mock;
pub mod options;
pub mod repository;
pub mod sparse;
pub mod tags;

pub use credentials::*;
pub use mock::*;
pub use options::*;
pub use repository::*;
pub use sparse::*;
pub use tags::*;
