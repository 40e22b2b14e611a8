//! Building blocks for k-nearest-neighbour classification of labeled item sets.

pub mod classify;
pub mod dataset;
pub mod distance;
pub mod error;

pub use classify::{ScoringConfig, classify_one};
pub use dataset::Dataset;
pub use distance::Distance;
pub use error::{KnnErr, Result};
