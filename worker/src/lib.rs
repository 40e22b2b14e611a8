pub mod error;
pub mod metrics;
pub mod scorer;
pub mod worker;

pub use error::{Result, WorkerErr};
pub use metrics::WorkerMetrics;
pub use scorer::{KnnScorer, Scorer};
pub use worker::Worker;
