use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

/// Distance metric used when none is given.
pub const DEFAULT_METRIC: &str = "euclidean";

/// Environment variable holding the termination barrier timeout in seconds.
pub const WORKER_TIMEOUT_ENV: &str = "KNN_WORKER_TIMEOUT_SECS";

/// Everything a single evaluation run needs, built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    pub training_path: PathBuf,
    pub testing_path: PathBuf,
    pub workers: NonZeroUsize,
    pub k: NonZeroUsize,
    /// Name or prefix of a registered distance metric.
    pub metric: String,
    pub worker_timeout: Option<Duration>,
}

impl EvalConfig {
    /// Creates a configuration with one worker, `k = 1` and euclidean distance.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(training_path: P, testing_path: Q) -> Self {
        Self {
            training_path: training_path.into(),
            testing_path: testing_path.into(),
            workers: NonZeroUsize::MIN,
            k: NonZeroUsize::MIN,
            metric: DEFAULT_METRIC.to_string(),
            worker_timeout: None,
        }
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_k(mut self, k: NonZeroUsize) -> Self {
        self.k = k;
        self
    }

    pub fn with_metric<S: Into<String>>(mut self, metric: S) -> Self {
        self.metric = metric.into();
        self
    }

    pub fn with_worker_timeout(mut self, worker_timeout: Option<Duration>) -> Self {
        self.worker_timeout = worker_timeout;
        self
    }
}

/// Reads the termination barrier timeout from the environment.
///
/// Unset, unparsable or zero values mean no timeout.
pub fn worker_timeout_from_env() -> Option<Duration> {
    parse_timeout(std::env::var(WORKER_TIMEOUT_ENV).ok().as_deref())
}

fn parse_timeout(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
