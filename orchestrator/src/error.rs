use std::{fmt, io, time::Duration};

use knn::KnnErr;

/// All errors that can occur in the orchestrator.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before any worker is spawned.
    InvalidConfig(String),
    /// A data set could not be loaded.
    Dataset(KnnErr),
    /// Sending an assignment to or receiving a result from a worker failed.
    Transport { worker_id: usize, source: io::Error },
    /// A worker ended with an unrecoverable error.
    WorkerFailed { worker_id: usize, msg: String },
    /// A worker task was cancelled or panicked outside of its scoring loop.
    WorkerAborted { worker_id: usize, msg: String },
    /// A worker answered with something other than its result.
    Protocol { worker_id: usize, detail: String },
    /// A worker reported more correct predictions than items it was given.
    InvalidResult {
        worker_id: usize,
        correct: u64,
        count: usize,
    },
    /// Not every worker terminated in time.
    Timeout(Duration),
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Dataset(e) => write!(f, "{e}"),
            Self::Transport { worker_id, source } => {
                write!(f, "transport to worker {worker_id} failed: {source}")
            }
            Self::WorkerFailed { worker_id, msg } => {
                write!(f, "worker {worker_id} error: {msg}")
            }
            Self::WorkerAborted { worker_id, msg } => {
                write!(f, "worker {worker_id} aborted: {msg}")
            }
            Self::Protocol { worker_id, detail } => {
                write!(f, "protocol error with worker {worker_id}: {detail}")
            }
            Self::InvalidResult {
                worker_id,
                correct,
                count,
            } => write!(
                f,
                "worker {worker_id} reported {correct} correct predictions for {count} items"
            ),
            Self::Timeout(limit) => {
                write!(f, "workers did not terminate within {}s", limit.as_secs_f64())
            }
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dataset(e) => Some(e),
            Self::Transport { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<KnnErr> for OrchestratorError {
    fn from(e: KnnErr) -> Self {
        match e {
            KnnErr::UnknownMetric(_) => Self::InvalidConfig(e.to_string()),
            other => Self::Dataset(other),
        }
    }
}
