use std::{error::Error, fmt, io};

use comms::specs::ShardSpec;
use knn::KnnErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Worker runtime failures.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    UnexpectedMessage {
        got: &'static str,
    },
    ShardOutOfBounds {
        shard: ShardSpec,
        len: usize,
    },
    Scoring {
        index: usize,
        source: KnnErr,
    },
    Panicked(String),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::UnexpectedMessage { got } => {
                write!(f, "unexpected message: expected an assignment, got {got}")
            }
            WorkerErr::ShardOutOfBounds { shard, len } => write!(
                f,
                "shard of {} items starting at {} exceeds the {len} available items",
                shard.count, shard.start
            ),
            WorkerErr::Scoring { index, source } => {
                write!(f, "failed to score item {index}: {source}")
            }
            WorkerErr::Panicked(detail) => write!(f, "scoring task panicked: {detail}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) => Some(e),
            WorkerErr::Scoring { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
