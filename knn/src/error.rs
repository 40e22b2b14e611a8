use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire knn module.
pub type Result<T> = std::result::Result<T, KnnErr>;

/// The knn module's error type.
#[derive(Debug)]
pub enum KnnErr {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Write {
        path: PathBuf,
        source: io::Error,
    },
    Malformed {
        path: PathBuf,
        detail: String,
    },
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },
    EmptyTraining,
    UnknownMetric(String),
}

impl Display for KnnErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnnErr::Io { path, source } => write!(
                f,
                "the data set in {} could not be loaded: {source}",
                path.display()
            ),
            KnnErr::Write { path, source } => write!(
                f,
                "the data set could not be written to {}: {source}",
                path.display()
            ),
            KnnErr::Malformed { path, detail } => {
                write!(f, "the data set in {} is malformed: {detail}", path.display())
            }
            KnnErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "{what} size mismatch, got {got} and expected {expected}"),
            KnnErr::IndexOutOfBounds { index, len } => {
                write!(f, "item {index} is out of bounds for a data set of {len} items")
            }
            KnnErr::EmptyTraining => write!(f, "the training data set has no items"),
            KnnErr::UnknownMetric(name) => write!(f, "invalid distance metric: {name:?}"),
        }
    }
}

impl Error for KnnErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            KnnErr::Io { source, .. } | KnnErr::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}
