mod evaluation;

pub use evaluation::{DEFAULT_METRIC, EvalConfig, WORKER_TIMEOUT_ENV, worker_timeout_from_env};
