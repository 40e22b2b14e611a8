//! Distributed k-nearest-neighbour evaluation of a test data set against a training data set.

pub mod configs;
pub mod error;
mod planner;
mod session;

use std::sync::Arc;

use knn::{Dataset, Distance, ScoringConfig};
use log::{debug, info};
use tokio::runtime::Runtime;
use worker::{KnnScorer, Scorer};

pub use configs::EvalConfig;
pub use error::OrchestratorError;
pub use planner::plan;
pub use session::{Phase, Session};

/// Runs a whole evaluation and returns how many test items were classified correctly.
///
/// The metric is resolved before anything is loaded, both data sets are loaded
/// in full and then the test items are split among `config.workers` workers.
///
/// # Errors
/// Returns an `OrchestratorError` if the configuration is invalid, a data set
/// can't be loaded or any worker fails.
pub fn evaluate(config: EvalConfig) -> Result<u64, OrchestratorError> {
    let mut session =
        Session::new(config.workers).with_worker_timeout(config.worker_timeout);
    session.load(|| load_scorer(&config))?;

    let runtime = Runtime::new()?;
    let res = runtime.block_on(session.run());

    // Blocking scoring threads of aborted workers must not hold the caller.
    runtime.shutdown_background();
    res
}

/// Resolves the metric, then loads and validates both data sets.
fn load_scorer(config: &EvalConfig) -> Result<Arc<dyn Scorer>, OrchestratorError> {
    let distance = Distance::resolve(&config.metric)?;
    let scoring = ScoringConfig::new(config.k, distance);
    debug!(k = config.k.get(), metric = distance.name(); "resolved scoring config");

    let training = Dataset::load(&config.training_path)?;
    let testing = Dataset::load(&config.testing_path)?;
    validate(config, &training, &testing)?;
    info!(
        training = training.len(),
        testing = testing.len(),
        features = training.num_features();
        "loaded data sets"
    );

    let scorer: Arc<dyn Scorer> = Arc::new(KnnScorer::new(
        Arc::new(training),
        Arc::new(testing),
        scoring,
    ));
    Ok(scorer)
}

/// Checks that both data sets can be evaluated against each other.
fn validate(
    config: &EvalConfig,
    training: &Dataset,
    testing: &Dataset,
) -> Result<(), OrchestratorError> {
    if training.is_empty() {
        return Err(OrchestratorError::InvalidConfig(format!(
            "the training data set in {} has no items",
            config.training_path.display()
        )));
    }

    if training.num_features() != testing.num_features() {
        return Err(OrchestratorError::InvalidConfig(format!(
            "training items have {} features but testing items have {}",
            training.num_features(),
            testing.num_features()
        )));
    }

    Ok(())
}
