use std::sync::Arc;

use knn::{Dataset, KnnErr, ScoringConfig, classify_one};

/// Decides whether a single test item is classified correctly.
///
/// Implementors are shared read-only between every worker of a run.
pub trait Scorer: Send + Sync {
    /// The amount of test items that can be scored.
    fn len(&self) -> usize;

    /// Scores the test item at `index`.
    fn is_correct(&self, index: usize) -> knn::Result<bool>;
}

/// Scores test items with k-nearest-neighbour classification.
#[derive(Debug, Clone)]
pub struct KnnScorer {
    training: Arc<Dataset>,
    testing: Arc<Dataset>,
    config: ScoringConfig,
}

impl KnnScorer {
    pub fn new(training: Arc<Dataset>, testing: Arc<Dataset>, config: ScoringConfig) -> Self {
        Self {
            training,
            testing,
            config,
        }
    }
}

impl Scorer for KnnScorer {
    fn len(&self) -> usize {
        self.testing.len()
    }

    fn is_correct(&self, index: usize) -> knn::Result<bool> {
        if index >= self.testing.len() {
            return Err(KnnErr::IndexOutOfBounds {
                index,
                len: self.testing.len(),
            });
        }

        let (features, label) = self.testing.item(index);
        let predicted = classify_one(&self.training, features, &self.config)?;
        Ok(predicted == label)
    }
}
