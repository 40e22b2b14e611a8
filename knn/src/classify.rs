use std::num::NonZeroUsize;

use ndarray::ArrayView1;

use crate::{
    dataset::Dataset,
    distance::Distance,
    error::{KnnErr, Result},
};

const NUM_LABELS: usize = u8::MAX as usize + 1;

/// Immutable scoring parameters shared by every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub k: NonZeroUsize,
    pub distance: Distance,
}

impl ScoringConfig {
    pub fn new(k: NonZeroUsize, distance: Distance) -> Self {
        Self { k, distance }
    }
}

/// Predicts the label of `query` by majority vote among its `k` nearest
/// training items.
///
/// Equidistant neighbours are ranked by training order and a tie between vote
/// counts goes to the smallest label. `k` is clamped to the training size.
///
/// # Errors
/// Returns `EmptyTraining` if there's nothing to vote and `ShapeMismatch` if
/// `query` doesn't have the training feature width.
pub fn classify_one(
    training: &Dataset,
    query: ArrayView1<'_, f32>,
    config: &ScoringConfig,
) -> Result<u8> {
    if training.is_empty() {
        return Err(KnnErr::EmptyTraining);
    }

    if query.len() != training.num_features() {
        return Err(KnnErr::ShapeMismatch {
            what: "query features",
            got: query.len(),
            expected: training.num_features(),
        });
    }

    let mut neighbours: Vec<(f64, usize)> = training
        .iter()
        .enumerate()
        .map(|(index, (features, _))| (config.distance.measure(features, query), index))
        .collect();

    let k = config.k.get().min(neighbours.len());
    neighbours.select_nth_unstable_by(k - 1, |a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut votes = [0usize; NUM_LABELS];
    for &(_, index) in &neighbours[..k] {
        votes[usize::from(training.label(index))] += 1;
    }

    let (label, _) = votes
        .iter()
        .enumerate()
        .fold((0, 0), |best, (label, &count)| {
            if count > best.1 { (label, count) } else { best }
        });

    Ok(label as u8)
}
