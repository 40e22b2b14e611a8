use std::{num::NonZeroUsize, path::PathBuf};

use knn::{Dataset, KnnErr};
use ndarray::array;
use orchestrator::{EvalConfig, OrchestratorError, evaluate};
use tempfile::TempDir;

fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

/// Two clusters of two items each, and four test items of which three match
/// the label of their nearest training item.
fn write_datasets(dir: &TempDir) -> (PathBuf, PathBuf) {
    let training = Dataset::new(
        array![[0.0, 0.0], [1.0, 0.0], [10.0, 10.0], [11.0, 10.0]],
        vec![0, 0, 1, 1],
    )
    .unwrap();
    let testing = Dataset::new(
        array![[0.0, 1.0], [10.0, 11.0], [1.0, 1.0], [11.0, 11.0]],
        vec![0, 1, 0, 0],
    )
    .unwrap();

    let training_path = dir.path().join("train.bin");
    let testing_path = dir.path().join("test.bin");
    training.save(&training_path).unwrap();
    testing.save(&testing_path).unwrap();

    (training_path, testing_path)
}

#[test]
fn evaluate_counts_correct_predictions() {
    let dir = TempDir::new().unwrap();
    let (training, testing) = write_datasets(&dir);

    let config = EvalConfig::new(training, testing).with_workers(nz(2));
    assert_eq!(evaluate(config).unwrap(), 3);
}

#[test]
fn result_does_not_depend_on_the_worker_count() {
    let dir = TempDir::new().unwrap();
    let (training, testing) = write_datasets(&dir);

    for workers in 1..=7 {
        let config = EvalConfig::new(&training, &testing).with_workers(nz(workers));
        assert_eq!(evaluate(config).unwrap(), 3, "workers={workers}");
    }
}

#[test]
fn metric_prefix_selects_cosine() {
    let dir = TempDir::new().unwrap();
    let training = Dataset::new(array![[1.0, 0.0], [0.0, 1.0]], vec![0, 1]).unwrap();
    // Far away along the first axis but pointing the same way.
    let testing = Dataset::new(array![[90.0, 1.0], [1.0, 80.0]], vec![0, 1]).unwrap();

    let training_path = dir.path().join("train.bin");
    let testing_path = dir.path().join("test.bin");
    training.save(&training_path).unwrap();
    testing.save(&testing_path).unwrap();

    let config = EvalConfig::new(training_path, testing_path)
        .with_workers(nz(2))
        .with_metric("cos");
    assert_eq!(evaluate(config).unwrap(), 2);
}

#[test]
fn empty_metric_selects_euclidean() {
    let dir = TempDir::new().unwrap();
    let (training, testing) = write_datasets(&dir);

    let config = EvalConfig::new(training, testing)
        .with_workers(nz(2))
        .with_metric("");
    assert_eq!(evaluate(config).unwrap(), 3);
}

#[test]
fn unknown_metric_fails_before_loading() {
    let config = EvalConfig::new("/does/not/exist", "/does/not/exist").with_metric("manhattan");

    match evaluate(config).unwrap_err() {
        OrchestratorError::InvalidConfig(msg) => assert!(msg.contains("manhattan")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_dataset_names_its_path() {
    let dir = TempDir::new().unwrap();
    let (training, _) = write_datasets(&dir);
    let missing = dir.path().join("missing.bin");

    let err = evaluate(EvalConfig::new(training, &missing)).unwrap_err();
    assert!(matches!(err, OrchestratorError::Dataset(KnnErr::Io { .. })));
    assert!(err.to_string().contains("missing.bin"));
}

#[test]
fn feature_widths_must_match() {
    let dir = TempDir::new().unwrap();
    let (training, _) = write_datasets(&dir);

    let wide = Dataset::new(array![[1.0, 2.0, 3.0]], vec![0]).unwrap();
    let wide_path = dir.path().join("wide.bin");
    wide.save(&wide_path).unwrap();

    let err = evaluate(EvalConfig::new(training, wide_path)).unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
}

#[test]
fn empty_training_set_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (_, testing) = write_datasets(&dir);

    let empty = Dataset::new(ndarray::Array2::zeros((0, 2)), Vec::new()).unwrap();
    let empty_path = dir.path().join("empty.bin");
    empty.save(&empty_path).unwrap();

    let err = evaluate(EvalConfig::new(empty_path, testing)).unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
}
