//! In-memory labeled item sets and their on-disk binary format.
//!
//! All integers are little-endian:
//!
//! ```text
//! u32 num_items
//! u32 num_features
//! num_items x { u8 label, num_features x u8 feature }
//! ```

use std::{fs, path::Path};

use log::debug;
use ndarray::{Array2, ArrayView1};

use crate::error::{KnnErr, Result};

const COUNT_SIZE: usize = size_of::<u32>();

/// An ordered, immutable set of labeled feature vectors.
///
/// Every item has the same amount of features. Rows of `features` are items.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f32>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Creates a new dataset from owned buffers.
    ///
    /// # Args
    /// * `features` - One row per item.
    /// * `labels` - One label per item.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the amount of rows and labels differ or if the
    /// items have no features at all.
    pub fn new(features: Array2<f32>, labels: Vec<u8>) -> Result<Self> {
        let (rows, cols) = features.dim();

        if rows != labels.len() {
            return Err(KnnErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: rows,
            });
        }

        if cols == 0 {
            return Err(KnnErr::ShapeMismatch {
                what: "features",
                got: 0,
                expected: 1,
            });
        }

        Ok(Self { features, labels })
    }

    /// Reads a dataset from `path`.
    ///
    /// # Errors
    /// Returns `Io` if the file can't be read and `Malformed` if its contents
    /// don't follow the binary format.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| KnnErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::decode(&bytes).map_err(|detail| KnnErr::Malformed {
            path: path.to_path_buf(),
            detail,
        })?;

        debug!(
            items = dataset.len(),
            features = dataset.num_features();
            "loaded {}", path.display()
        );
        Ok(dataset)
    }

    /// Writes the dataset to `path` using the binary format.
    ///
    /// # Errors
    /// Returns `Malformed` if a feature isn't a whole number in `0..=255` and
    /// `Write` if the file can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode().map_err(|detail| KnnErr::Malformed {
            path: path.to_path_buf(),
            detail,
        })?;

        fs::write(path, bytes).map_err(|source| KnnErr::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Returns the features of the item at `index` (panics if out of bounds).
    #[inline]
    pub fn features(&self, index: usize) -> ArrayView1<'_, f32> {
        self.features.row(index)
    }

    /// Returns the label of the item at `index` (panics if out of bounds).
    #[inline]
    pub fn label(&self, index: usize) -> u8 {
        self.labels[index]
    }

    /// Returns the features and label of the item at `index` (panics if out of bounds).
    #[inline]
    pub fn item(&self, index: usize) -> (ArrayView1<'_, f32>, u8) {
        (self.features(index), self.label(index))
    }

    /// Iterates over every `(features, label)` pair in order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f32>, u8)> {
        self.features
            .rows()
            .into_iter()
            .zip(self.labels.iter().copied())
    }

    fn decode(bytes: &[u8]) -> std::result::Result<Self, String> {
        let (num_items, rest) = read_count(bytes).ok_or("missing item count")?;
        let (num_features, rest) = read_count(rest).ok_or("missing feature count")?;

        if num_features == 0 {
            return Err("items must have at least one feature".into());
        }

        let record = num_features + 1;
        let expected = num_items
            .checked_mul(record)
            .ok_or_else(|| format!("{num_items} items of {num_features} features overflow"))?;

        if rest.len() != expected {
            return Err(format!(
                "expected {expected} bytes for {num_items} items, found {}",
                rest.len()
            ));
        }

        let mut labels = Vec::with_capacity(num_items);
        let mut data = Vec::with_capacity(num_items * num_features);

        for chunk in rest.chunks_exact(record) {
            labels.push(chunk[0]);
            data.extend(chunk[1..].iter().copied().map(f32::from));
        }

        let features =
            Array2::from_shape_vec((num_items, num_features), data).map_err(|e| e.to_string())?;

        Ok(Self { features, labels })
    }

    fn encode(&self) -> std::result::Result<Vec<u8>, String> {
        let num_items = u32::try_from(self.len()).map_err(|e| e.to_string())?;
        let num_features = u32::try_from(self.num_features()).map_err(|e| e.to_string())?;

        let mut buf =
            Vec::with_capacity(2 * COUNT_SIZE + self.len() * (self.num_features() + 1));
        buf.extend_from_slice(&num_items.to_le_bytes());
        buf.extend_from_slice(&num_features.to_le_bytes());

        for (index, (features, label)) in self.iter().enumerate() {
            buf.push(label);
            for &value in features {
                if !(0.0..=255.0).contains(&value) || value.fract() != 0.0 {
                    return Err(format!(
                        "item {index} has feature {value}, only whole numbers in 0..=255 fit"
                    ));
                }
                buf.push(value as u8);
            }
        }

        Ok(buf)
    }
}

fn read_count(buf: &[u8]) -> Option<(usize, &[u8])> {
    let (head, rest) = buf.split_first_chunk::<COUNT_SIZE>()?;
    Some((u32::from_le_bytes(*head) as usize, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Dataset {
        Dataset::new(array![[0.0, 1.0], [255.0, 7.0], [3.0, 3.0]], vec![1, 0, 9]).unwrap()
    }

    #[test]
    fn dataset_basic() {
        let ds = sample();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.num_features(), 2);
        assert_eq!(ds.features(1).to_vec(), vec![255.0, 7.0]);
        assert_eq!(ds.label(2), 9);
        assert_eq!(ds.iter().count(), 3);

        let (features, label) = ds.item(0);
        assert_eq!(features.to_vec(), vec![0.0, 1.0]);
        assert_eq!(label, 1);
    }

    #[test]
    fn new_rejects_label_count_mismatch() {
        let err = Dataset::new(array![[1.0], [2.0]], vec![0]).unwrap_err();
        assert!(matches!(err, KnnErr::ShapeMismatch { what: "labels", .. }));
    }

    #[test]
    fn save_then_load_keeps_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.bin");

        let ds = sample();
        ds.save(&path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &3u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..11], &[1, 0, 1]);

        assert_eq!(Dataset::load(&path).unwrap(), ds);
    }

    #[test]
    fn load_accepts_empty_item_set() {
        let mut bytes = 0u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&4u32.to_le_bytes());

        let ds = Dataset::decode(&bytes).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.num_features(), 4);
    }

    #[test]
    fn load_rejects_truncated_and_trailing_bytes() {
        let mut bytes = 2u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 10, 1]);
        assert!(Dataset::decode(&bytes).is_err());

        bytes.extend_from_slice(&[20, 99]);
        assert!(Dataset::decode(&bytes).is_err());

        bytes.pop();
        assert!(Dataset::decode(&bytes).is_ok());
    }

    #[test]
    fn load_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");

        let err = Dataset::load(&missing).unwrap_err();
        assert!(matches!(err, KnnErr::Io { .. }));
        assert!(err.to_string().contains("missing.bin"));

        let garbage = dir.path().join("garbage.bin");
        fs::write(&garbage, [1, 2, 3]).unwrap();
        let err = Dataset::load(&garbage).unwrap_err();
        assert!(matches!(err, KnnErr::Malformed { .. }));
        assert!(err.to_string().contains("garbage.bin"));
    }

    #[test]
    fn save_failure_is_not_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let unwritable = dir.path().join("no-such-dir").join("out.bin");

        let err = sample().save(&unwritable).unwrap_err();
        assert!(matches!(err, KnnErr::Write { .. }));

        let msg = err.to_string();
        assert!(msg.contains("could not be written"));
        assert!(msg.contains("out.bin"));
        assert!(!msg.contains("could not be loaded"));
    }

    #[test]
    fn save_rejects_unrepresentable_features() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::new(array![[0.5]], vec![0]).unwrap();
        assert!(ds.save(dir.path().join("x.bin")).is_err());
    }
}
