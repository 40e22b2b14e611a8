use std::{f64::consts::PI, fmt, str::FromStr};

use ndarray::ArrayView1;

use crate::error::{KnnErr, Result};

/// The registry of distance functions between two feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Euclidean,
    Cosine,
}

impl Distance {
    /// Every registered metric, in resolution order.
    pub const ALL: [Distance; 2] = [Distance::Euclidean, Distance::Cosine];

    /// The registry key of the metric.
    pub fn name(self) -> &'static str {
        match self {
            Distance::Euclidean => "euclidean",
            Distance::Cosine => "cosine",
        }
    }

    /// Finds the metric whose key starts with `name`.
    ///
    /// Matching is case sensitive and uses the length of `name`, so `"e"` and
    /// `"eucl"` resolve to euclidean while `"euclidean2"` resolves to nothing.
    /// Keys are tried in registry order, so the empty name resolves to the
    /// first one.
    ///
    /// # Errors
    /// Returns `UnknownMetric` if `name` prefixes no key.
    pub fn resolve(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.name().starts_with(name))
            .ok_or_else(|| KnnErr::UnknownMetric(name.to_string()))
    }

    /// Computes the distance between `a` and `b`.
    ///
    /// Both vectors must have the same length.
    pub fn measure(self, a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
        match self {
            Distance::Euclidean => euclidean(a, b),
            Distance::Cosine => cosine(a, b),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distance {
    type Err = KnnErr;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

fn euclidean(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Angular distance in `[0, 2]`, zero for vectors pointing the same way.
fn cosine(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    match (norm_a == 0.0, norm_b == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => 1.0,
        (false, false) => {
            let similarity = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
            2.0 * similarity.acos() / PI
        }
    }
}
