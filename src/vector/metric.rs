//! Distance metrics for comparing two vectors of equal dimension.
//!
//! All functions here are pure. Accumulation is plain `f64` summation; when
//! squared components overflow or underflow, the operands are rescaled by
//! their largest absolute component and the sums are taken again.
//!
//! Every returned score is finite, and `-0.0` is normalised to `0.0`.

use crate::vector::types::VectorError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

fn check_operands(a: &[f64], b: &[f64]) -> Result<(), VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Err(VectorError::EmptyVector);
    }
    Ok(())
}

fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn magnitude(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |max, x| max.max(x.abs()))
}

fn finite_score(score: f64) -> Result<f64, VectorError> {
    if score.is_finite() {
        // Folds -0.0 into 0.0
        Ok(score + 0.0)
    } else {
        Err(VectorError::NonFiniteScore)
    }
}

/// Cosine over operands scaled into `[-1, 1]`, which cannot overflow.
fn scaled_cosine(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    let (scale_a, scale_b) = (max_abs(a), max_abs(b));
    if scale_a == 0.0 || scale_b == 0.0 {
        return Err(VectorError::ZeroMagnitude);
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| (x / scale_a) * (y / scale_b)).sum();
    let mag_a = a.iter().map(|x| (x / scale_a).powi(2)).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|y| (y / scale_b).powi(2)).sum::<f64>().sqrt();
    Ok(dot / (mag_a * mag_b))
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`, in `[-1, 1]`.
///
/// # Errors
/// - `DimensionMismatch` if the lengths differ
/// - `EmptyVector` if the vectors have no components
/// - `ZeroMagnitude` if either norm is zero
/// - `NonFiniteScore` if an operand holds NaN or an infinity
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    check_operands(a, b)?;

    let denominator = magnitude(a) * magnitude(b);
    let dot = dot_product(a, b);
    let similarity = if denominator.is_normal() && dot.is_finite() {
        dot / denominator
    } else {
        scaled_cosine(a, b)?
    };

    // Rounding can push |a.b| a hair past |a||b|
    finite_score(similarity.clamp(-1.0, 1.0))
}

/// Euclidean (L2) distance `sqrt(sum((a_i - b_i)^2))`.
///
/// All-zero operands are valid here.
///
/// # Errors
/// `NonFiniteScore` when the distance itself exceeds `f64::MAX`.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
    check_operands(a, b)?;

    let squared: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    if squared.is_finite() {
        return finite_score(squared.sqrt());
    }

    let scale = max_abs(a).max(max_abs(b));
    let scaled: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x / scale - y / scale).powi(2))
        .sum();
    finite_score(scale * scaled.sqrt())
}

/// Metric used to rank stored vectors against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    /// Raw metric value between `a` and `b`.
    pub fn evaluate(self, a: &[f64], b: &[f64]) -> Result<f64, VectorError> {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Euclidean => euclidean_distance(a, b),
        }
    }

    /// Orders two raw values so that `Greater` means "closer to the query".
    ///
    /// `0.0` and `-0.0` rank equal.
    pub fn rank(self, a: f64, b: f64) -> Ordering {
        let (a, b) = (a + 0.0, b + 0.0);
        match self {
            Self::Cosine => a.total_cmp(&b),
            Self::Euclidean => b.total_cmp(&a),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" | "l2" => Ok(Self::Euclidean),
            other => Err(format!(
                "unknown distance metric '{other}', expected 'cosine' or 'euclidean'"
            )),
        }
    }
}
