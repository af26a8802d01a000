use std::collections::HashMap;

use ordered_float::OrderedFloat;
use rand::Rng;

/// Owned training data: one row of feature values per sample, with a
/// 0.0 (high risk) or 1.0 (low risk) label each.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn push(&mut self, row: &[f64], label: f64) {
        if let Some(first) = self.rows.first() {
            debug_assert_eq!(first.len(), row.len());
        }
        self.rows.push(row.to_vec());
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn features_len(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn labels(&self) -> impl Iterator<Item = f64> + '_ {
        self.labels.iter().copied()
    }

    /// Fraction of samples carrying the low-risk label. This is what a
    /// leaf stores when growth stops.
    pub fn positive_fraction(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let positives = self.labels.iter().filter(|&&y| y == 1.0).count();
        positives as f64 / self.labels.len() as f64
    }

    pub fn is_pure(&self) -> bool {
        self.labels
            .windows(2)
            .all(|pair| (pair[0] - pair[1]).abs() < f64::EPSILON)
    }

    /// Sample-with-replacement copy of the same size, one per tree.
    pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut sampled = Self::new();
        for _ in 0..self.len() {
            let i = rng.gen_range(0..self.len());
            sampled.push(&self.rows[i], self.labels[i]);
        }
        sampled
    }

    /// Rows strictly below the threshold go left, the rest right.
    pub fn partition(&self, feature: usize, threshold: f64) -> (Self, Self) {
        let mut left = Self::new();
        let mut right = Self::new();

        for (row, &label) in self.rows.iter().zip(&self.labels) {
            if row[feature] < threshold {
                left.push(row, label);
            } else {
                right.push(row, label);
            }
        }

        (left, right)
    }

    /// Candidate thresholds for a feature: midpoints between adjacent
    /// distinct observed values.
    pub fn split_candidates(&self, feature: usize) -> Vec<f64> {
        let mut values = self
            .rows
            .iter()
            .map(|row| OrderedFloat(row[feature]))
            .collect::<Vec<_>>();
        values.sort();
        values.dedup();

        values
            .windows(2)
            .map(|pair| (pair[0].into_inner() + pair[1].into_inner()) / 2.0)
            .collect()
    }
}

pub fn gini(labels: impl Iterator<Item = f64>) -> f64 {
    let mut histogram: HashMap<OrderedFloat<f64>, usize> = HashMap::new();
    let mut len = 0usize;
    for label in labels {
        *histogram.entry(OrderedFloat(label)).or_default() += 1;
        len += 1;
    }

    if len == 0 {
        return 0.0;
    }

    1.0 - histogram
        .values()
        .map(|&n| (n as f64 / len as f64).powi(2))
        .sum::<f64>()
}
