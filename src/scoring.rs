use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::forest::{Dataset, RandomForest, RandomForestBuilder};

/// Upper bound of the score range, by analogy to a credit score.
pub const SCORE_CEILING: f64 = 850.0;

/// The fixed training set: (income, credit_history in years) with
/// label 0 = high risk, 1 = low risk.
const TRAINING_SET: [([f64; 2], f64); 2] = [
    ([10_000.0, 2.0], 0.0),
    ([50_000.0, 5.0], 1.0),
];

#[derive(Debug, Clone, Deserialize)]
pub struct LoanApplication {
    pub income: f64,
    pub credit_history: f64,
}

impl LoanApplication {
    fn features(&self) -> [f64; 2] {
        [self.income, self.credit_history]
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScoreError {
    NonFiniteFeature(&'static str),
    EmptyModel,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::NonFiniteFeature(field) => {
                write!(f, "feature '{}' is not a finite number", field)
            }
            ScoreError::EmptyModel => write!(f, "model has no fitted trees"),
        }
    }
}

impl std::error::Error for ScoreError {}

/// The fitted classifier, immutable for the lifetime of the process.
/// Built once in the composition root and shared by handlers.
pub struct RiskModel {
    forest: RandomForest,
}

impl RiskModel {
    pub fn fit(config: &ServiceConfig) -> Self {
        let mut dataset = Dataset::new();
        for (features, label) in &TRAINING_SET {
            dataset.push(features, *label);
        }

        let forest = RandomForestBuilder {
            n_trees: config.n_trees,
            max_depth: config.max_depth,
            seed: config.seed,
        }
        .fit(&dataset);

        RiskModel { forest }
    }

    pub fn tree_count(&self) -> usize {
        self.forest.len()
    }

    /// Writes the fitted forest to disk. The serving path never reads
    /// it back; the artifact exists for external consumers.
    pub fn persist(&self, path: &Path) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.forest.encode(&mut writer)
    }

    /// Probability of the low-risk class, rescaled to an integer score
    /// in [0, 850].
    pub fn score(&self, application: &LoanApplication) -> Result<u32, ScoreError> {
        if !application.income.is_finite() {
            return Err(ScoreError::NonFiniteFeature("income"));
        }
        if !application.credit_history.is_finite() {
            return Err(ScoreError::NonFiniteFeature("credit_history"));
        }
        if self.forest.is_empty() {
            return Err(ScoreError::EmptyModel);
        }

        let probability = self.forest.probability(&application.features());
        Ok((probability * SCORE_CEILING).floor() as u32)
    }
}
