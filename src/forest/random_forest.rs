use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::forest::dataset::Dataset;
use crate::forest::decision_tree::{DecisionTree, DecisionTreeBuilder};

pub struct RandomForestBuilder {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for RandomForestBuilder {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 8,
            seed: 42,
        }
    }
}

impl RandomForestBuilder {
    pub fn fit(&self, dataset: &Dataset) -> RandomForest {
        let max_features = (dataset.features_len() as f64).sqrt().ceil() as usize;

        let trees = self
            .tree_seeds()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let builder = DecisionTreeBuilder {
                    max_depth: self.max_depth,
                    max_features,
                };
                let bootstrapped = dataset.bootstrap(&mut rng);
                builder.fit(&mut rng, &bootstrapped)
            })
            .collect::<Vec<_>>();

        RandomForest { trees }
    }

    /// Per-tree seeds derived from the root seed so a forest is
    /// reproducible end to end.
    fn tree_seeds(&self) -> impl Iterator<Item = u64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.n_trees).map(move |_| rng.gen())
    }
}

pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Mean of the per-tree leaf fractions: the probability that the
    /// sample belongs to the low-risk class.
    pub fn probability(&self, x: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let total: f64 = self.trees.iter().map(|tree| tree.probability(x)).sum();
        total / self.trees.len() as f64
    }

    #[allow(dead_code)]
    pub fn predict(&self, x: &[f64]) -> f64 {
        if self.probability(x) >= 0.5 {
            1.0
        } else {
            0.0
        }
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u16::<BigEndian>(self.trees.len() as u16)?;
        for tree in &self.trees {
            tree.encode(writer)?;
        }
        Ok(())
    }

    // The serving path never loads the artifact back; the decoder
    // documents the format and backs the round-trip tests.
    #[allow(dead_code)]
    pub fn decode<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let len = reader.read_u16::<BigEndian>()?;
        let trees = (0..len)
            .map(|_| DecisionTree::decode(reader))
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self { trees })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_set() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.push(&[10_000.0, 2.0], 0.0);
        dataset.push(&[50_000.0, 5.0], 1.0);
        dataset
    }

    fn fitted() -> RandomForest {
        RandomForestBuilder::default().fit(&training_set())
    }

    #[test]
    fn recovers_training_labels() {
        let forest = fitted();
        assert_eq!(forest.predict(&[10_000.0, 2.0]), 0.0);
        assert_eq!(forest.predict(&[50_000.0, 5.0]), 1.0);
    }

    #[test]
    fn probability_orders_the_training_points() {
        let forest = fitted();
        let low = forest.probability(&[10_000.0, 2.0]);
        let high = forest.probability(&[50_000.0, 5.0]);

        assert!(low < 0.5, "expected high-risk point below 0.5, got {}", low);
        assert!(high > 0.5, "expected low-risk point above 0.5, got {}", high);
        assert!((0.0..=1.0).contains(&low));
        assert!((0.0..=1.0).contains(&high));
    }

    #[test]
    fn same_seed_fits_identical_forests() {
        let dataset = training_set();
        let a = RandomForestBuilder::default().fit(&dataset);
        let b = RandomForestBuilder::default().fit(&dataset);

        for x in [[10_000.0, 2.0], [25_000.0, 3.0], [50_000.0, 5.0]] {
            assert_eq!(a.probability(&x), b.probability(&x));
        }
    }

    #[test]
    fn encode_decode_preserves_predictions() {
        let forest = fitted();
        let mut buffer = Vec::new();
        forest.encode(&mut buffer).unwrap();

        let decoded = RandomForest::decode(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded.len(), forest.len());
        for x in [[10_000.0, 2.0], [30_000.0, 3.5], [50_000.0, 5.0]] {
            assert_eq!(decoded.probability(&x), forest.probability(&x));
        }
    }
}
