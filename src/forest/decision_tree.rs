use std::io::{Read, Write};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::forest::dataset::{gini, Dataset};
use crate::forest::node::Node;

#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    pub fn probability(&self, x: &[f64]) -> f64 {
        self.root.probability(x)
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.root.encode(writer)
    }

    pub fn decode<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Self {
            root: Node::decode(reader)?,
        })
    }
}

pub struct DecisionTreeBuilder {
    pub max_depth: usize,
    pub max_features: usize,
}

impl DecisionTreeBuilder {
    pub fn fit<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset) -> DecisionTree {
        DecisionTree {
            root: self.grow(rng, dataset, 1),
        }
    }

    fn grow<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset, depth: usize) -> Node {
        if depth > self.max_depth || dataset.len() < 2 || dataset.is_pure() {
            return Node::Leaf(dataset.positive_fraction());
        }

        match self.best_split(rng, dataset) {
            Some((feature, threshold)) => {
                let (left, right) = dataset.partition(feature, threshold);
                // A candidate threshold always separates at least one
                // row from the rest, so neither side is empty.
                Node::Split {
                    feature,
                    threshold,
                    left: Box::new(self.grow(rng, &left, depth + 1)),
                    right: Box::new(self.grow(rng, &right, depth + 1)),
                }
            }
            None => Node::Leaf(dataset.positive_fraction()),
        }
    }

    fn best_split<R: Rng + ?Sized>(&self, rng: &mut R, dataset: &Dataset) -> Option<(usize, f64)> {
        let impurity = gini(dataset.labels());

        let mut features = (0..dataset.features_len()).collect::<Vec<_>>();
        features.shuffle(rng);
        features.truncate(self.max_features.max(1));

        let mut best: Option<(usize, f64)> = None;
        let mut best_gain = 0.0;

        for &feature in &features {
            for threshold in dataset.split_candidates(feature) {
                let (left, right) = dataset.partition(feature, threshold);
                let ratio_left = left.len() as f64 / dataset.len() as f64;
                let ratio_right = 1.0 - ratio_left;

                let gain = impurity
                    - (ratio_left * gini(left.labels()) + ratio_right * gini(right.labels()));

                if gain > best_gain {
                    best = Some((feature, threshold));
                    best_gain = gain;
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn separable() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.push(&[10_000.0, 2.0], 0.0);
        dataset.push(&[50_000.0, 5.0], 1.0);
        dataset
    }

    #[test]
    fn fits_separable_points_exactly() {
        let dataset = separable();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTreeBuilder {
            max_depth: 8,
            max_features: 2,
        }
        .fit(&mut rng, &dataset);

        assert_eq!(tree.probability(&[10_000.0, 2.0]), 0.0);
        assert_eq!(tree.probability(&[50_000.0, 5.0]), 1.0);
    }

    #[test]
    fn depth_limit_yields_fraction_leaf() {
        let dataset = separable();
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTreeBuilder {
            max_depth: 0,
            max_features: 2,
        }
        .fit(&mut rng, &dataset);

        assert!((tree.probability(&[25_000.0, 3.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_data_never_splits() {
        let mut dataset = Dataset::new();
        dataset.push(&[1.0, 1.0], 1.0);
        dataset.push(&[2.0, 2.0], 1.0);

        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTreeBuilder {
            max_depth: 8,
            max_features: 2,
        }
        .fit(&mut rng, &dataset);

        assert_eq!(tree.probability(&[100.0, 100.0]), 1.0);
    }
}
