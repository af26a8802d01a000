// Gini decision trees with bootstrap aggregation. Leaves store class
// fractions so the forest yields a probability, not just a label.

pub mod dataset;
pub mod decision_tree;
pub mod node;
pub mod random_forest;

pub use dataset::Dataset;
pub use random_forest::{RandomForest, RandomForestBuilder};
