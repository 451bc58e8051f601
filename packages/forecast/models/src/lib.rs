#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Serialized classifier artifact and forecast result types.
//!
//! The classifier is a random forest produced by the offline training
//! job and shipped as JSON: an ordered class label list plus an array of
//! trees, each a flat node array walked from index 0. The companion
//! column artifact (the ordered one-hot feature-column names the forest
//! was trained on) is a plain JSON string array.
//!
//! Inference here is pure data traversal; artifact loading and feature
//! synthesis live in `delit_forecast`.

use serde::{Deserialize, Serialize};

/// One node of a serialized decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: go left when `features[feature] <= threshold`.
    Split {
        /// Index into the trained feature-column schema.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Node index of the left child.
        left: usize,
        /// Node index of the right child.
        right: usize,
    },
    /// Leaf holding per-class training sample counts, aligned with the
    /// forest's class list.
    Leaf {
        /// Per-class sample counts.
        counts: Vec<f64>,
    },
}

/// A decision tree as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree nodes; child indices point into this array.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walks the tree for one feature vector and returns the leaf's
    /// normalized class distribution.
    ///
    /// Returns `None` for a malformed tree (dangling child index, cycle
    /// longer than the node count, empty or all-zero leaf).
    #[must_use]
    pub fn distribution(&self, features: &[f64]) -> Option<Vec<f64>> {
        let mut node = self.nodes.first()?;
        // A well-formed tree reaches a leaf in fewer steps than it has
        // nodes.
        for _ in 0..self.nodes.len() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied()?;
                    let next = if value <= *threshold { *left } else { *right };
                    node = self.nodes.get(next)?;
                }
                TreeNode::Leaf { counts } => {
                    let total: f64 = counts.iter().sum();
                    if counts.is_empty() || total <= 0.0 {
                        return None;
                    }
                    return Some(counts.iter().map(|c| c / total).collect());
                }
            }
        }
        None
    }
}

/// A random-forest classifier: class labels plus trees whose leaf
/// distributions are averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomForest {
    /// Ordered class labels; leaf count vectors align with this.
    pub classes: Vec<String>,
    /// The trees of the ensemble.
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Averaged class probabilities for one feature vector, aligned
    /// with [`Self::classes`].
    ///
    /// Returns `None` when the forest has no classes, no well-formed
    /// tree, or a leaf whose count vector does not match the class
    /// count.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64]) -> Option<Vec<f64>> {
        if self.classes.is_empty() {
            return None;
        }

        let mut sums = vec![0.0; self.classes.len()];
        let mut voting_trees: u32 = 0;
        for tree in &self.trees {
            let distribution = tree.distribution(features)?;
            if distribution.len() != self.classes.len() {
                return None;
            }
            for (sum, p) in sums.iter_mut().zip(&distribution) {
                *sum += p;
            }
            voting_trees += 1;
        }

        if voting_trees == 0 {
            return None;
        }
        for sum in &mut sums {
            *sum /= f64::from(voting_trees);
        }
        Some(sums)
    }

    /// The class with the highest averaged probability; ties break
    /// toward the lower class index.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> Option<&str> {
        let probabilities = self.predict_proba(features)?;
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        self.classes.get(best).map(String::as_str)
    }
}

/// The pair of read-only artifacts the forecast adapter consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifacts {
    /// The trained forest.
    pub forest: RandomForest,
    /// The exact ordered one-hot feature-column names the forest was
    /// trained on.
    pub feature_columns: Vec<String>,
}

/// One class with its normalized probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassProbability {
    /// Class label.
    pub label: String,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

/// A point forecast with its probability ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Top-1 predicted crime type.
    pub label: String,
    /// Classes ranked by descending probability (truncated for
    /// display).
    pub probabilities: Vec<ClassProbability>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A stump on feature 0: left leaf favors class 0, right leaf
    /// class 1.
    fn stump(threshold: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    counts: vec![3.0, 1.0],
                },
                TreeNode::Leaf {
                    counts: vec![0.0, 4.0],
                },
            ],
        }
    }

    fn forest() -> RandomForest {
        RandomForest {
            classes: vec!["Furto".into(), "Roubo".into()],
            trees: vec![stump(0.5), stump(0.75)],
        }
    }

    #[test]
    fn tree_walk_splits_on_threshold() {
        let tree = stump(0.5);
        assert_eq!(tree.distribution(&[0.0]), Some(vec![0.75, 0.25]));
        assert_eq!(tree.distribution(&[1.0]), Some(vec![0.0, 1.0]));
        // Boundary goes left.
        assert_eq!(tree.distribution(&[0.5]), Some(vec![0.75, 0.25]));
    }

    #[test]
    fn forest_averages_tree_distributions() {
        let forest = forest();
        let probabilities = forest.predict_proba(&[0.6]).unwrap();
        // First stump sends 0.6 right (0,1); second sends it left
        // (0.75,0.25); average is (0.375, 0.625).
        assert!((probabilities[0] - 0.375).abs() < 1e-12);
        assert!((probabilities[1] - 0.625).abs() < 1e-12);
        assert_eq!(forest.predict(&[0.6]), Some("Roubo"));
        assert_eq!(forest.predict(&[0.0]), Some("Furto"));
    }

    #[test]
    fn malformed_tree_is_rejected() {
        let dangling = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 9,
                right: 9,
            }],
        };
        assert_eq!(dangling.distribution(&[0.0]), None);

        let forest = RandomForest {
            classes: vec!["Furto".into()],
            trees: vec![dangling],
        };
        assert_eq!(forest.predict_proba(&[0.0]), None);
    }

    #[test]
    fn missing_feature_is_rejected() {
        let tree = stump(0.5);
        assert_eq!(tree.distribution(&[]), None);
    }

    #[test]
    fn artifacts_deserialize_from_json() {
        let json = r#"{
            "forest": {
                "classes": ["Furto", "Roubo"],
                "trees": [
                    { "nodes": [
                        { "kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                        { "kind": "leaf", "counts": [3.0, 1.0] },
                        { "kind": "leaf", "counts": [0.0, 4.0] }
                    ] }
                ]
            },
            "featureColumns": ["hora_dia", "bairro_Centro"]
        }"#;
        let artifacts: ModelArtifacts = serde_json::from_str(json).unwrap();
        assert_eq!(artifacts.feature_columns.len(), 2);
        assert_eq!(artifacts.forest.predict(&[0.0, 1.0]), Some("Furto"));
    }
}
