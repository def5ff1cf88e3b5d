//! Gradient-boosted regression tree ensemble
//!
//! Each tree is a flat node array with the root at index 0. Split nodes
//! route a row left when `row[feature] < threshold`; a NaN feature follows
//! `default_left`. The ensemble output is `base_score + Σ leaf`.

use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::features::FEATURE_COUNT;

/// One node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

fn default_left() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Check the node array is a well-formed tree over `FEATURE_COUNT` columns.
    ///
    /// Children must point strictly forward so every walk terminates.
    fn validate(&self, tree_idx: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidStructure(format!("tree {tree_idx} has no nodes")));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(ModelError::InvalidStructure(format!(
                            "tree {tree_idx} node {idx}: leaf value {leaf} is not finite"
                        )));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(ModelError::InvalidStructure(format!(
                            "tree {tree_idx} node {idx}: feature index {feature} out of range (0..{FEATURE_COUNT})"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidStructure(format!(
                            "tree {tree_idx} node {idx}: threshold {threshold} is not finite"
                        )));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(ModelError::InvalidStructure(format!(
                                "tree {tree_idx} node {idx}: child {child} must point forward within {} nodes",
                                self.nodes.len()
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { leaf } => return leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = row[feature];
                    idx = if x.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if x < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Additive ensemble of regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.base_score.is_finite() {
            return Err(ModelError::InvalidStructure(format!(
                "base_score {} is not finite",
                self.base_score
            )));
        }
        if self.trees.is_empty() {
            return Err(ModelError::InvalidStructure("ensemble has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    /// Evaluate one row. Assumes `validate()` has passed.
    pub fn evaluate(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(row))
    }
}
