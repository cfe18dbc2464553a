// ABOUTME: Depth-limited CART regression tree grown by greedy variance reduction
// ABOUTME: Shared building block of the gradient boosting and random forest regressors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::features::{FeatureRow, FEATURE_COUNT};

/// Nodes with fewer samples are never split
const MIN_SAMPLES_SPLIT: usize = 2;

/// Node of a flattened regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples
    Leaf {
        /// Predicted value
        value: f64,
    },
    /// Internal node routing `row[feature] <= threshold` to `left`
    Split {
        /// Feature index
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Index of the left child
        left: usize,
        /// Index of the right child
        right: usize,
    },
}

/// Regression tree stored as a node vector, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
}

impl RegressionTree {
    /// Fit a tree on the samples named by `indices` (duplicates allowed)
    #[must_use]
    pub fn fit(
        rows: &[FeatureRow],
        targets: &[f64],
        mut indices: Vec<usize>,
        max_depth: usize,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if indices.is_empty() {
            tree.nodes.push(TreeNode::Leaf { value: 0.0 });
        } else {
            tree.grow(rows, targets, &mut indices, 0, max_depth);
        }
        tree
    }

    /// Predict a single row
    #[must_use]
    pub fn predict(&self, row: &FeatureRow) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn grow(
        &mut self,
        rows: &[FeatureRow],
        targets: &[f64],
        indices: &mut [usize],
        depth: usize,
        max_depth: usize,
    ) -> usize {
        let node = self.nodes.len();
        let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(TreeNode::Leaf { value: mean });

        if depth >= max_depth || indices.len() < MIN_SAMPLES_SPLIT {
            return node;
        }
        let Some(split) = best_split(rows, targets, indices) else {
            return node;
        };

        indices.sort_by(|a, b| rows[*a][split.feature].total_cmp(&rows[*b][split.feature]));
        let boundary = indices.partition_point(|&i| rows[i][split.feature] <= split.threshold);
        let (left_indices, right_indices) = indices.split_at_mut(boundary);

        let left = self.grow(rows, targets, left_indices, depth + 1, max_depth);
        let right = self.grow(rows, targets, right_indices, depth + 1, max_depth);
        self.nodes[node] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }
}

/// Split maximising `sum_l²/n_l + sum_r²/n_r`, equivalent to the largest SSE reduction
fn best_split(rows: &[FeatureRow], targets: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let parent_score = total * total / n;

    let mut best: Option<(f64, BestSplit)> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..FEATURE_COUNT {
        sorted.sort_by(|a, b| rows[*a][feature].total_cmp(&rows[*b][feature]));

        let mut left_sum = 0.0;
        for position in 1..sorted.len() {
            left_sum += targets[sorted[position - 1]];
            let lower = rows[sorted[position - 1]][feature];
            let upper = rows[sorted[position]][feature];
            if lower >= upper {
                continue;
            }

            let left_n = position as f64;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_n + right_sum * right_sum / (n - left_n);
            let to_beat = best
                .as_ref()
                .map_or(parent_score * (1.0 + 1e-12), |(current, _)| *current);
            if score > to_beat {
                best = Some((
                    score,
                    BestSplit {
                        feature,
                        threshold: lower + (upper - lower) / 2.0,
                    },
                ));
            }
        }
    }

    best.map(|(_, split)| split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<FeatureRow>, Vec<f64>) {
        let rows: Vec<FeatureRow> = (0..20).map(|i| [f64::from(i), 0.0, 0.0, 0.0]).collect();
        let targets = (0..20).map(|i| if i < 10 { 1.0 } else { 3.0 }).collect();
        (rows, targets)
    }

    #[test]
    fn test_tree_learns_step_function() {
        let (rows, targets) = step_data();
        let tree = RegressionTree::fit(&rows, &targets, (0..20).collect(), 3);
        assert!((tree.predict(&[2.0, 0.0, 0.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((tree.predict(&[15.0, 0.0, 0.0, 0.0]) - 3.0).abs() < 1e-12);
        // A pure split needs no further nodes
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_depth_zero_is_mean() {
        let (rows, targets) = step_data();
        let tree = RegressionTree::fit(&rows, &targets, (0..20).collect(), 0);
        assert_eq!(tree.node_count(), 1);
        assert!((tree.predict(&[0.0; 4]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_features_do_not_split() {
        let rows = vec![[1.0; 4]; 5];
        let targets = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let tree = RegressionTree::fit(&rows, &targets, (0..5).collect(), 4);
        assert_eq!(tree.node_count(), 1);
    }
}
