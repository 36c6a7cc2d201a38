use serde::{Deserialize, Serialize};

use super::{check_width, ModelError, ScoringModel};

/// Node of a binary decision tree. Rows go left when `row[feature] <= threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flattened tree with the root at index 0. Children always sit at a higher
/// index than their parent, which keeps evaluation acyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Nodes are checked when the tree joins a [`ForestModel`].
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!("node {index} splits on column {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} points at invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {index} has a non-finite value"));
                }
                TreeNode::Leaf { .. } => {}
            }
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Tree ensemble averaging the leaf value of every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    input_width: usize,
    trees: Vec<DecisionTree>,
}

impl ForestModel {
    pub fn new(input_width: usize, trees: Vec<DecisionTree>) -> Result<Self, ModelError> {
        let model = Self { input_width, trees };
        model.validate()?;
        Ok(model)
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidParameters(
                "forest has no trees".to_string(),
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.input_width).map_err(|detail| {
                ModelError::InvalidParameters(format!("tree {index}: {detail}"))
            })?;
        }
        Ok(())
    }
}

impl ScoringModel for ForestModel {
    fn kind(&self) -> &'static str {
        "forest"
    }

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn score(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        // Deserialized forests have not been through `new`.
        self.validate()?;
        check_width(rows, self.input_width)?;
        let count = self.trees.len() as f64;
        Ok(rows
            .iter()
            .map(|row| self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>() / count)
            .collect())
    }
}
