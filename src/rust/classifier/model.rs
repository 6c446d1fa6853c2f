use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ClassifierError, FormatError};
use super::utils::argmax;
use crate::catalog::Feature;

const SUPPORTED_FORMAT_VERSION: u32 = 1;
const LEAF: i64 = -1;

/// A trained binary classifier over the catalog features.
///
/// The pipeline only ever talks to the model through this trait, so any
/// classifier that can answer for a single encoded row can stand in for the
/// bundled decision tree.
pub trait Model: Send + Sync + fmt::Debug {
    /// Feature columns in the order `predict_raw` expects them.
    fn feature_order(&self) -> &[Feature];

    /// Raw class label for one row laid out in `feature_order()`.
    /// `0` means edible and `1` poisonous; anything else breaks the contract.
    fn predict_raw(&self, row: &[f64]) -> i64;

    /// One-line summary for diagnostics
    fn describe(&self) -> String {
        "custom model".to_string()
    }
}

/// Final classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Edible,
    Poisonous,
}

impl Verdict {
    /// Maps a raw model label to a verdict.
    ///
    /// # Errors
    /// `ModelContractViolation` for any label other than 0 or 1.
    pub fn from_raw(raw: i64) -> Result<Self, ClassifierError> {
        match raw {
            0 => Ok(Self::Edible),
            1 => Ok(Self::Poisonous),
            other => Err(ClassifierError::ModelContractViolation(format!(
                "expected class 0 or 1, model returned {}",
                other
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Edible => "Edible",
            Self::Poisonous => "Poisonous",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// On-disk layout of an exported CART tree: parallel arrays indexed by node id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, one entry per class
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub tree: TreeArrays,
}

fn default_format_version() -> u32 {
    SUPPORTED_FORMAT_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        column: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

/// A validated decision tree, immutable once loaded.
///
/// Every child id is strictly greater than its parent's, which is how exported
/// trees are numbered (depth-first preorder) and guarantees traversal ends.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    feature_order: Vec<Feature>,
    classes: Vec<i64>,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Parses and validates an exported tree.
    pub fn from_json(raw: &str) -> Result<Self, FormatError> {
        let file: TreeFile = serde_json::from_str(raw)?;
        Self::from_tree_file(file)
    }

    pub fn from_tree_file(file: TreeFile) -> Result<Self, FormatError> {
        if file.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(FormatError::Invalid(format!(
                "unsupported format version {} (expected {})",
                file.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        let feature_order = parse_feature_order(&file.feature_names)?;

        if file.classes.is_empty() {
            return Err(FormatError::Invalid("model has no classes".into()));
        }

        let tree = &file.tree;
        let n = tree.children_left.len();
        if n == 0 {
            return Err(FormatError::Invalid("tree has no nodes".into()));
        }
        let lengths = [
            tree.children_right.len(),
            tree.feature.len(),
            tree.threshold.len(),
            tree.value.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(FormatError::Invalid(format!(
                "tree arrays disagree in length: {} nodes vs {:?}",
                n, lengths
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let left = tree.children_left[id];
            let right = tree.children_right[id];

            if left == LEAF {
                if right != LEAF {
                    return Err(FormatError::Invalid(format!(
                        "node {} has a right child but no left child",
                        id
                    )));
                }
                let weights = &tree.value[id];
                if weights.len() != file.classes.len() {
                    return Err(FormatError::Invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        id,
                        weights.len(),
                        file.classes.len()
                    )));
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err(FormatError::Invalid(format!("leaf {} has non-finite weights", id)));
                }
                let best = argmax(weights)
                    .ok_or_else(|| FormatError::Invalid(format!("leaf {} is empty", id)))?;
                nodes.push(Node::Leaf {
                    class: file.classes[best],
                });
                continue;
            }

            let child = |c: i64| -> Result<usize, FormatError> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > id && c < n)
                    .ok_or_else(|| {
                        FormatError::Invalid(format!("node {} points at invalid child {}", id, c))
                    })
            };
            let column = usize::try_from(tree.feature[id])
                .ok()
                .filter(|&c| c < feature_order.len())
                .ok_or_else(|| {
                    FormatError::Invalid(format!(
                        "node {} splits on unknown column {}",
                        id, tree.feature[id]
                    ))
                })?;
            let threshold = tree.threshold[id];
            if !threshold.is_finite() {
                return Err(FormatError::Invalid(format!("node {} has a non-finite threshold", id)));
            }
            nodes.push(Node::Split {
                column,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self {
            feature_order,
            classes: file.classes,
            nodes,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        // Children always follow their parent, so one forward pass suffices
        let mut depth = vec![0usize; self.nodes.len()];
        let mut max = 0;
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                depth[left] = depth[id] + 1;
                depth[right] = depth[id] + 1;
                max = max.max(depth[id] + 1);
            }
        }
        max
    }
}

fn parse_feature_order(names: &[String]) -> Result<Vec<Feature>, FormatError> {
    let mut order = Vec::with_capacity(names.len());
    for name in names {
        let feature = Feature::from_name(name)
            .ok_or_else(|| FormatError::Invalid(format!("model expects unknown feature '{}'", name)))?;
        if order.contains(&feature) {
            return Err(FormatError::Invalid(format!("feature '{}' listed twice", name)));
        }
        order.push(feature);
    }
    if order.len() != Feature::COUNT {
        return Err(FormatError::Invalid(format!(
            "model expects {} features, catalog has {}",
            order.len(),
            Feature::COUNT
        )));
    }
    Ok(order)
}

impl Model for DecisionTree {
    fn feature_order(&self) -> &[Feature] {
        &self.feature_order
    }

    fn predict_raw(&self, row: &[f64]) -> i64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { class } => return class,
                Node::Split {
                    column,
                    threshold,
                    left,
                    right,
                } => {
                    // Missing columns route right, like a NaN would
                    id = match row.get(column) {
                        Some(&x) if x <= threshold => left,
                        _ => right,
                    };
                }
            }
        }
    }

    fn describe(&self) -> String {
        format!(
            "decision tree: {} nodes, depth {}, classes {:?}",
            self.node_count(),
            self.depth(),
            self.classes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &str = r#"["odor", "gill-size", "gill-color", "spore-print-color", "population", "stalk-surface-above-ring"]"#;

    // odor <= 4.5 -> edible, otherwise gill-size <= 0.5 -> edible, else poisonous
    fn small_tree_json() -> String {
        format!(
            r#"{{
                "format_version": 1,
                "feature_names": {NAMES},
                "classes": [0, 1],
                "tree": {{
                    "children_left":  [1, -1, 3, -1, -1],
                    "children_right": [2, -1, 4, -1, -1],
                    "feature":        [0, -2, 1, -2, -2],
                    "threshold":      [4.5, -2.0, 0.5, -2.0, -2.0],
                    "value":          [[5, 5], [4, 0], [1, 5], [1, 0], [0, 5]]
                }}
            }}"#
        )
    }

    #[test]
    fn test_traversal() {
        let tree = DecisionTree::from_json(&small_tree_json()).unwrap();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.predict_raw(&[2.0, 1.0, 0.0, 0.0, 0.0, 0.0]), 0);
        assert_eq!(tree.predict_raw(&[5.0, 0.0, 0.0, 0.0, 0.0, 0.0]), 0);
        assert_eq!(tree.predict_raw(&[5.0, 1.0, 0.0, 0.0, 0.0, 0.0]), 1);
        // Threshold is inclusive on the left
        assert_eq!(tree.predict_raw(&[4.5, 1.0, 0.0, 0.0, 0.0, 0.0]), 0);
    }

    #[test]
    fn test_missing_fields_default_version() {
        let json = small_tree_json().replace(r#""format_version": 1,"#, "");
        assert!(DecisionTree::from_json(&json).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let json = small_tree_json().replace(r#""format_version": 1"#, r#""format_version": 7"#);
        let err = DecisionTree::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported format version 7"));
    }

    #[test]
    fn test_rejects_backward_child() {
        let json = small_tree_json().replace("[2, -1, 4, -1, -1]", "[2, -1, 0, -1, -1]");
        let err = DecisionTree::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let json = small_tree_json().replace("[0, -2, 1, -2, -2]", "[0, -2, 1, -2]");
        assert!(matches!(DecisionTree::from_json(&json), Err(FormatError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_split_column() {
        let json = small_tree_json().replace("[0, -2, 1, -2, -2]", "[0, -2, 6, -2, -2]");
        assert!(DecisionTree::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_bad_feature_names() {
        let json = small_tree_json().replace(r#""population""#, r#""habitat""#);
        let err = DecisionTree::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("habitat"));

        let json = small_tree_json().replace(r#""population""#, r#""odor""#);
        assert!(DecisionTree::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_leaf_weight_shape() {
        let json = small_tree_json().replace("[4, 0]", "[4]");
        assert!(DecisionTree::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(DecisionTree::from_json("{"), Err(FormatError::Json(_))));
    }

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(Verdict::from_raw(0).unwrap(), Verdict::Edible);
        assert_eq!(Verdict::from_raw(1).unwrap(), Verdict::Poisonous);
        assert!(matches!(
            Verdict::from_raw(2),
            Err(ClassifierError::ModelContractViolation(_))
        ));
        assert!(Verdict::from_raw(-1).is_err());
        assert_eq!(Verdict::Poisonous.to_string(), "Poisonous");
    }
}
