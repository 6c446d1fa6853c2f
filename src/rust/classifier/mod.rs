mod error;
mod encoder;
mod encoding;
mod model;
mod classifier;
pub mod builder;
mod utils;

use crate::catalog::Feature;

pub use error::{ClassifierError, FormatError};
pub use encoder::{CategoryEncoder, EncoderSet, LabelEncoder};
pub use encoding::{encode, predict, EncodedVector};
pub use model::{DecisionTree, Model, TreeArrays, TreeFile, Verdict};
pub use classifier::Classifier;
pub use builder::ClassifierBuilder;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the model file, if loaded from disk
    pub model_path: Option<String>,
    /// Path to the encoders file, if loaded from disk
    pub encoders_path: Option<String>,
    /// Columns in the order the model consumes them
    pub feature_order: Vec<Feature>,
    /// Model summary, e.g. node count and depth
    pub model_description: String,
    /// Number of codes each feature's encoder knows
    pub encoder_sizes: Vec<(Feature, usize)>,
}
