//! Classifies mushrooms as edible or poisonous from six categorical features.
//!
//! The model is a decision tree trained offline on the mushroom dataset and
//! shipped, together with the per-feature label encoders, as JSON artifacts.
//! This crate maps human-readable choices to dataset codes, encodes them, and
//! runs the tree.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mushroom_classifier::{Classifier, Selection, Verdict};
//!
//! let classifier = Classifier::builder()
//!     .with_artifacts_dir("model")
//!     .build()?;
//!
//! let selection = Selection::builder()
//!     .odor("foul")
//!     .gill_size("narrow")
//!     .gill_color("buff")
//!     .spore_print_color("chocolate")
//!     .population("several")
//!     .stalk_surface_above_ring("smooth")
//!     .build()?;
//!
//! let verdict = classifier.predict(&selection)?;
//! assert_eq!(verdict, Verdict::Poisonous);
//! # Ok(())
//! # }
//! ```
//!
//! # Options
//!
//! Every feature has a closed list of values:
//!
//! ```
//! use mushroom_classifier::Feature;
//!
//! let sizes: Vec<&str> = Feature::GillSize.options().collect();
//! assert_eq!(sizes, ["broad", "narrow"]);
//! assert_eq!(Feature::Odor.code_for("none").unwrap(), 'n');
//! ```
//!
//! # Thread Safety
//!
//! Artifacts are loaded once per configuration and shared read-only, so a
//! [`Classifier`] can be cloned or wrapped in `Arc` and used from any thread.

pub mod artifact_store;
pub mod catalog;
pub mod classifier;
mod runtime;
pub mod selection;

pub use artifact_store::{ArtifactConfig, ArtifactDigests, ArtifactStore, LoadedArtifacts};
pub use catalog::{Feature, FeatureOption};
pub use classifier::{
    encode, predict, CategoryEncoder, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo,
    DecisionTree, EncodedVector, EncoderSet, FormatError, LabelEncoder, Model, Verdict,
};
pub use runtime::{global_store, shared_store};
pub use selection::{Selection, SelectionBuilder};

pub fn init_logger() {
    env_logger::init();
}
