use std::sync::Arc;

use log::info;

use super::encoder::EncoderSet;
use super::encoding::{self, EncodedVector};
use super::error::ClassifierError;
use super::model::{Model, Verdict};
use crate::catalog::Feature;
use crate::selection::Selection;

/// A thread-safe mushroom classifier over a loaded model and encoder set.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the model and encoders are
/// immutable after load and held behind `Arc`, so clones share them.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use mushroom_classifier::{Classifier, Selection};
///
/// let classifier = Classifier::builder()
///     .with_artifacts_dir("model")
///     .build()?;
///
/// let selection = Selection::builder()
///     .odor("none")
///     .gill_size("broad")
///     .gill_color("white")
///     .spore_print_color("brown")
///     .population("solitary")
///     .stalk_surface_above_ring("smooth")
///     .build()?;
/// println!("{}", classifier.predict(&selection)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub(super) model_path: Option<String>,
    pub(super) encoders_path: Option<String>,
    pub(super) model: Arc<dyn Model>,
    pub(super) encoders: Arc<EncoderSet>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Builds a classifier over the process-wide artifact store.
    pub fn from_default_artifacts() -> Result<Self, ClassifierError> {
        Self::builder().build()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            encoders_path: self.encoders_path.clone(),
            feature_order: self.model.feature_order().to_vec(),
            model_description: self.model.describe(),
            encoder_sizes: Feature::ALL
                .into_iter()
                .filter_map(|feature| self.encoders.get(feature).map(|e| (feature, e.len())))
                .collect(),
        }
    }

    /// Maps a selection to the model's numeric representation.
    pub fn encode(&self, selection: &Selection) -> Result<EncodedVector, ClassifierError> {
        encoding::encode(selection, &self.encoders)
    }

    /// Classifies an already encoded vector.
    pub fn predict_encoded(&self, vector: &EncodedVector) -> Result<Verdict, ClassifierError> {
        encoding::predict(vector, self.model.as_ref())
    }

    /// Predicts whether the selected mushroom is edible.
    ///
    /// Runs the whole pipeline: catalog lookup, encoding, then the model. The
    /// result depends only on the selection and the loaded artifacts, so the
    /// same selection always gives the same verdict.
    ///
    /// # Errors
    /// - `UnknownValue` if a value is not in its feature's option list
    /// - `UnseenCode` / `EncoderShapeMismatch` if the encoders disagree with the catalog
    /// - `ModelContractViolation` if the model answers outside {0, 1}
    pub fn predict(&self, selection: &Selection) -> Result<Verdict, ClassifierError> {
        let vector = self.encode(selection)?;
        let verdict = self.predict_encoded(&vector)?;
        info!("Predicted {} for {:?}", verdict, vector);
        Ok(verdict)
    }

    /// Validates `(feature name, value)` pairs into a selection and predicts.
    pub fn predict_values<I, K, V>(&self, pairs: I) -> Result<Verdict, ClassifierError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let selection = Selection::from_pairs(pairs)?;
        self.predict(&selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::EncoderSet;

    #[derive(Debug)]
    struct OdorRule;

    // Edible only for almond, anise and none
    impl Model for OdorRule {
        fn feature_order(&self) -> &[Feature] {
            &Feature::ALL
        }

        fn predict_raw(&self, row: &[f64]) -> i64 {
            // Sorted odor codes: a=0 l=3 n=5
            match row[0] as u32 {
                0 | 3 | 5 => 0,
                _ => 1,
            }
        }
    }

    fn classifier() -> Classifier {
        Classifier::builder()
            .with_model(Arc::new(OdorRule))
            .with_encoders(EncoderSet::fit_catalog())
            .build()
            .unwrap()
    }

    fn pairs(odor: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("odor", odor),
            ("gill-size", "narrow"),
            ("gill-color", "buff"),
            ("spore-print-color", "chocolate"),
            ("population", "several"),
            ("stalk-surface-above-ring", "smooth"),
        ]
    }

    #[test]
    fn test_predict_values() {
        let classifier = classifier();
        assert_eq!(classifier.predict_values(pairs("foul")).unwrap(), Verdict::Poisonous);
        assert_eq!(classifier.predict_values(pairs("none")).unwrap(), Verdict::Edible);
        assert_eq!(classifier.predict_values(pairs("anise")).unwrap(), Verdict::Edible);
    }

    #[test]
    fn test_validation_happens_before_encoding() {
        let classifier = classifier();
        let mut short = pairs("foul");
        short.pop();
        assert!(matches!(
            classifier.predict_values(short),
            Err(ClassifierError::ValidationError(_))
        ));
    }

    #[test]
    fn test_info() {
        let info = classifier().info();
        assert_eq!(info.feature_order, Feature::ALL.to_vec());
        assert_eq!(info.model_description, "custom model");
        assert_eq!(info.encoder_sizes.len(), Feature::COUNT);
        assert!(info.encoder_sizes.contains(&(Feature::GillColor, 12)));
        assert!(info.model_path.is_none());
    }

    #[test]
    fn test_shared_across_threads() {
        let classifier = Arc::new(classifier());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let classifier = Arc::clone(&classifier);
                std::thread::spawn(move || classifier.predict_values(pairs("foul")).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Verdict::Poisonous);
        }
    }
}
