use log::{debug, error};

use super::encoder::EncoderSet;
use super::error::ClassifierError;
use super::model::{Model, Verdict};
use crate::catalog::Feature;
use crate::selection::Selection;

/// One encoder-assigned integer per catalog feature.
///
/// The integers only mean something relative to the encoders that produced
/// them; they are indices fixed at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedVector {
    values: [u32; Feature::COUNT],
}

impl EncodedVector {
    pub fn new(values: [u32; Feature::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> u32 {
        self.values[feature.index()]
    }

    /// Iterates `(feature, value)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, u32)> + '_ {
        Feature::ALL.into_iter().map(move |feature| (feature, self.get(feature)))
    }

    /// Lays the vector out as a single row in `order`.
    pub fn to_row(&self, order: &[Feature]) -> Vec<f64> {
        order.iter().map(|feature| f64::from(self.get(*feature))).collect()
    }
}

/// Turns a selection into the model's numeric representation.
///
/// Each value is mapped to its catalog code, then through that feature's
/// encoder.
///
/// # Errors
/// - `EncoderShapeMismatch` if the set does not hold exactly one encoder per
///   feature, or an encoder knows codes outside its feature's option list
/// - `UnknownValue` if a value is not in its feature's option list
/// - `UnseenCode` if an encoder was never fitted on a catalog code
pub fn encode(selection: &Selection, encoders: &EncoderSet) -> Result<EncodedVector, ClassifierError> {
    let (missing, unexpected) = encoders.shape_mismatch();
    if !missing.is_empty() || !unexpected.is_empty() {
        let missing: Vec<&str> = missing.iter().map(|f| f.name()).collect();
        let message = format!(
            "missing encoders for [{}], unexpected encoders [{}]",
            missing.join(", "),
            unexpected.join(", ")
        );
        error!("Encoder set does not match the feature catalog: {}", message);
        return Err(ClassifierError::EncoderShapeMismatch(message));
    }

    let foreign = encoders.foreign_classes();
    if !foreign.is_empty() {
        let details: Vec<String> = foreign
            .iter()
            .map(|(feature, count)| format!("{} ({} unknown classes)", feature, count))
            .collect();
        let message = format!("encoders fitted on other categories: [{}]", details.join(", "));
        error!("Encoder set does not match the feature catalog: {}", message);
        return Err(ClassifierError::EncoderShapeMismatch(message));
    }

    let mut values = [0u32; Feature::COUNT];
    for (feature, value) in selection.iter() {
        let code = feature.code_for(value)?;
        let encoder = encoders.get(feature).ok_or_else(|| {
            ClassifierError::EncoderShapeMismatch(format!("missing encoder for [{}]", feature))
        })?;
        values[feature.index()] = encoder.encode(code).ok_or_else(|| {
            error!(
                "Catalog code '{}' ({} = {}) was never seen by the fitted encoder",
                code, feature, value
            );
            ClassifierError::UnseenCode { feature, code }
        })?;
    }

    let vector = EncodedVector::new(values);
    debug!("Encoded selection as {:?}", vector.values);
    Ok(vector)
}

/// Classifies an encoded vector with `model`.
///
/// # Errors
/// `ModelContractViolation` if the model's column order does not cover the
/// catalog or it returns a label other than 0 or 1.
pub fn predict(vector: &EncodedVector, model: &dyn Model) -> Result<Verdict, ClassifierError> {
    let order = model.feature_order();
    let covers_catalog =
        order.len() == Feature::COUNT && Feature::ALL.iter().all(|feature| order.contains(feature));
    if !covers_catalog {
        return Err(ClassifierError::ModelContractViolation(format!(
            "model column order {:?} does not match the feature catalog",
            order
        )));
    }

    let raw = model.predict_raw(&vector.to_row(order));
    Verdict::from_raw(raw).map_err(|e| {
        error!("{}", e);
        e
    })
}
