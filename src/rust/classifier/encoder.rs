use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::error::FormatError;
use crate::catalog::Feature;

/// A fitted mapping from category codes to the integers the model was trained on.
pub trait CategoryEncoder: Send + Sync + fmt::Debug {
    /// Integer for `code`, or `None` if the encoder was never fitted on it.
    fn encode(&self, code: char) -> Option<u32>;

    /// Number of codes the encoder knows
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Label encoder: a code encodes to its position in `classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<char>,
}

impl LabelEncoder {
    /// Wraps an already-fitted class list.
    ///
    /// # Errors
    /// `FormatError::Invalid` if a code appears twice.
    pub fn new(classes: Vec<char>) -> Result<Self, FormatError> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = classes.iter().find(|c| !seen.insert(**c)) {
            return Err(FormatError::Invalid(format!("code '{}' appears twice", dup)));
        }
        Ok(Self { classes })
    }

    /// Fits on observed codes: classes are the distinct codes in sorted order.
    pub fn fit(codes: impl IntoIterator<Item = char>) -> Self {
        let classes: BTreeSet<char> = codes.into_iter().collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn classes(&self) -> &[char] {
        &self.classes
    }
}

impl CategoryEncoder for LabelEncoder {
    fn encode(&self, code: char) -> Option<u32> {
        self.classes
            .iter()
            .position(|&c| c == code)
            .and_then(|i| u32::try_from(i).ok())
    }

    fn len(&self) -> usize {
        self.classes.len()
    }
}

#[derive(Debug, Deserialize)]
struct RawLabelEncoder {
    classes: Vec<String>,
}

/// Encoders keyed by feature name, exactly as they were exported.
///
/// The set is not forced to match the catalog when it is built: a set with
/// missing or extra entries is only rejected when something is encoded with it.
#[derive(Debug, Clone, Default)]
pub struct EncoderSet {
    encoders: BTreeMap<String, Arc<dyn CategoryEncoder>>,
}

impl EncoderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"<feature>": {"classes": ["a", "c", ...]}, ...}`.
    pub fn from_json(raw: &str) -> Result<Self, FormatError> {
        let parsed: BTreeMap<String, RawLabelEncoder> = serde_json::from_str(raw)?;
        let mut set = Self::new();
        for (name, encoder) in parsed {
            let mut classes = Vec::with_capacity(encoder.classes.len());
            for class in &encoder.classes {
                let mut chars = class.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => classes.push(code),
                    _ => {
                        return Err(FormatError::Invalid(format!(
                            "encoder '{}' has class '{}', expected a single character",
                            name, class
                        )))
                    }
                }
            }
            let encoder = LabelEncoder::new(classes)
                .map_err(|e| FormatError::Invalid(format!("encoder '{}': {}", name, e)))?;
            set.insert(name, encoder);
        }
        Ok(set)
    }

    /// Encoders fitted on every code in the catalog, in sorted order.
    pub fn fit_catalog() -> Self {
        let mut set = Self::new();
        for feature in Feature::ALL {
            let codes = feature.option_table().iter().map(|option| option.code);
            set.insert(feature.name(), LabelEncoder::fit(codes));
        }
        set
    }

    /// Adds or replaces the encoder for a feature name.
    pub fn insert(&mut self, name: impl Into<String>, encoder: impl CategoryEncoder + 'static) {
        self.encoders.insert(name.into(), Arc::new(encoder));
    }

    pub fn with_encoder(mut self, name: impl Into<String>, encoder: impl CategoryEncoder + 'static) -> Self {
        self.insert(name, encoder);
        self
    }

    pub fn get(&self, feature: Feature) -> Option<&dyn CategoryEncoder> {
        self.encoders.get(feature.name()).map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Feature names present in the set
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    /// Catalog features with no encoder, and names the catalog doesn't know.
    pub fn shape_mismatch(&self) -> (Vec<Feature>, Vec<String>) {
        let missing: Vec<Feature> = Feature::ALL
            .into_iter()
            .filter(|feature| self.get(*feature).is_none())
            .collect();
        let unexpected: Vec<String> = self
            .names()
            .filter(|name| Feature::from_name(name).is_none())
            .map(str::to_string)
            .collect();
        (missing, unexpected)
    }

    /// Features whose encoder knows codes outside that feature's option list,
    /// with how many such codes it holds.
    ///
    /// A label encoder's indices are positions in its whole class list, so an
    /// encoder carrying foreign classes (fitted on another column, or on a
    /// different category set) assigns shifted integers to the codes it shares
    /// with the catalog.
    pub fn foreign_classes(&self) -> Vec<(Feature, usize)> {
        Feature::ALL
            .into_iter()
            .filter_map(|feature| {
                let encoder = self.get(feature)?;
                let covered = feature
                    .option_table()
                    .iter()
                    .filter(|option| encoder.encode(option.code).is_some())
                    .count();
                let foreign = encoder.len().saturating_sub(covered);
                (foreign > 0).then_some((feature, foreign))
            })
            .collect()
    }

    /// Catalog `(feature, code)` pairs the encoders cannot encode.
    pub fn uncovered_codes(&self) -> Vec<(Feature, char)> {
        let mut uncovered = Vec::new();
        for feature in Feature::ALL {
            let Some(encoder) = self.get(feature) else {
                continue;
            };
            for option in feature.option_table() {
                if encoder.encode(option.code).is_none() {
                    uncovered.push((feature, option.code));
                }
            }
        }
        uncovered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_and_dedups() {
        let encoder = LabelEncoder::fit("fnfbn".chars());
        assert_eq!(encoder.classes(), &['b', 'f', 'n']);
        assert_eq!(encoder.encode('b'), Some(0));
        assert_eq!(encoder.encode('n'), Some(2));
        assert_eq!(encoder.encode('z'), None);
        assert_eq!(encoder.len(), 3);
    }

    #[test]
    fn test_new_rejects_duplicates() {
        assert!(LabelEncoder::new(vec!['a', 'b', 'a']).is_err());
        assert!(LabelEncoder::new(vec!['b', 'a']).is_ok());
    }

    #[test]
    fn test_from_json() {
        let set = EncoderSet::from_json(r#"{"gill-size": {"classes": ["b", "n"]}}"#).unwrap();
        assert_eq!(set.len(), 1);
        let encoder = set.get(Feature::GillSize).unwrap();
        assert_eq!(encoder.encode('n'), Some(1));
        assert!(set.get(Feature::Odor).is_none());
    }

    #[test]
    fn test_from_json_rejects_multichar_class() {
        let err = EncoderSet::from_json(r#"{"odor": {"classes": ["a", "no"]}}"#).unwrap_err();
        assert!(err.to_string().contains("single character"));
    }

    #[test]
    fn test_from_json_rejects_duplicate_class() {
        let err = EncoderSet::from_json(r#"{"odor": {"classes": ["a", "a"]}}"#).unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_fit_catalog_covers_catalog() {
        let set = EncoderSet::fit_catalog();
        assert_eq!(set.len(), Feature::COUNT);
        assert!(set.uncovered_codes().is_empty());
        let (missing, unexpected) = set.shape_mismatch();
        assert!(missing.is_empty() && unexpected.is_empty());
        // odor sorted: a c f l m n p s y
        assert_eq!(set.get(Feature::Odor).unwrap().encode('f'), Some(2));
    }

    #[test]
    fn test_foreign_classes() {
        assert!(EncoderSet::fit_catalog().foreign_classes().is_empty());

        // gill-color and spore-print-color class lists exchanged
        let swapped = EncoderSet::fit_catalog()
            .with_encoder("gill-color", LabelEncoder::fit("bhknoruwy".chars()))
            .with_encoder("spore-print-color", LabelEncoder::fit("beghknopruwy".chars()));
        assert_eq!(swapped.foreign_classes(), vec![(Feature::SporePrintColor, 3)]);

        // Fitted on a subset of the catalog: no foreign codes, only uncovered ones
        let subset = EncoderSet::fit_catalog().with_encoder("odor", LabelEncoder::fit("afn".chars()));
        assert!(subset.foreign_classes().is_empty());
        assert_eq!(subset.uncovered_codes().len(), 6);
    }

    #[test]
    fn test_shape_mismatch() {
        let set = EncoderSet::new()
            .with_encoder("odor", LabelEncoder::fit("acflmnpsy".chars()))
            .with_encoder("habitat", LabelEncoder::fit("gd".chars()));
        let (missing, unexpected) = set.shape_mismatch();
        assert_eq!(missing.len(), Feature::COUNT - 1);
        assert_eq!(unexpected, vec!["habitat".to_string()]);
    }
}
