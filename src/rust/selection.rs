use std::collections::HashSet;

use crate::catalog::Feature;
use crate::classifier::ClassifierError;

/// One human-readable value per catalog feature, ready for encoding.
///
/// A `Selection` always covers every feature exactly once. Whether each value is
/// actually in its feature's option list is checked later, during encoding, where
/// it surfaces as `UnknownValue`.
///
/// ```
/// use mushroom_classifier::Selection;
///
/// let selection = Selection::builder()
///     .odor("foul")
///     .gill_size("narrow")
///     .gill_color("buff")
///     .spore_print_color("chocolate")
///     .population("several")
///     .stalk_surface_above_ring("smooth")
///     .build()?;
/// assert_eq!(selection.value(mushroom_classifier::Feature::Odor), "foul");
/// # Ok::<(), mushroom_classifier::ClassifierError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    values: [String; Feature::COUNT],
}

impl Selection {
    pub fn builder() -> SelectionBuilder {
        SelectionBuilder::default()
    }

    /// Builds a selection from `(feature name, value)` pairs.
    ///
    /// # Errors
    /// `ValidationError` if a name is not a catalog feature, appears twice, or if
    /// any catalog feature is left out.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = SelectionBuilder::default();
        let mut seen = HashSet::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            let feature = Feature::from_name(name).ok_or_else(|| {
                ClassifierError::ValidationError(format!("Unrecognized feature '{}'", name))
            })?;
            if !seen.insert(feature) {
                return Err(ClassifierError::ValidationError(format!(
                    "Feature '{}' given more than once",
                    feature
                )));
            }
            builder = builder.set(feature, value);
        }
        builder.build()
    }

    /// The chosen value for `feature`
    pub fn value(&self, feature: Feature) -> &str {
        &self.values[feature.index()]
    }

    /// Iterates `(feature, value)` in training order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, &str)> {
        Feature::ALL
            .into_iter()
            .map(move |feature| (feature, self.value(feature)))
    }
}

/// Fluent construction of a [`Selection`], one setter per feature.
#[derive(Debug, Default, Clone)]
pub struct SelectionBuilder {
    values: [Option<String>; Feature::COUNT],
}

impl SelectionBuilder {
    /// Sets the value for any feature, replacing an earlier one.
    pub fn set(mut self, feature: Feature, value: impl Into<String>) -> Self {
        self.values[feature.index()] = Some(value.into());
        self
    }

    pub fn odor(self, value: impl Into<String>) -> Self {
        self.set(Feature::Odor, value)
    }

    pub fn gill_size(self, value: impl Into<String>) -> Self {
        self.set(Feature::GillSize, value)
    }

    pub fn gill_color(self, value: impl Into<String>) -> Self {
        self.set(Feature::GillColor, value)
    }

    pub fn spore_print_color(self, value: impl Into<String>) -> Self {
        self.set(Feature::SporePrintColor, value)
    }

    pub fn population(self, value: impl Into<String>) -> Self {
        self.set(Feature::Population, value)
    }

    pub fn stalk_surface_above_ring(self, value: impl Into<String>) -> Self {
        self.set(Feature::StalkSurfaceAboveRing, value)
    }

    /// # Errors
    /// `ValidationError` naming every feature that was never set.
    pub fn build(self) -> Result<Selection, ClassifierError> {
        let missing: Vec<&str> = Feature::ALL
            .iter()
            .filter(|feature| self.values[feature.index()].is_none())
            .map(|feature| feature.name())
            .collect();
        if !missing.is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Missing value for feature(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Selection {
            values: self.values.map(Option::unwrap_or_default),
        })
    }
}
