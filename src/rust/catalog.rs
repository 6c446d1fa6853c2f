//! The closed table of features the classifier consumes.
//!
//! Each [`Feature`] carries its own fixed list of human-readable options and the
//! single-character codes the mushroom dataset uses for them. Nothing here is
//! configurable at runtime: the only way to get an error out of the catalog is to
//! hand it a value that is not in a feature's option list.

use std::fmt;

use crate::classifier::ClassifierError;

/// One selectable value of a feature and the dataset code it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOption {
    pub value: &'static str,
    pub code: char,
}

const fn opt(value: &'static str, code: char) -> FeatureOption {
    FeatureOption { value, code }
}

const ODOR: [FeatureOption; 9] = [
    opt("almond", 'a'),
    opt("anise", 'l'),
    opt("creosote", 'c'),
    opt("fishy", 'y'),
    opt("foul", 'f'),
    opt("musty", 'm'),
    opt("pungent", 'p'),
    opt("spicy", 's'),
    opt("none", 'n'),
];

const GILL_SIZE: [FeatureOption; 2] = [opt("broad", 'b'), opt("narrow", 'n')];

const GILL_COLOR: [FeatureOption; 12] = [
    opt("black", 'k'),
    opt("brown", 'n'),
    opt("buff", 'b'),
    opt("chocolate", 'h'),
    opt("gray", 'g'),
    opt("green", 'r'),
    opt("orange", 'o'),
    opt("pink", 'p'),
    opt("purple", 'u'),
    opt("red", 'e'),
    opt("white", 'w'),
    opt("yellow", 'y'),
];

const SPORE_PRINT_COLOR: [FeatureOption; 9] = [
    opt("black", 'k'),
    opt("brown", 'n'),
    opt("buff", 'b'),
    opt("chocolate", 'h'),
    opt("green", 'r'),
    opt("orange", 'o'),
    opt("purple", 'u'),
    opt("white", 'w'),
    opt("yellow", 'y'),
];

const POPULATION: [FeatureOption; 6] = [
    opt("abundant", 'a'),
    opt("clustered", 'c'),
    opt("numerous", 'n'),
    opt("scattered", 's'),
    opt("several", 'v'),
    opt("solitary", 'y'),
];

const STALK_SURFACE_ABOVE_RING: [FeatureOption; 4] = [
    opt("fibrous", 'f'),
    opt("scaly", 'y'),
    opt("silky", 'k'),
    opt("smooth", 's'),
];

/// The six physical features the decision tree was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Odor,
    GillSize,
    GillColor,
    SporePrintColor,
    Population,
    StalkSurfaceAboveRing,
}

impl Feature {
    /// Number of features in the catalog
    pub const COUNT: usize = 6;

    /// All features, in the column order the model was trained with
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Odor,
        Feature::GillSize,
        Feature::GillColor,
        Feature::SporePrintColor,
        Feature::Population,
        Feature::StalkSurfaceAboveRing,
    ];

    /// The dataset column name, e.g. `"spore-print-color"`
    pub fn name(self) -> &'static str {
        match self {
            Self::Odor => "odor",
            Self::GillSize => "gill-size",
            Self::GillColor => "gill-color",
            Self::SporePrintColor => "spore-print-color",
            Self::Population => "population",
            Self::StalkSurfaceAboveRing => "stalk-surface-above-ring",
        }
    }

    /// Parses a dataset column name back into a feature.
    pub fn from_name(name: &str) -> Option<Feature> {
        Self::ALL.into_iter().find(|feature| feature.name() == name)
    }

    /// Position of this feature in [`Feature::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The full option table for this feature, in display order.
    pub fn option_table(self) -> &'static [FeatureOption] {
        match self {
            Self::Odor => &ODOR,
            Self::GillSize => &GILL_SIZE,
            Self::GillColor => &GILL_COLOR,
            Self::SporePrintColor => &SPORE_PRINT_COLOR,
            Self::Population => &POPULATION,
            Self::StalkSurfaceAboveRing => &STALK_SURFACE_ABOVE_RING,
        }
    }

    /// Human-readable options in display order.
    pub fn options(self) -> impl Iterator<Item = &'static str> {
        self.option_table().iter().map(|option| option.value)
    }

    /// Looks up the dataset code for a human-readable value.
    ///
    /// # Errors
    /// `UnknownValue` if `value` is not one of this feature's options.
    pub fn code_for(self, value: &str) -> Result<char, ClassifierError> {
        self.option_table()
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.code)
            .ok_or_else(|| ClassifierError::UnknownValue {
                feature: self,
                value: value.to_string(),
            })
    }

    /// Reverse lookup from a dataset code to its human-readable value.
    pub fn value_for(self, code: char) -> Option<&'static str> {
        self.option_table()
            .iter()
            .find(|option| option.code == code)
            .map(|option| option.value)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_option_counts() {
        let counts: Vec<usize> = Feature::ALL.iter().map(|f| f.options().count()).collect();
        assert_eq!(counts, vec![9, 2, 12, 9, 6, 4]);
    }

    #[test]
    fn test_options_are_unique_and_round_trip() {
        for feature in Feature::ALL {
            let values: Vec<&str> = feature.options().collect();
            assert!(!values.is_empty());
            let unique: HashSet<_> = values.iter().collect();
            assert_eq!(unique.len(), values.len(), "duplicate value in {}", feature);

            let codes: HashSet<char> = feature.option_table().iter().map(|o| o.code).collect();
            assert_eq!(codes.len(), values.len(), "duplicate code in {}", feature);

            for value in values {
                let code = feature.code_for(value).unwrap();
                assert!(codes.contains(&code));
                assert_eq!(feature.value_for(code), Some(value));
            }
        }
    }

    #[test]
    fn test_unknown_value() {
        let err = Feature::GillSize.code_for("medium").unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::UnknownValue { feature: Feature::GillSize, ref value } if value == "medium"
        ));
        // Codes are not accepted in place of values
        assert!(Feature::Odor.code_for("f").is_err());
        assert!(Feature::Odor.code_for("").is_err());
    }

    #[test]
    fn test_odor_none_is_a_real_option() {
        assert_eq!(Feature::Odor.code_for("none").unwrap(), 'n');
    }

    #[test]
    fn test_names_round_trip() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(Feature::from_name(feature.name()), Some(*feature));
            assert_eq!(feature.index(), i);
        }
        assert_eq!(Feature::from_name("cap-shape"), None);
        assert_eq!(Feature::StalkSurfaceAboveRing.to_string(), "stalk-surface-above-ring");
    }
}
