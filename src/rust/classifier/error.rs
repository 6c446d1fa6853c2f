use std::io;
use std::path::PathBuf;

use crate::catalog::Feature;

/// Represents the different types of errors that can occur in the mushroom classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// An artifact file is absent from the artifact directory
    #[error("Artifact missing: {}", path.display())]
    ArtifactMissing { path: PathBuf },
    /// An artifact file exists but could not be parsed or failed validation
    #[error("Artifact corrupt: {}: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },
    /// A selection used a value outside the feature's closed option set
    #[error("Unknown value '{value}' for feature '{feature}'")]
    UnknownValue { feature: Feature, value: String },
    /// The catalog produced a code the fitted encoder has never seen
    #[error("Code '{code}' was never seen by the '{feature}' encoder")]
    UnseenCode { feature: Feature, code: char },
    /// The encoder set does not line up with the feature catalog
    #[error("Encoder set mismatch: {0}")]
    EncoderShapeMismatch(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// The model returned something other than a binary label
    #[error("Model contract violation: {0}")]
    ModelContractViolation(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why an artifact's contents were rejected. Carries no path; the artifact
/// store attaches one when it turns this into `ArtifactCorrupt`.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

impl ClassifierError {
    /// Returns true for errors the user can fix by choosing different values.
    ///
    /// Every other variant points at the artifacts or the environment and is
    /// fatal for the process.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::UnknownValue { .. } | Self::ValidationError(_))
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
