use std::path::Path;
use std::sync::Arc;

use log::info;

use super::classifier::Classifier;
use super::encoder::EncoderSet;
use super::error::ClassifierError;
use super::model::Model;
use crate::artifact_store::{ArtifactConfig, ArtifactStore, LoadedArtifacts};
use crate::runtime;

/// A builder for constructing a Classifier with a fluent interface.
///
/// Artifacts come from one of three places, checked in this order:
/// an explicit model and encoder set, an [`ArtifactStore`], or an
/// [`ArtifactConfig`] resolved through the process-wide store registry. With
/// none of these set, the default artifacts directory is used.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    config: Option<ArtifactConfig>,
    artifacts: Option<Arc<LoadedArtifacts>>,
    model: Option<Arc<dyn Model>>,
    encoders: Option<Arc<EncoderSet>>,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads artifacts from `dir` with the default file names.
    pub fn with_artifacts_dir<P: AsRef<Path>>(self, dir: P) -> Self {
        self.with_config(ArtifactConfig::new(dir))
    }

    /// Sets the artifact configuration (directory, file names, expected hashes).
    pub fn with_config(mut self, config: ArtifactConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses artifacts loaded through a specific store.
    ///
    /// # Errors
    /// Whatever [`ArtifactStore::load`] returns.
    pub fn with_store(mut self, store: &ArtifactStore) -> Result<Self, ClassifierError> {
        self.artifacts = Some(store.load()?);
        Ok(self)
    }

    /// Uses a custom model in place of the artifact tree.
    pub fn with_model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    /// Uses a custom encoder set in place of the artifact encoders.
    pub fn with_encoders(mut self, encoders: EncoderSet) -> Self {
        self.encoders = Some(Arc::new(encoders));
        self
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - Only one of a custom model and custom encoders was given
    ///   - The artifacts are missing or corrupt
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        match (self.model, self.encoders) {
            (Some(model), Some(encoders)) => {
                info!("Building classifier from a custom model and encoder set");
                return Ok(Classifier {
                    model_path: None,
                    encoders_path: None,
                    model,
                    encoders,
                });
            }
            (None, None) => {}
            _ => {
                return Err(ClassifierError::ValidationError(
                    "A custom model and custom encoders must be set together".to_string(),
                ))
            }
        }

        let artifacts = match self.artifacts {
            Some(artifacts) => artifacts,
            None => {
                let store = match self.config {
                    Some(config) => runtime::shared_store(config),
                    None => runtime::global_store(),
                };
                store.load()?
            }
        };

        info!(
            "Building classifier from {:?} and {:?}",
            artifacts.model_path, artifacts.encoders_path
        );
        Ok(Classifier {
            model_path: Some(artifacts.model_path.to_string_lossy().to_string()),
            encoders_path: Some(artifacts.encoders_path.to_string_lossy().to_string()),
            model: Arc::clone(&artifacts.model) as Arc<dyn Model>,
            encoders: Arc::clone(&artifacts.encoders),
        })
    }
}
