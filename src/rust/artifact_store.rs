use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, DecisionTree, EncoderSet, FormatError, Model};

pub const DEFAULT_MODEL_FILE: &str = "decision_tree.json";
pub const DEFAULT_ENCODERS_FILE: &str = "encoders.json";
pub const ARTIFACTS_ENV_VAR: &str = "MUSHROOM_ARTIFACTS";

/// Where the artifacts live and, optionally, what they must hash to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub model_file: String,
    pub encoders_file: String,
    /// Expected lowercase hex SHA-256 of the model file
    pub model_sha256: Option<String>,
    /// Expected lowercase hex SHA-256 of the encoders file
    pub encoders_sha256: Option<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new(Self::default_artifacts_dir())
    }
}

impl ArtifactConfig {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            encoders_file: DEFAULT_ENCODERS_FILE.to_string(),
            model_sha256: None,
            encoders_sha256: None,
        }
    }

    /// Returns the default artifacts directory path
    pub fn default_artifacts_dir() -> PathBuf {
        Self::resolve_artifacts_dir(env::var_os(ARTIFACTS_ENV_VAR))
    }

    /// Resolves the artifacts directory given the value of `MUSHROOM_ARTIFACTS`.
    pub fn resolve_artifacts_dir(env_value: Option<OsString>) -> PathBuf {
        // 1. Environment variable, when set and non-empty
        if let Some(path) = env_value.filter(|value| !value.is_empty()) {
            return PathBuf::from(path);
        }

        // 2. A model/ directory next to where we run
        let local = PathBuf::from("model");
        if local.is_dir() {
            return local;
        }

        // 3. Platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("mushroom-classifier").join("model");
        }

        // 4. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir
                .join(".local")
                .join("share")
                .join("mushroom-classifier")
                .join("model");
        }

        local
    }

    pub fn with_model_file(mut self, name: impl Into<String>) -> Self {
        self.model_file = name.into();
        self
    }

    pub fn with_encoders_file(mut self, name: impl Into<String>) -> Self {
        self.encoders_file = name.into();
        self
    }

    /// Requires both files to match the given SHA-256 digests on load.
    pub fn with_expected_hashes(mut self, model: impl Into<String>, encoders: impl Into<String>) -> Self {
        self.model_sha256 = Some(model.into().to_ascii_lowercase());
        self.encoders_sha256 = Some(encoders.into().to_ascii_lowercase());
        self
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.dir.join(&self.encoders_file)
    }
}

/// The decoded artifacts, shared read-only for the life of the store.
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub model: Arc<DecisionTree>,
    pub encoders: Arc<EncoderSet>,
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
}

/// SHA-256 digests of the artifact files as they are on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigests {
    pub model: String,
    pub encoders: String,
}

/// Loads the model and encoders once and hands out the same instances after.
///
/// The first successful [`load`](Self::load) is cached; later calls never touch
/// the disk again. Concurrent first calls serialize on an internal lock, so the
/// files are read once even when many threads race to load them.
#[derive(Debug)]
pub struct ArtifactStore {
    config: ArtifactConfig,
    cache: OnceLock<Arc<LoadedArtifacts>>,
    load_lock: Mutex<()>,
}

impl ArtifactStore {
    pub fn new(config: ArtifactConfig) -> Self {
        Self {
            config,
            cache: OnceLock::new(),
            load_lock: Mutex::new(()),
        }
    }

    /// Creates a store over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(ArtifactConfig::default())
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    pub fn model_path(&self) -> PathBuf {
        self.config.model_path()
    }

    pub fn encoders_path(&self) -> PathBuf {
        self.config.encoders_path()
    }

    pub fn artifacts_present(&self) -> bool {
        let model_path = self.model_path();
        let encoders_path = self.encoders_path();
        log::debug!("Checking artifacts:");
        log::debug!("  Model path: {:?} (exists: {})", model_path, model_path.exists());
        log::debug!("  Encoders path: {:?} (exists: {})", encoders_path, encoders_path.exists());
        model_path.is_file() && encoders_path.is_file()
    }

    /// Whether a load has already succeeded
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Returns the loaded artifacts, reading them from disk on first use.
    ///
    /// # Errors
    /// - `ArtifactMissing` if either file does not exist
    /// - `ArtifactCorrupt` if a file cannot be read, fails its hash check, is
    ///   not valid JSON, or describes an invalid tree or encoder
    pub fn load(&self) -> Result<Arc<LoadedArtifacts>, ClassifierError> {
        if let Some(loaded) = self.cache.get() {
            log::debug!("Using cached artifacts from {:?}", self.config.dir);
            return Ok(Arc::clone(loaded));
        }

        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(loaded) = self.cache.get() {
            return Ok(Arc::clone(loaded));
        }

        let loaded = Arc::new(self.read_artifacts()?);
        let _ = self.cache.set(Arc::clone(&loaded));
        Ok(loaded)
    }

    fn read_artifacts(&self) -> Result<LoadedArtifacts, ClassifierError> {
        let model_path = self.model_path();
        let encoders_path = self.encoders_path();
        log::info!("Loading artifacts from {:?}", self.config.dir);

        let raw_model = read_artifact(&model_path, self.config.model_sha256.as_deref(), "model")?;
        let model = DecisionTree::from_json(&raw_model).map_err(|e| corrupt(&model_path, e))?;
        log::info!("Model loaded: {}", model.describe());

        let raw_encoders =
            read_artifact(&encoders_path, self.config.encoders_sha256.as_deref(), "encoders")?;
        let encoders = EncoderSet::from_json(&raw_encoders).map_err(|e| corrupt(&encoders_path, e))?;
        log::info!("Encoders loaded for {} features", encoders.len());

        for (feature, code) in encoders.uncovered_codes() {
            log::warn!(
                "Encoder for '{}' was never fitted on catalog code '{}'; selecting it will fail",
                feature,
                code
            );
        }
        for (feature, count) in encoders.foreign_classes() {
            log::warn!(
                "Encoder for '{}' holds {} codes outside its option list; encoding will fail",
                feature,
                count
            );
        }

        Ok(LoadedArtifacts {
            model: Arc::new(model),
            encoders: Arc::new(encoders),
            model_path,
            encoders_path,
        })
    }

    /// Hashes both artifact files without parsing them.
    pub fn file_digests(&self) -> Result<ArtifactDigests, ClassifierError> {
        Ok(ArtifactDigests {
            model: sha256_hex(&read_bytes(&self.model_path())?),
            encoders: sha256_hex(&read_bytes(&self.encoders_path())?),
        })
    }
}

fn corrupt(path: &Path, err: FormatError) -> ClassifierError {
    log::error!("Failed to parse {:?}: {}", path, err);
    ClassifierError::corrupt(path, err.to_string())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ClassifierError> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            log::error!("Artifact not found at {:?}", path);
            ClassifierError::ArtifactMissing {
                path: path.to_path_buf(),
            }
        }
        _ => {
            log::error!("Failed to read artifact {:?}: {}", path, e);
            ClassifierError::corrupt(path, format!("unreadable: {}", e))
        }
    })
}

fn read_artifact(path: &Path, expected_hash: Option<&str>, file_type: &str) -> Result<String, ClassifierError> {
    let bytes = read_bytes(path)?;
    log::info!("Read {} bytes of {} from {:?}", bytes.len(), file_type, path);

    if let Some(expected) = expected_hash {
        let actual = sha256_hex(&bytes);
        log::info!("Calculated hash: {}", actual);
        log::info!("Expected hash:   {}", expected);
        if actual != expected {
            log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, actual);
            return Err(ClassifierError::corrupt(
                path,
                format!("hash mismatch: expected {}, got {}", expected, actual),
            ));
        }
    }

    String::from_utf8(bytes).map_err(|e| ClassifierError::corrupt(path, format!("not UTF-8: {}", e)))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
