use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::artifact_store::{ArtifactConfig, ArtifactStore};

lazy_static! {
    static ref STORES: Mutex<HashMap<ArtifactConfig, Arc<ArtifactStore>>> = Mutex::new(HashMap::new());
}

/// Returns the process-wide store for `config`, creating it on first request.
///
/// Every caller asking for the same configuration gets the same store, so the
/// artifacts behind it are read from disk at most once per process.
pub fn shared_store(config: ArtifactConfig) -> Arc<ArtifactStore> {
    let mut stores = STORES.lock().unwrap_or_else(|e| e.into_inner());
    Arc::clone(
        stores
            .entry(config)
            .or_insert_with_key(|config| Arc::new(ArtifactStore::new(config.clone()))),
    )
}

/// The store over the default artifacts directory.
pub fn global_store() -> Arc<ArtifactStore> {
    shared_store(ArtifactConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_config_same_store() {
        let config = ArtifactConfig::new("/tmp/runtime-test-artifacts");
        let a = shared_store(config.clone());
        let b = shared_store(config.clone());
        assert!(Arc::ptr_eq(&a, &b));

        let other = shared_store(config.with_model_file("other.json"));
        assert!(!Arc::ptr_eq(&a, &other));
    }
}
