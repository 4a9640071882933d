use std::collections::BTreeMap;
use std::path::Path;

use fhirshape_core::options::MergeOptions;
use fhirshape_core::registry::ModelRegistry;
use fhirshape_core::tree::Tree;

use crate::error::StorageError;

/// Load a registry artifact written by [`save_registry`].
pub async fn load_registry(path: &Path, options: MergeOptions) -> Result<ModelRegistry, StorageError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::read(path, e))?;
    let models: BTreeMap<String, Tree> =
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    ModelRegistry::from_models(models, options).map_err(|source| StorageError::Core {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the registry as pretty JSON.
///
/// The bytes go to a sibling temp file first and are renamed into place, so
/// readers never see a partial artifact.
pub async fn save_registry(path: &Path, registry: &ModelRegistry) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(registry)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(tmp_path, &json).await.map_err(write_err)?;
    tokio::fs::rename(tmp_path, path).await.map_err(write_err)?;

    tracing::info!(path = %path.display(), models = registry.len(), "registry saved");
    Ok(())
}
