use std::path::{Path, PathBuf};

use fhirshape_core::tree::Tree;

use crate::error::StorageError;

/// File name the registry artifact is written under.
pub const ARTIFACT_NAME: &str = "_models.json";

/// Where the registry artifact for `dir` lives.
pub fn artifact_path(dir: &Path) -> PathBuf {
    dir.join(ARTIFACT_NAME)
}

/// List the JSON documents in `dir`, sorted by file name.
///
/// Only regular files with a `.json` extension (any case) count. Names
/// starting with `_` are outputs of earlier runs and are skipped.
pub async fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StorageError::read(dir, e))?;

    let mut documents = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StorageError::read(dir, e))?
    {
        let path = entry.path();
        if !is_document_name(&path) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => documents.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot stat document, skipping");
            }
        }
    }

    documents.sort();
    Ok(documents)
}

fn is_document_name(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let is_output = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_none_or(|name| name.starts_with('_'));
    is_json && !is_output
}

/// Read and parse one JSON document.
pub async fn read_document(path: &Path) -> Result<Tree, StorageError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a bare document name inside `dir`.
///
/// Names that could escape the directory are rejected.
pub fn resolve_document(dir: &Path, name: &str) -> Result<PathBuf, StorageError> {
    let escapes = name.is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name.contains("..");
    if escapes {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(dir.join(name))
}
