//! Batch driver: every bundle in a directory folded into one registry.

use std::path::Path;

use fhirshape_core::bundle::{extract_records, extract_records_lenient};
use fhirshape_core::options::MergeOptions;
use fhirshape_core::registry::ModelRegistry;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::documents::{list_documents, read_document};
use crate::error::StorageError;

/// What to do when a document or record cannot be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Log and move on.
    #[default]
    SkipInvalid,
    /// Stop at the first problem.
    FailFast,
}

/// Outcome of one ingest run.
#[derive(Debug)]
pub struct IngestReport {
    pub registry: ModelRegistry,
    pub documents_read: usize,
    pub documents_skipped: usize,
    pub records_merged: usize,
    pub records_skipped: usize,
}

/// Fold every bundle document in `dir` into a fresh registry.
///
/// Documents are processed in file-name order. Under
/// [`IngestPolicy::SkipInvalid`] the returned registry covers whatever could
/// be read; under [`IngestPolicy::FailFast`] the first error is returned.
pub async fn ingest_directory(
    dir: &Path,
    options: MergeOptions,
    policy: IngestPolicy,
) -> Result<IngestReport, StorageError> {
    let documents = list_documents(dir).await?;
    info!(dir = %dir.display(), documents = documents.len(), "ingesting documents");

    let mut report = IngestReport {
        registry: ModelRegistry::new(options),
        documents_read: 0,
        documents_skipped: 0,
        records_merged: 0,
        records_skipped: 0,
    };

    for path in &documents {
        let document = match read_document(path).await {
            Ok(doc) => doc,
            Err(e) if policy == IngestPolicy::SkipInvalid => {
                warn!(path = %path.display(), error = %e, "skipping unreadable document");
                report.documents_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        report.documents_read += 1;

        let discriminant = report.registry.options().discriminant.clone();
        let records = match policy {
            IngestPolicy::FailFast => {
                extract_records(&document, &discriminant).map_err(|source| StorageError::Core {
                    path: path.clone(),
                    source,
                })?
            }
            IngestPolicy::SkipInvalid => {
                let (records, errors) = extract_records_lenient(&document, &discriminant);
                for e in &errors {
                    warn!(path = %path.display(), error = %e, "skipping malformed entry");
                }
                report.records_skipped += errors.len();
                records
            }
        };

        for typed in &records {
            match report.registry.register_record(&typed.type_name, &typed.record) {
                Ok(()) => report.records_merged += 1,
                Err(e) if policy == IngestPolicy::SkipInvalid => {
                    warn!(path = %path.display(), error = %e, "skipping record");
                    report.records_skipped += 1;
                }
                Err(source) => {
                    return Err(StorageError::Core {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
    }

    info!(
        documents_read = report.documents_read,
        documents_skipped = report.documents_skipped,
        records_merged = report.records_merged,
        records_skipped = report.records_skipped,
        models = report.registry.len(),
        "ingest complete"
    );

    Ok(report)
}
