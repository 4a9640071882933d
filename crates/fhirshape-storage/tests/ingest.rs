use std::fs;
use std::path::Path;

use fhirshape_core::options::MergeOptions;
use fhirshape_storage::documents::{ARTIFACT_NAME, artifact_path, list_documents, resolve_document};
use fhirshape_storage::error::StorageError;
use fhirshape_storage::ingest::{IngestPolicy, ingest_directory};
use fhirshape_storage::state::{load_registry, save_registry};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_vec(value).unwrap()).unwrap();
}

fn options() -> MergeOptions {
    MergeOptions::default().with_placeholder("<SENTINEL>")
}

fn fixture() -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    write_json(
        tmp.path(),
        "a.json",
        &json!({"resourceType": "Bundle", "entry": [
            {"resource": {"resourceType": "Patient", "name": "A"}},
            {"resource": {"resourceType": "Encounter", "status": "done"}}
        ]}),
    );
    write_json(
        tmp.path(),
        "b.JSON",
        &json!({"resourceType": "Bundle", "entry": [
            {"resource": {"resourceType": "Patient", "age": 30, "tags": ["x", "y"]}}
        ]}),
    );
    fs::write(tmp.path().join("notes.txt"), "not a document").unwrap();
    tmp
}

#[tokio::test]
async fn lists_only_json_documents_sorted() {
    let tmp = fixture();
    write_json(tmp.path(), ARTIFACT_NAME, &json!({}));
    fs::create_dir(tmp.path().join("dir.json")).unwrap();

    let docs = list_documents(tmp.path()).await.unwrap();
    let names: Vec<_> = docs
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["a.json", "b.JSON"]);
}

#[tokio::test]
async fn ingest_builds_one_model_per_type() {
    let tmp = fixture();

    let report = ingest_directory(tmp.path(), options(), IngestPolicy::SkipInvalid)
        .await
        .unwrap();

    assert_eq!(report.documents_read, 2);
    assert_eq!(report.records_merged, 3);
    assert_eq!(
        serde_json::to_value(&report.registry).unwrap(),
        json!({
            "Encounter": {"resourceType": "Encounter", "status": "<SENTINEL>"},
            "Patient": {
                "resourceType": "Patient",
                "name": "<SENTINEL>",
                "age": "<SENTINEL>",
                "tags": ["<SENTINEL>", "<SENTINEL>"]
            }
        })
    );
}

#[tokio::test]
async fn skip_invalid_continues_past_bad_input() {
    let tmp = fixture();
    fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();
    write_json(
        tmp.path(),
        "c.json",
        &json!({"entry": [{"fullUrl": "x"}, {"resource": {"resourceType": "Condition"}}]}),
    );

    let report = ingest_directory(tmp.path(), options(), IngestPolicy::SkipInvalid)
        .await
        .unwrap();

    assert_eq!(report.documents_skipped, 1);
    assert_eq!(report.records_skipped, 1);
    assert!(report.registry.get("Condition").is_some());
}

#[tokio::test]
async fn fail_fast_stops_at_first_problem() {
    let tmp = fixture();
    fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();

    let err = ingest_directory(tmp.path(), options(), IngestPolicy::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Parse { .. }));
}

#[tokio::test]
async fn missing_directory_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = ingest_directory(&tmp.path().join("nope"), options(), IngestPolicy::SkipInvalid)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn saved_registry_loads_back() {
    let tmp = fixture();
    let report = ingest_directory(tmp.path(), options(), IngestPolicy::SkipInvalid)
        .await
        .unwrap();

    let path = artifact_path(tmp.path());
    save_registry(&path, &report.registry).await.unwrap();
    assert!(!tmp.path().join("_models.json.tmp").exists());

    let loaded = load_registry(&path, options()).await.unwrap();
    assert_eq!(loaded, report.registry);
}

#[tokio::test]
async fn artifact_is_ignored_on_the_next_run() {
    let tmp = fixture();
    let first = ingest_directory(tmp.path(), options(), IngestPolicy::FailFast)
        .await
        .unwrap();
    save_registry(&artifact_path(tmp.path()), &first.registry)
        .await
        .unwrap();

    let second = ingest_directory(tmp.path(), options(), IngestPolicy::FailFast)
        .await
        .unwrap();
    assert_eq!(second.documents_read, 2);
    assert_eq!(second.registry, first.registry);
}

#[tokio::test]
async fn loading_an_invalid_artifact_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("models.json");
    write_json(tmp.path(), "models.json", &json!({"Patient": ["not", "a", "model"]}));

    let err = load_registry(&path, options()).await.unwrap_err();
    assert!(matches!(err, StorageError::Core { .. }));
}

#[test]
fn document_names_cannot_escape_the_directory() {
    let dir = Path::new("/data");
    assert!(resolve_document(dir, "bundle.json").is_ok());
    for bad in ["", "../etc/passwd", "a/b.json", "..", "a\\b"] {
        assert!(matches!(
            resolve_document(dir, bad),
            Err(StorageError::InvalidName(_))
        ));
    }
}
