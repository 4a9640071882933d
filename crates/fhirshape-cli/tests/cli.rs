use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    docs: PathBuf,
    root: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let docs = root.join("docs");
        fs::create_dir_all(&docs).unwrap();

        write_json(
            &docs.join("a.json"),
            &json!({"resourceType": "Bundle", "entry": [
                {"resource": {
                    "resourceType": "Patient",
                    "id": "p1",
                    "name": [{"given": ["Ada"], "family": "Lovelace"}]
                }},
                {"resource": {"resourceType": "Encounter", "id": "e1", "status": "finished"}}
            ]}),
        );
        write_json(
            &docs.join("b.json"),
            &json!({"resourceType": "Bundle", "entry": [
                {"resource": {"resourceType": "Patient", "id": "p2", "gender": "female"}}
            ]}),
        );

        Self { _tmp: tmp, docs, root }
    }

    fn models(&self) -> PathBuf {
        self.docs.join("_models.json")
    }

    fn build(&self) {
        cmd().arg("build").arg(&self.docs).assert().success();
    }
}

fn cmd() -> Command {
    cargo_bin_cmd!("fhirshape")
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("valid json output")
}

#[test]
fn build_writes_registry_next_to_documents() {
    let fx = Fixture::new();

    cmd()
        .arg("build")
        .arg(&fx.docs)
        .assert()
        .success()
        .stdout(contains("wrote 2 models from 3 records in 2 documents"));

    assert_eq!(
        read_json(&fx.models()),
        json!({
            "Encounter": {"resourceType": "Encounter", "id": "placeholder", "status": "placeholder"},
            "Patient": {
                "resourceType": "Patient",
                "id": "placeholder",
                "name": [{"given": ["placeholder"], "family": "placeholder"}],
                "gender": "placeholder"
            }
        })
    );
}

#[test]
fn build_json_reports_counts() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("broken.json"), "{ not json").unwrap();
    let output = fx.root.join("out").join("models.json");

    let report = stdout_json(
        cmd()
            .arg("--json")
            .arg("build")
            .arg(&fx.docs)
            .arg("--output")
            .arg(&output),
    );

    assert_eq!(report["types"], json!(["Encounter", "Patient"]));
    assert_eq!(report["documents_read"], 2);
    assert_eq!(report["documents_skipped"], 1);
    assert_eq!(report["records_merged"], 3);
    assert!(output.exists());
}

#[test]
fn build_fail_fast_stops_on_bad_document() {
    let fx = Fixture::new();
    fs::write(fx.docs.join("broken.json"), "{ not json").unwrap();

    cmd()
        .arg("build")
        .arg(&fx.docs)
        .arg("--fail-fast")
        .assert()
        .failure();
    assert!(!fx.models().exists());
}

#[test]
fn build_placeholder_flag_overrides_config() {
    let fx = Fixture::new();
    let config = fx.root.join("config.json");
    write_json(&config, &json!({"merge": {"placeholder": "from-config"}}));

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("build")
        .arg(&fx.docs)
        .assert()
        .success();
    assert_eq!(read_json(&fx.models())["Encounter"]["id"], "from-config");

    cmd()
        .arg("--config")
        .arg(&config)
        .arg("build")
        .arg(&fx.docs)
        .arg("--placeholder")
        .arg("from-flag")
        .assert()
        .success();
    assert_eq!(read_json(&fx.models())["Encounter"]["id"], "from-flag");
}

#[test]
fn project_reshapes_record_from_bundle() {
    let fx = Fixture::new();
    fx.build();

    let projected = stdout_json(
        cmd()
            .arg("project")
            .arg("--models")
            .arg(fx.models())
            .arg("--type")
            .arg("Patient")
            .arg("--record")
            .arg(fx.docs.join("b.json"))
            .arg("--default")
            .arg("N/A"),
    );

    assert_eq!(
        projected,
        json!({
            "resourceType": "Patient",
            "id": "p2",
            "name": [{"given": ["N/A"], "family": "N/A"}],
            "gender": "female"
        })
    );
}

#[test]
fn project_accepts_bare_record() {
    let fx = Fixture::new();
    fx.build();
    let record = fx.root.join("encounter.json");
    write_json(&record, &json!({"resourceType": "Encounter", "status": "planned"}));

    let projected = stdout_json(
        cmd()
            .args(["project", "--type", "Encounter"])
            .arg("--models")
            .arg(fx.models())
            .arg("--record")
            .arg(&record),
    );

    assert_eq!(
        projected,
        json!({"resourceType": "Encounter", "id": "Not provided", "status": "planned"})
    );
}

#[test]
fn project_unknown_type_fails() {
    let fx = Fixture::new();
    fx.build();

    cmd()
        .args(["project", "--type", "Observation"])
        .arg("--models")
        .arg(fx.models())
        .arg("--record")
        .arg(fx.docs.join("a.json"))
        .assert()
        .failure()
        .stderr(contains("no model for type 'Observation'"));
}

#[test]
fn keys_lists_dotted_paths() {
    let fx = Fixture::new();

    cmd()
        .arg("keys")
        .arg(fx.docs.join("a.json"))
        .assert()
        .success()
        .stdout(contains("entry.0.resource.name.0.given.0\n"));

    let paths = stdout_json(cmd().arg("--json").arg("keys").arg(fx.docs.join("b.json")));
    assert_eq!(
        paths,
        json!([
            "entry",
            "entry.0",
            "entry.0.resource",
            "entry.0.resource.gender",
            "entry.0.resource.id",
            "entry.0.resource.resourceType",
            "resourceType"
        ])
    );
}

#[test]
fn render_writes_html_page() {
    let fx = Fixture::new();
    let page = fx.root.join("a.html");

    cmd()
        .arg("render")
        .arg(fx.docs.join("a.json"))
        .arg("--output")
        .arg(&page)
        .assert()
        .success();

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("<h3>Encounter</h3>"));
}

#[test]
fn missing_config_file_is_an_error() {
    let fx = Fixture::new();

    cmd()
        .arg("--config")
        .arg(fx.root.join("absent.json"))
        .arg("keys")
        .arg(fx.docs.join("a.json"))
        .assert()
        .failure()
        .stderr(contains("failed to read config"));
}
