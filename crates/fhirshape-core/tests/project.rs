use fhirshape_core::path::{FieldPath, field_paths};
use fhirshape_core::project::{project, template_from_paths};
use fhirshape_core::tree::{Scalar, Tree};
use serde_json::{Value, json};

fn tree(value: Value) -> Tree {
    Tree::from(value)
}

fn na() -> Scalar {
    Scalar::string("N/A")
}

#[test]
fn present_fields_are_copied_and_absent_fields_defaulted() {
    let model = tree(json!({"type": "Patient", "name": "<SENTINEL>", "age": "<SENTINEL>"}));
    let record = tree(json!({"type": "Patient", "name": "Bob"}));

    let out = project(&model, Some(&record), &na());

    assert_eq!(
        Value::from(out),
        json!({"type": "Patient", "name": "Bob", "age": "N/A"})
    );
}

#[test]
fn extra_record_fields_are_dropped() {
    let model = tree(json!({"name": "<S>"}));
    let record = tree(json!({"name": "Bob", "secret": "x", "nested": {"a": 1}}));

    assert_eq!(
        Value::from(project(&model, Some(&record), &na())),
        json!({"name": "Bob"})
    );
}

#[test]
fn absent_record_defaults_every_leaf() {
    let model = tree(json!({
        "name": [{"given": ["<S>", "<S>"], "family": "<S>"}],
        "address": {"city": "<S>"}
    }));

    assert_eq!(
        Value::from(project(&model, None, &na())),
        json!({
            "name": [{"given": ["N/A", "N/A"], "family": "N/A"}],
            "address": {"city": "N/A"}
        })
    );
}

#[test]
fn arrays_take_model_length() {
    let model = tree(json!({"tags": ["<S>", "<S>", "<S>"]}));

    let short = project(&model, Some(&tree(json!({"tags": ["a"]}))), &na());
    assert_eq!(Value::from(short), json!({"tags": ["a", "N/A", "N/A"]}));

    let long = project(&model, Some(&tree(json!({"tags": ["a", "b", "c", "d"]}))), &na());
    assert_eq!(Value::from(long), json!({"tags": ["a", "b", "c"]}));
}

#[test]
fn leaf_copies_record_value_verbatim() {
    let model = tree(json!({"a": "<S>", "b": "<S>", "c": "<S>"}));
    let record = tree(json!({"a": null, "b": {"deep": [1]}, "c": 7}));

    assert_eq!(
        Value::from(project(&model, Some(&record), &na())),
        json!({"a": null, "b": {"deep": [1]}, "c": 7})
    );
}

#[test]
fn kind_mismatch_in_record_is_treated_as_absent() {
    let model = tree(json!({"name": {"family": "<S>"}, "tags": ["<S>"]}));
    let record = tree(json!({"name": "flat", "tags": {"0": "x"}}));

    assert_eq!(
        Value::from(project(&model, Some(&record), &na())),
        json!({"name": {"family": "N/A"}, "tags": ["N/A"]})
    );
}

#[test]
fn projection_has_exactly_the_model_paths() {
    let model = tree(json!({
        "resourceType": "Encounter",
        "period": {"start": "<S>", "end": "<S>"},
        "participant": [{"individual": {"display": "<S>"}}, {"type": ["<S>"]}]
    }));
    let record = tree(json!({
        "resourceType": "Encounter",
        "period": {"start": "2020"},
        "participant": [{"individual": {"display": "Dr A", "ref": "x"}}],
        "status": "finished"
    }));

    let out = project(&model, Some(&record), &na());
    assert_eq!(field_paths(&out), field_paths(&model));
}

#[test]
fn projection_does_not_touch_inputs() {
    let model = tree(json!({"a": "<S>"}));
    let record = tree(json!({"a": 1, "b": 2}));
    let (model_before, record_before) = (model.clone(), record.clone());

    let first = project(&model, Some(&record), &na());
    let second = project(&model, Some(&record), &na());

    assert_eq!(first, second);
    assert_eq!(model, model_before);
    assert_eq!(record, record_before);
}

#[test]
fn scalar_model_returns_record_or_default() {
    let model = tree(json!("<S>"));
    assert_eq!(project(&model, None, &na()), Tree::Scalar(na()));
    assert_eq!(project(&model, Some(&tree(json!([1]))), &na()), tree(json!([1])));
}

#[test]
fn template_from_paths_builds_leaves() {
    let paths: Vec<FieldPath> = ["name.0.given", "name.0.family", "address.1.city", "gender"]
        .iter()
        .map(|p| FieldPath::parse(p).unwrap())
        .collect();

    let template = template_from_paths(&paths, &Scalar::string("<S>"));

    assert_eq!(
        Value::from(template),
        json!({
            "name": [{"given": "<S>", "family": "<S>"}],
            "address": ["<S>", {"city": "<S>"}],
            "gender": "<S>"
        })
    );
}

#[test]
fn longer_path_turns_leaf_into_container() {
    let paths: Vec<FieldPath> = ["code", "code.text"]
        .iter()
        .map(|p| FieldPath::parse(p).unwrap())
        .collect();

    let template = template_from_paths(&paths, &Scalar::string("<S>"));

    assert_eq!(Value::from(template), json!({"code": {"text": "<S>"}}));
}
