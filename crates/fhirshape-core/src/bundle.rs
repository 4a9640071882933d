//! Unwrapping document envelopes into typed records.
//!
//! A bundle is an object with an `entry` list; each entry wraps one record
//! under `resource`. The record's discriminant names its type.

use tracing::debug;

use crate::error::CoreError;
use crate::options::defaults;
use crate::tree::Tree;

/// One record together with the type it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    pub type_name: String,
    pub record: Tree,
}

/// Pull every typed record out of a bundle document.
///
/// A document without an entry list carries no records and yields an empty
/// vector. An entry that does not wrap an object with a string
/// discriminant is a `MalformedEntry`.
pub fn extract_records(document: &Tree, discriminant: &str) -> Result<Vec<TypedRecord>, CoreError> {
    let Some(entries) = document.get(defaults::ENTRY_FIELD).and_then(Tree::as_array) else {
        debug!("document has no entry list");
        return Ok(Vec::new());
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| unwrap_entry(index, entry, discriminant))
        .collect()
}

/// Like [`extract_records`], but keeps going past bad entries, returning
/// them alongside the good ones.
pub fn extract_records_lenient(
    document: &Tree,
    discriminant: &str,
) -> (Vec<TypedRecord>, Vec<CoreError>) {
    let Some(entries) = document.get(defaults::ENTRY_FIELD).and_then(Tree::as_array) else {
        return (Vec::new(), Vec::new());
    };

    let mut records = Vec::new();
    let mut errors = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match unwrap_entry(index, entry, discriminant) {
            Ok(record) => records.push(record),
            Err(e) => errors.push(e),
        }
    }
    (records, errors)
}

fn unwrap_entry(index: usize, entry: &Tree, discriminant: &str) -> Result<TypedRecord, CoreError> {
    let malformed = |reason: String| CoreError::MalformedEntry { index, reason };

    let resource = entry
        .get(defaults::RESOURCE_FIELD)
        .ok_or_else(|| malformed(format!("no '{}' field", defaults::RESOURCE_FIELD)))?;
    if resource.as_object().is_none() {
        return Err(malformed(format!(
            "'{}' is {}, expected an object",
            defaults::RESOURCE_FIELD,
            resource.kind()
        )));
    }

    let type_name = resource
        .get(discriminant)
        .and_then(Tree::as_str)
        .ok_or_else(|| malformed(format!("no string '{discriminant}' on resource")))?;

    Ok(TypedRecord {
        type_name: type_name.to_string(),
        record: resource.clone(),
    })
}

/// First record of `type_name` in a bundle.
pub fn first_of_type<'a>(document: &'a Tree, type_name: &str, discriminant: &str) -> Option<&'a Tree> {
    document
        .get(defaults::ENTRY_FIELD)?
        .as_array()?
        .iter()
        .filter_map(|entry| entry.get(defaults::RESOURCE_FIELD))
        .find(|resource| resource.get(discriminant).and_then(Tree::as_str) == Some(type_name))
}
