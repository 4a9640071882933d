//! Model building: fold typed records into one shape template per type.
//!
//! A model is a shape accumulator. Every key and array position ever seen
//! for a type is kept, every leaf value is replaced by the placeholder, and
//! the discriminant is copied through so models stay self-describing.
//! Keys and array lengths only ever grow.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::options::{CollisionPolicy, MergeOptions};
use crate::tree::{Kind, Tree};

/// Per-type models keyed by type name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRegistry {
    models: BTreeMap<String, Tree>,
    options: MergeOptions,
}

impl ModelRegistry {
    pub fn new(options: MergeOptions) -> Self {
        Self {
            models: BTreeMap::new(),
            options,
        }
    }

    /// Rebuild a registry from a previously serialized artifact.
    ///
    /// Every model must be an object, and a discriminant stored in a model
    /// must name the type it is filed under.
    pub fn from_models(
        models: BTreeMap<String, Tree>,
        options: MergeOptions,
    ) -> Result<Self, CoreError> {
        for (type_name, model) in &models {
            if model.kind() != Kind::Object {
                return Err(CoreError::InvalidModel {
                    type_name: type_name.clone(),
                    reason: format!("expected an object, found {}", model.kind()),
                });
            }
            if let Some(tag) = model.get(&options.discriminant)
                && tag.as_str() != Some(type_name.as_str())
            {
                return Err(CoreError::InvalidModel {
                    type_name: type_name.clone(),
                    reason: format!(
                        "discriminant '{}' is {}",
                        options.discriminant,
                        tag.display_text()
                    ),
                });
            }
        }
        Ok(Self { models, options })
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Fold `record` into the model for `type_name`, creating it on first use.
    ///
    /// The record is checked before anything is touched, so a rejected
    /// record leaves the registry as it was.
    pub fn register_record(&mut self, type_name: &str, record: &Tree) -> Result<(), CoreError> {
        let source = record.as_object().ok_or_else(|| {
            CoreError::InvalidRecordShape(format!(
                "expected an object at the top level, found {}",
                record.kind()
            ))
        })?;

        let tag = source.get(&self.options.discriminant).ok_or_else(|| {
            CoreError::InvalidRecordShape(format!(
                "missing discriminant field '{}'",
                self.options.discriminant
            ))
        })?;
        if tag.as_str() != Some(type_name) {
            return Err(CoreError::InvalidRecordShape(format!(
                "discriminant {} does not match type '{type_name}'",
                tag.display_text()
            )));
        }

        let model = self
            .models
            .entry(type_name.to_string())
            .or_insert_with(Tree::empty_object);
        let Tree::Object(target) = model else {
            return Err(CoreError::InvalidModel {
                type_name: type_name.to_string(),
                reason: format!("expected an object, found {}", model.kind()),
            });
        };

        merge_into(target, source, &self.options);
        debug!(type_name, fields = source.len(), "record merged");
        Ok(())
    }

    /// Fold a record whose type is named by its own discriminant.
    /// Returns the type name it was filed under.
    pub fn register(&mut self, record: &Tree) -> Result<String, CoreError> {
        let type_name = record
            .get(&self.options.discriminant)
            .and_then(Tree::as_str)
            .ok_or_else(|| {
                CoreError::InvalidRecordShape(format!(
                    "missing string discriminant field '{}'",
                    self.options.discriminant
                ))
            })?
            .to_string();
        self.register_record(&type_name, record)?;
        Ok(type_name)
    }

    /// Merge every model of `other` into this registry.
    ///
    /// Registries built independently (for instance one per worker over
    /// disjoint document sets) combine into the same shapes a single
    /// sequential pass would produce.
    pub fn absorb(&mut self, other: ModelRegistry) {
        for (type_name, model) in other.models {
            let Tree::Object(source) = model else {
                continue;
            };
            match self.models.get_mut(&type_name) {
                Some(Tree::Object(target)) => merge_into(target, &source, &self.options),
                _ => {
                    let mut fresh = BTreeMap::new();
                    merge_into(&mut fresh, &source, &self.options);
                    self.models.insert(type_name, Tree::Object(fresh));
                }
            }
        }
    }

    pub fn get(&self, type_name: &str) -> Option<&Tree> {
        self.models.get(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn models(&self) -> &BTreeMap<String, Tree> {
        &self.models
    }

    pub fn into_models(self) -> BTreeMap<String, Tree> {
        self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Serialize for ModelRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.models.serialize(serializer)
    }
}

/// Fold the fields of `source` into `target`.
///
/// - the discriminant is copied verbatim
/// - objects and arrays are created on first sight and merged recursively,
///   array elements aligned by index
/// - every other leaf becomes the placeholder
pub fn merge_into(
    target: &mut BTreeMap<String, Tree>,
    source: &BTreeMap<String, Tree>,
    options: &MergeOptions,
) {
    merge_object(target, source, options, &Trail::Root);
}

/// Where in the record the merge currently is. Only rendered for logging.
enum Trail<'a> {
    Root,
    Key(&'a Trail<'a>, &'a str),
    Index(&'a Trail<'a>, usize),
}

impl fmt::Display for Trail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trail::Root => f.write_str("$"),
            Trail::Key(parent, key) => write!(f, "{parent}.{key}"),
            Trail::Index(parent, i) => write!(f, "{parent}.{i}"),
        }
    }
}

fn merge_object(
    target: &mut BTreeMap<String, Tree>,
    source: &BTreeMap<String, Tree>,
    options: &MergeOptions,
    trail: &Trail<'_>,
) {
    for (key, value) in source {
        if *key == options.discriminant {
            target.insert(key.clone(), value.clone());
            continue;
        }

        let here = Trail::Key(trail, key);
        let slot = target
            .entry(key.clone())
            .or_insert_with(|| seed(value, options));
        fold(slot, value, options, &here);
    }
}

fn merge_elements(target: &mut Vec<Tree>, source: &[Tree], options: &MergeOptions, trail: &Trail<'_>) {
    for (i, item) in source.iter().enumerate() {
        let here = Trail::Index(trail, i);
        if i == target.len() {
            target.push(seed(item, options));
        }
        fold(&mut target[i], item, options, &here);
    }
}

/// Fresh model node for a value seen at a path for the first time.
fn seed(value: &Tree, options: &MergeOptions) -> Tree {
    match value {
        Tree::Object(_) => Tree::empty_object(),
        Tree::Array(_) => Tree::empty_array(),
        Tree::Scalar(_) => Tree::Scalar(options.placeholder.clone()),
    }
}

fn fold(slot: &mut Tree, value: &Tree, options: &MergeOptions, trail: &Trail<'_>) {
    match (&mut *slot, value) {
        (Tree::Object(target), Tree::Object(source)) => merge_object(target, source, options, trail),
        (Tree::Array(target), Tree::Array(source)) => merge_elements(target, source, options, trail),
        (Tree::Scalar(_), Tree::Scalar(_)) => *slot = Tree::Scalar(options.placeholder.clone()),
        _ => collide(slot, value, options, trail),
    }
}

fn collide(slot: &mut Tree, value: &Tree, options: &MergeOptions, trail: &Trail<'_>) {
    let established = slot.kind();
    let incoming = value.kind();

    let replace = match options.collision {
        CollisionPolicy::LastWriteWins => true,
        CollisionPolicy::PreserveShape => established == Kind::Scalar,
    };

    if replace {
        debug!(path = %trail, %established, %incoming, "shape replaced");
        *slot = seed(value, options);
        fold(slot, value, options, trail);
    } else if incoming == Kind::Scalar {
        debug!(path = %trail, %established, "scalar ignored where a container is established");
    } else {
        warn!(path = %trail, %established, %incoming, "shape collision, keeping established shape");
    }
}
