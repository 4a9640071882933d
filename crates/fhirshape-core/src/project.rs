//! Template-guided projection.
//!
//! `project` reshapes a record so it has exactly the keys and array lengths
//! of a model. Data the record has is copied, data it lacks becomes the
//! default, data the model does not know about is dropped.

use std::collections::BTreeMap;

use crate::path::{FieldPath, Segment};
use crate::tree::{Scalar, Tree};

/// Project `record` onto the shape of `model`.
///
/// Never fails on missing data: absence at any depth yields `default` at
/// every leaf below it. Neither input is modified.
pub fn project(model: &Tree, record: Option<&Tree>, default: &Scalar) -> Tree {
    match model {
        Tree::Object(fields) => Tree::Object(
            fields
                .iter()
                .map(|(key, child)| {
                    let value = record.and_then(|r| r.get(key));
                    (key.clone(), project(child, value, default))
                })
                .collect(),
        ),
        Tree::Array(items) => Tree::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, child)| project(child, record.and_then(|r| r.index(i)), default))
                .collect(),
        ),
        Tree::Scalar(_) => match record {
            Some(value) => value.clone(),
            None => Tree::Scalar(default.clone()),
        },
    }
}

/// Build a template whose leaves are exactly `paths`.
///
/// Array segments materialize every index up to the one named; positions
/// not named by any path hold the sentinel. A path that runs through a
/// position another path already made a leaf turns that leaf into a
/// container.
pub fn template_from_paths<'a>(
    paths: impl IntoIterator<Item = &'a FieldPath>,
    sentinel: &Scalar,
) -> Tree {
    let mut root = Tree::empty_object();
    for path in paths {
        insert_path(&mut root, path.segments(), sentinel);
    }
    root
}

fn insert_path(node: &mut Tree, segments: &[Segment], sentinel: &Scalar) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    let child_seed = || match rest.first() {
        None => Tree::Scalar(sentinel.clone()),
        Some(Segment::Key(_)) => Tree::empty_object(),
        Some(Segment::Index(_)) => Tree::empty_array(),
    };

    match head {
        Segment::Key(key) => {
            if !matches!(node, Tree::Object(_)) {
                *node = Tree::Object(BTreeMap::new());
            }
            if let Tree::Object(map) = node {
                let child = map.entry(key.clone()).or_insert_with(child_seed);
                reshape(child, rest);
                insert_path(child, rest, sentinel);
            }
        }
        Segment::Index(i) => {
            if !matches!(node, Tree::Array(_)) {
                *node = Tree::Array(Vec::new());
            }
            if let Tree::Array(items) = node {
                while items.len() <= *i {
                    items.push(Tree::Scalar(sentinel.clone()));
                }
                reshape(&mut items[*i], rest);
                insert_path(&mut items[*i], rest, sentinel);
            }
        }
    }
}

/// Make sure a node can hold the remainder of a path.
fn reshape(node: &mut Tree, rest: &[Segment]) {
    match rest.first() {
        Some(Segment::Key(_)) if !matches!(node, Tree::Object(_)) => *node = Tree::empty_object(),
        Some(Segment::Index(_)) if !matches!(node, Tree::Array(_)) => *node = Tree::empty_array(),
        _ => {}
    }
}
