//! The tree value both algorithms operate on.
//!
//! A `Tree` is JSON with the three shapes the merge and projection rules
//! care about made explicit: leaves, keyed objects and indexed arrays.
//! Conversions to and from `serde_json::Value` are lossless, and the
//! serde representation is plain JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::path::{FieldPath, Segment};

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    pub fn string(s: impl Into<String>) -> Self {
        Scalar::String(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl TryFrom<Value> for Scalar {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::String(s)),
            Value::Array(_) => Err("expected a scalar, found an array".to_string()),
            Value::Object(_) => Err("expected a scalar, found an object".to_string()),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::String(s) => Value::String(s),
        }
    }
}

/// Which of the three shapes a tree node has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    Object,
    Array,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar => f.write_str("scalar"),
            Kind::Object => f.write_str("object"),
            Kind::Array => f.write_str("array"),
        }
    }
}

/// Recursive record value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Tree {
    Scalar(Scalar),
    Object(BTreeMap<String, Tree>),
    Array(Vec<Tree>),
}

impl Default for Tree {
    fn default() -> Self {
        Tree::empty_object()
    }
}

impl Tree {
    pub fn empty_object() -> Self {
        Tree::Object(BTreeMap::new())
    }

    pub fn empty_array() -> Self {
        Tree::Array(Vec::new())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Tree::Scalar(_) => Kind::Scalar,
            Tree::Object(_) => Kind::Object,
            Tree::Array(_) => Kind::Array,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Tree::Scalar(_))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Tree>> {
        match self {
            Tree::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Tree]> {
        match self {
            Tree::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::Scalar(scalar) => scalar.as_str(),
            _ => None,
        }
    }

    /// Object member lookup. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Tree> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Array element lookup. `None` out of bounds and for non-arrays.
    pub fn index(&self, i: usize) -> Option<&Tree> {
        self.as_array().and_then(|items| items.get(i))
    }

    /// Follow a field path from this node.
    pub fn at_path(&self, path: &FieldPath) -> Option<&Tree> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                Segment::Key(key) => node.get(key),
                Segment::Index(i) => node.index(*i),
            })
    }

    /// Text for humans: strings unquoted, containers as compact JSON.
    pub fn display_text(&self) -> String {
        match self {
            Tree::Scalar(scalar) => scalar.to_string(),
            other => Value::from(other.clone()).to_string(),
        }
    }
}

impl From<Scalar> for Tree {
    fn from(scalar: Scalar) -> Self {
        Tree::Scalar(scalar)
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tree::Scalar(Scalar::Null),
            Value::Bool(b) => Tree::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Tree::Scalar(Scalar::Number(n)),
            Value::String(s) => Tree::Scalar(Scalar::String(s)),
            Value::Array(items) => Tree::Array(items.into_iter().map(Tree::from).collect()),
            Value::Object(map) => {
                Tree::Object(map.into_iter().map(|(k, v)| (k, Tree::from(v))).collect())
            }
        }
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        match tree {
            Tree::Scalar(scalar) => scalar.into(),
            Tree::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Tree::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
