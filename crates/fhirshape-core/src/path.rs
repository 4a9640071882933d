use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::tree::Tree;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A dotted path into a tree, e.g. `name.0.given`.
///
/// Purely numeric segments address array elements; everything else is an
/// object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        if text.is_empty() {
            return Err(CoreError::InvalidPath("empty path".to_string()));
        }

        let segments = text
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    return Err(CoreError::InvalidPath(format!("empty segment in '{text}'")));
                }
                if part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<usize>()
                        .map(Segment::Index)
                        .map_err(|e| CoreError::InvalidPath(format!("{text}: {e}")))
                } else {
                    Ok(Segment::Key(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl FromStr for FieldPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Key(key) => f.write_str(key)?,
                Segment::Index(idx) => write!(f, "{idx}")?,
            }
        }
        Ok(())
    }
}

/// Every dotted path reachable in `tree`, parents before children.
///
/// Object keys come out in map order, array elements by index.
pub fn field_paths(tree: &Tree) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(tree, "", &mut out);
    out
}

fn collect_paths(node: &Tree, prefix: &str, out: &mut Vec<String>) {
    let join = |step: &str| {
        if prefix.is_empty() {
            step.to_string()
        } else {
            format!("{prefix}.{step}")
        }
    };

    match node {
        Tree::Object(map) => {
            for (key, child) in map {
                let path = join(key);
                out.push(path.clone());
                collect_paths(child, &path, out);
            }
        }
        Tree::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let path = join(&i.to_string());
                out.push(path.clone());
                collect_paths(child, &path, out);
            }
        }
        Tree::Scalar(_) => {}
    }
}
