use serde::{Deserialize, Serialize};

use crate::tree::Scalar;

/// Built-in values used when nothing is configured.
pub mod defaults {
    /// Field whose value names a record's type.
    pub const DISCRIMINANT: &str = "resourceType";
    /// Leaf value written into models.
    pub const PLACEHOLDER: &str = "placeholder";
    /// Leaf value substituted by projection when the record has no data.
    pub const PROJECTION_VALUE: &str = "Not provided";
    /// Bundle field holding the entry list.
    pub const ENTRY_FIELD: &str = "entry";
    /// Entry field wrapping the record itself.
    pub const RESOURCE_FIELD: &str = "resource";
}

/// What happens when a path already holds a different shape than the
/// record being merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Containers are never downgraded to a leaf. A leaf is upgraded when a
    /// container arrives. Object/array mismatches keep the established
    /// container.
    #[default]
    PreserveShape,
    /// The most recently merged record decides the shape at every path.
    LastWriteWins,
}

/// Knobs for the model builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub discriminant: String,
    pub placeholder: Scalar,
    pub collision: CollisionPolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            discriminant: defaults::DISCRIMINANT.to_string(),
            placeholder: Scalar::string(defaults::PLACEHOLDER),
            collision: CollisionPolicy::default(),
        }
    }
}

impl MergeOptions {
    pub fn with_placeholder(mut self, placeholder: impl Into<Scalar>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_discriminant(mut self, discriminant: impl Into<String>) -> Self {
        self.discriminant = discriminant.into();
        self
    }

    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }
}
