use std::path::Path;

use serde::{Deserialize, Serialize};

use fhirshape_core::options::{MergeOptions, defaults};
use fhirshape_core::tree::Scalar;
use fhirshape_export::render::RenderOptions;
use fhirshape_storage::ingest::IngestPolicy;

/// Settings a config file may carry. Every field is optional; command-line
/// flags win over the file, the file wins over built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub merge: MergeOptions,
    pub projection_default: Scalar,
    pub ingest_policy: IngestPolicy,
    pub render: RenderOptions,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            merge: MergeOptions::default(),
            projection_default: Scalar::string(defaults::PROJECTION_VALUE),
            ingest_policy: IngestPolicy::default(),
            render: RenderOptions::default(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> eyre::Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;
    let mut config: CliConfig = serde_json::from_str(&contents)
        .map_err(|e| eyre::eyre!("invalid config at {}: {e}", path.display()))?;

    // One discriminant for building and rendering unless the file sets both.
    let render_set = serde_json::from_str::<serde_json::Value>(&contents)?
        .pointer("/render/discriminant")
        .is_some();
    if !render_set {
        config.render.discriminant = config.merge.discriminant.clone();
    }

    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
