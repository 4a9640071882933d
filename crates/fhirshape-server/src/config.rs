use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use fhirshape_core::options::{MergeOptions, defaults};
use fhirshape_core::tree::Scalar;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Server settings, read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `FHIRSHAPE_ADDR` | `127.0.0.1:3000` |
/// | `FHIRSHAPE_DOCUMENTS` | `.` |
/// | `FHIRSHAPE_PLACEHOLDER` | `placeholder` |
/// | `FHIRSHAPE_DEFAULT` | `Not provided` |
/// | `FHIRSHAPE_DISCRIMINANT` | `resourceType` |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub documents_dir: PathBuf,
    pub merge: MergeOptions,
    pub projection_default: Scalar,
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let addr_text = lookup("FHIRSHAPE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_text
            .parse()
            .map_err(|e| eyre::eyre!("invalid FHIRSHAPE_ADDR '{addr_text}': {e}"))?;

        let documents_dir = lookup("FHIRSHAPE_DOCUMENTS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut merge = MergeOptions::default();
        if let Some(placeholder) = lookup("FHIRSHAPE_PLACEHOLDER") {
            merge = merge.with_placeholder(placeholder);
        }
        if let Some(discriminant) = lookup("FHIRSHAPE_DISCRIMINANT") {
            merge = merge.with_discriminant(discriminant);
        }

        let projection_default = Scalar::string(
            lookup("FHIRSHAPE_DEFAULT").unwrap_or_else(|| defaults::PROJECTION_VALUE.to_string()),
        );

        Ok(Self {
            addr,
            documents_dir,
            merge,
            projection_default,
        })
    }
}
