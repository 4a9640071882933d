//! fhirshape-storage
//!
//! Filesystem side of the pipeline: scanning a directory of bundle
//! documents, folding them into a registry and writing the registry
//! artifact back out.

pub mod documents;
pub mod error;
pub mod ingest;
pub mod state;
