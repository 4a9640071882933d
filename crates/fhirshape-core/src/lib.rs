//! fhirshape-core
//!
//! Shape inference over bundles of typed clinical records.
//! Pure data transformations: no filesystem, no network. The storage,
//! export and server crates are thin consumers of what lives here.

pub mod bundle;
pub mod error;
pub mod options;
pub mod path;
pub mod project;
pub mod registry;
pub mod tree;
