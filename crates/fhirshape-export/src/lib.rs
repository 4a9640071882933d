//! fhirshape-export
//!
//! HTML presentation of bundle documents. Each record type has a view: a
//! list of labelled fields read from the record after projecting it onto the
//! view's shape, so records missing data still render.

pub mod error;
pub mod render;
pub mod styles;
pub mod views;
