//! Data models for the joint degree resource catalog.
//!
//! Field names match the catalog JSON document (camelCase, `type` tag).

mod locale;
mod resource;

pub use locale::*;
pub use resource::*;
