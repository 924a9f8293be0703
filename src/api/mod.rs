//! HTTP API module.
//!
//! Localized catalog views and the PDF download endpoint, all under a
//! `/{locale}` prefix.

mod download;
mod resources;

pub use download::*;
pub use resources::*;

use crate::errors::AppError;
use crate::models::Locale;

/// Parse the `{locale}` path segment.
pub fn parse_locale(segment: &str) -> Result<Locale, AppError> {
    segment
        .parse()
        .map_err(|_| AppError::LocaleNotSupported(format!("Unsupported locale {:?}", segment)))
}
