//! PDF download endpoint.

use std::io::ErrorKind;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::parse_locale;
use crate::errors::AppError;
use crate::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// GET /{locale}/api/download/{id} - Stream a catalogued PDF.
pub async fn download_resource(
    State(state): State<AppState>,
    Path((locale, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    // Unknown locales get the same answer as unknown resources here
    let locale = parse_locale(&locale)
        .map_err(|e| AppError::ResourceNotFound(format!("{} for download {}", e.detail(), id)))?;

    let file = state
        .catalog
        .resource_by_id(&id)
        .and_then(|resource| resource.pdf_file())
        .ok_or_else(|| AppError::ResourceNotFound(format!("No downloadable resource {}", id)))?;

    state
        .pending_downloads
        .record(state.tracker.clone(), id.clone())
        .await;

    let path = state.config.public_root.join(file);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::FileMissing(format!(
                "{} for resource {}",
                path.display(),
                id
            )));
        }
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to read {} for resource {}: {}",
                path.display(),
                id,
                e
            )));
        }
    };

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}.pdf\"", id))
        .map_err(|e| AppError::Internal(format!("Invalid filename for {}: {}", id, e)))?;

    tracing::debug!(resource_id = %id, %locale, size = bytes.len(), "Serving download");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
