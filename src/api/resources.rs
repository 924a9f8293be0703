//! Localized catalog endpoints.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::parse_locale;
use crate::errors::AppError;
use crate::models::{Locale, Platform, Resource, ResourceCategory, ResourceKind, University};
use crate::AppState;

/// A resource rendered for one locale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedResource {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

impl LocalizedResource {
    /// Render `resource` for `locale`. `recorded` is the persisted download
    /// count, `None` when downloads are not persisted.
    pub fn new(resource: &Resource, locale: Locale, recorded: Option<i64>) -> Self {
        let download_count = match resource.kind {
            ResourceKind::Pdf => match recorded {
                Some(n) => Some(
                    resource
                        .download_count
                        .unwrap_or(0)
                        .saturating_add(u64::try_from(n).unwrap_or(0)),
                ),
                None => resource.download_count,
            },
            _ => None,
        };

        Self {
            id: resource.id.clone(),
            title: resource.title.get(locale).to_string(),
            description: resource.description.get(locale).to_string(),
            kind: resource.kind,
            file: resource.file.clone(),
            url: resource.url.clone(),
            platform: resource.platform,
            duration: resource.duration.clone(),
            download_count,
        }
    }
}

/// A category rendered for one locale.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedCategory {
    pub id: String,
    pub title: String,
    pub resources: Vec<LocalizedResource>,
}

impl LocalizedCategory {
    fn new(
        category: &ResourceCategory,
        locale: Locale,
        counts: Option<&HashMap<String, i64>>,
    ) -> Self {
        Self {
            id: category.id.clone(),
            title: category.title.get(locale).to_string(),
            resources: category
                .resources
                .iter()
                .map(|resource| {
                    let recorded = counts.map(|c| c.get(&resource.id).copied().unwrap_or(0));
                    LocalizedResource::new(resource, locale, recorded)
                })
                .collect(),
        }
    }
}

/// One university's resource page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityResourcesView {
    pub university: University,
    pub locale: Locale,
    pub categories: Vec<LocalizedCategory>,
}

/// GET /{locale}/api/resources/{university} - List a university's resources.
pub async fn list_university_resources(
    State(state): State<AppState>,
    Path((locale, university)): Path<(String, String)>,
) -> Result<Json<UniversityResourcesView>, AppError> {
    let locale = parse_locale(&locale)?;
    let university: University = university.parse().map_err(|_| {
        AppError::UniversityNotFound(format!("Unknown university {:?}", university))
    })?;

    // Counts are advisory; fall back to catalog values if the store is down
    let counts = match state.tracker.download_counts().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::warn!("Failed to read download counts: {}", e);
            None
        }
    };

    let categories = state
        .catalog
        .university(university)
        .categories
        .iter()
        .map(|category| LocalizedCategory::new(category, locale, counts.as_ref()))
        .collect();

    Ok(Json(UniversityResourcesView {
        university,
        locale,
        categories,
    }))
}

/// GET /{locale}/api/resource/{id} - Get a single resource.
pub async fn get_resource(
    State(state): State<AppState>,
    Path((locale, id)): Path<(String, String)>,
) -> Result<Json<LocalizedResource>, AppError> {
    let locale = parse_locale(&locale)?;
    let resource = state
        .catalog
        .resource_by_id(&id)
        .ok_or_else(|| AppError::ResourceNotFound(format!("Resource {} not found", id)))?;

    let recorded = match state.tracker.download_count(&id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!("Failed to read download count for {}: {}", id, e);
            None
        }
    };

    Ok(Json(LocalizedResource::new(resource, locale, recorded)))
}
