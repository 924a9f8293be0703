//! Resource catalog store and lookups.
//!
//! The catalog is read once at startup, validated, and shared read-only
//! between handlers behind an `Arc`.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::models::{
    Locale, LocalizedText, Resource, ResourceKind, ResourcesData, University, UniversityResources,
};

/// Errors raised while loading the catalog document.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{context} has no {field} text for locale {locale}")]
    MissingLocale {
        context: String,
        field: &'static str,
        locale: Locale,
    },

    #[error("{context} has an empty id")]
    EmptyId { context: String },

    #[error("pdf resource {id} has no file")]
    MissingFile { id: String },

    #[error("{kind} resource {id} has no url")]
    MissingUrl { id: String, kind: &'static str },

    #[error("resource {id} has an invalid file path {file:?}")]
    InvalidFilePath { id: String, file: String },

    #[error("duplicate resource id {id}")]
    DuplicateResourceId { id: String },

    #[error("duplicate category id {id} in {university}")]
    DuplicateCategoryId { university: University, id: String },
}

/// Validated, immutable resource catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    data: ResourcesData,
}

impl Catalog {
    /// Read and validate the catalog document at `path`.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate an in-memory catalog document.
    pub fn from_json(raw: &str) -> Result<Self, CatalogLoadError> {
        let data: ResourcesData = serde_json::from_str(raw)?;
        Self::from_data(data)
    }

    pub fn from_data(data: ResourcesData) -> Result<Self, CatalogLoadError> {
        validate(&data)?;
        Ok(Self { data })
    }

    /// All categories published for `university`.
    pub fn university(&self, university: University) -> &UniversityResources {
        match university {
            University::Cityu => &self.data.cityu,
            University::Columbia => &self.data.columbia,
        }
    }

    /// Every resource, cityu before columbia, in catalog order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> + '_ {
        University::ALL.into_iter().flat_map(move |university| {
            self.university(university)
                .categories
                .iter()
                .flat_map(|category| category.resources.iter())
        })
    }

    /// First resource carrying `id`, or `None`.
    pub fn resource_by_id(&self, id: &str) -> Option<&Resource> {
        self.resources().find(|resource| resource.id == id)
    }
}

fn validate(data: &ResourcesData) -> Result<(), CatalogLoadError> {
    let mut resource_ids = HashSet::new();

    for university in University::ALL {
        let resources = match university {
            University::Cityu => &data.cityu,
            University::Columbia => &data.columbia,
        };

        let mut category_ids = HashSet::new();
        for category in &resources.categories {
            let context = format!("category {}/{}", university, category.id);
            if category.id.trim().is_empty() {
                return Err(CatalogLoadError::EmptyId { context });
            }
            if !category_ids.insert(category.id.as_str()) {
                return Err(CatalogLoadError::DuplicateCategoryId {
                    university,
                    id: category.id.clone(),
                });
            }
            require_locales(&category.title, &context, "title")?;

            for resource in &category.resources {
                if resource.id.trim().is_empty() {
                    return Err(CatalogLoadError::EmptyId {
                        context: format!("resource in {}", context),
                    });
                }
                if !resource_ids.insert(resource.id.as_str()) {
                    return Err(CatalogLoadError::DuplicateResourceId {
                        id: resource.id.clone(),
                    });
                }
                validate_resource(resource)?;
            }
        }
    }

    Ok(())
}

fn validate_resource(resource: &Resource) -> Result<(), CatalogLoadError> {
    let context = format!("resource {}", resource.id);
    require_locales(&resource.title, &context, "title")?;
    require_locales(&resource.description, &context, "description")?;

    match resource.kind {
        ResourceKind::Pdf => {
            let file = resource
                .file
                .as_deref()
                .filter(|f| !f.trim().is_empty())
                .ok_or_else(|| CatalogLoadError::MissingFile {
                    id: resource.id.clone(),
                })?;
            if !is_plain_relative_path(file) {
                return Err(CatalogLoadError::InvalidFilePath {
                    id: resource.id.clone(),
                    file: file.to_string(),
                });
            }
            if resource.url.is_some() {
                tracing::debug!("Ignoring url on pdf resource {}", resource.id);
            }
        }
        ResourceKind::Video | ResourceKind::Link => {
            if resource.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
                return Err(CatalogLoadError::MissingUrl {
                    id: resource.id.clone(),
                    kind: resource.kind.as_str(),
                });
            }
        }
    }

    Ok(())
}

fn require_locales(
    text: &LocalizedText,
    context: &str,
    field: &'static str,
) -> Result<(), CatalogLoadError> {
    match text.missing_locales().first() {
        Some(&locale) => Err(CatalogLoadError::MissingLocale {
            context: context.to_string(),
            field,
            locale,
        }),
        None => Ok(()),
    }
}

/// A path made only of normal components, so joining it onto the public
/// root can never leave that root.
fn is_plain_relative_path(file: &str) -> bool {
    let path = Path::new(file);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn text(s: &str) -> Value {
        json!({ "en": s, "zh-cn": format!("{s} (简)"), "zh-hk": format!("{s} (繁)") })
    }

    fn pdf(id: &str, file: &str) -> Value {
        json!({
            "id": id,
            "title": text(id),
            "description": text("pdf"),
            "type": "pdf",
            "file": file
        })
    }

    fn video(id: &str) -> Value {
        json!({
            "id": id,
            "title": text(id),
            "description": text("video"),
            "type": "video",
            "url": format!("https://www.youtube.com/watch?v={id}"),
            "platform": "youtube",
            "duration": "3:20"
        })
    }

    fn document(cityu: Vec<Value>, columbia: Vec<Value>) -> Value {
        json!({
            "cityu": { "categories": [{ "id": "admission", "title": text("Admission"), "resources": cityu }] },
            "columbia": { "categories": [{ "id": "admission", "title": text("Admission"), "resources": columbia }] }
        })
    }

    fn load(doc: Value) -> Result<Catalog, CatalogLoadError> {
        Catalog::from_json(&doc.to_string())
    }

    fn sample() -> Catalog {
        load(document(
            vec![
                pdf("cityu-admission-guide", "resources/cityu/admission-guide.pdf"),
                video("cityu-campus-tour"),
            ],
            vec![pdf("columbia-handbook", "resources/columbia/handbook.pdf")],
        ))
        .unwrap()
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = sample();
        let resource = catalog.resource_by_id("columbia-handbook").unwrap();
        assert_eq!(resource.kind, ResourceKind::Pdf);
        assert_eq!(resource.file.as_deref(), Some("resources/columbia/handbook.pdf"));
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let catalog = sample();
        let first = catalog.resource_by_id("cityu-campus-tour").map(|r| r.id.clone());
        let second = catalog.resource_by_id("cityu-campus-tour").map(|r| r.id.clone());
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("cityu-campus-tour"));
    }

    #[test]
    fn test_unknown_id_is_none() {
        let catalog = sample();
        assert!(catalog.resource_by_id("does-not-exist").is_none());
        assert!(catalog.resource_by_id("").is_none());
    }

    #[test]
    fn test_university_lookup() {
        let catalog = sample();
        let cityu = catalog.university(University::Cityu);
        assert_eq!(cityu.categories.len(), 1);
        assert_eq!(cityu.categories[0].resources.len(), 2);
        assert_eq!(cityu.categories[0].resources[0].id, "cityu-admission-guide");

        let columbia = catalog.university(University::Columbia);
        assert_eq!(columbia.categories[0].resources[0].id, "columbia-handbook");
    }

    #[test]
    fn test_resources_in_catalog_order() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.resources().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["cityu-admission-guide", "cityu-campus-tour", "columbia-handbook"]
        );
    }

    #[test]
    fn test_pdfs_have_files_and_others_have_urls() {
        let catalog = sample();
        for resource in catalog.resources() {
            match resource.kind {
                ResourceKind::Pdf => assert!(!resource.file.as_deref().unwrap_or("").is_empty()),
                _ => assert!(!resource.url.as_deref().unwrap_or("").is_empty()),
            }
        }
    }

    #[test]
    fn test_pdf_without_file_rejected() {
        let mut resource = pdf("broken", "x.pdf");
        resource.as_object_mut().unwrap().remove("file");
        let err = load(document(vec![resource], vec![])).unwrap_err();
        assert!(matches!(err, CatalogLoadError::MissingFile { id } if id == "broken"));
    }

    #[test]
    fn test_video_without_url_rejected() {
        let mut resource = video("broken");
        resource.as_object_mut().unwrap().remove("url");
        let err = load(document(vec![], vec![resource])).unwrap_err();
        assert!(matches!(err, CatalogLoadError::MissingUrl { id, kind: "video" } if id == "broken"));
    }

    #[test]
    fn test_link_without_url_rejected() {
        let resource = json!({
            "id": "bare-link",
            "title": text("Link"),
            "description": text("link"),
            "type": "link"
        });
        let err = load(document(vec![resource], vec![])).unwrap_err();
        assert!(matches!(err, CatalogLoadError::MissingUrl { id, kind: "link" } if id == "bare-link"));

        let resource = json!({
            "id": "blank-link",
            "title": text("Link"),
            "description": text("link"),
            "type": "link",
            "url": "  "
        });
        let err = load(document(vec![], vec![resource])).unwrap_err();
        assert!(matches!(err, CatalogLoadError::MissingUrl { kind: "link", .. }));
    }

    #[test]
    fn test_missing_locale_rejected() {
        let mut resource = pdf("partial", "x.pdf");
        resource["description"] = json!({ "en": "only english", "zh-cn": "只有简体" });
        let err = load(document(vec![resource], vec![])).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::MissingLocale { field: "description", locale: Locale::ZhHk, .. }
        ));
    }

    #[test]
    fn test_missing_category_locale_rejected() {
        let mut doc = document(vec![], vec![]);
        doc["columbia"]["categories"][0]["title"] = json!({ "en": "Admission" });
        let err = load(doc).unwrap_err();
        assert!(matches!(err, CatalogLoadError::MissingLocale { field: "title", .. }));
    }

    #[test]
    fn test_invalid_type_rejected() {
        let mut resource = pdf("odd", "x.pdf");
        resource["type"] = json!("podcast");
        let err = load(document(vec![resource], vec![])).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Parse(_)));
    }

    #[test]
    fn test_missing_university_rejected() {
        let err = Catalog::from_json(r#"{"cityu": {"categories": []}}"#).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Parse(_)));
    }

    #[test]
    fn test_duplicate_resource_id_rejected() {
        let err = load(document(
            vec![pdf("shared-id", "a.pdf")],
            vec![pdf("shared-id", "b.pdf")],
        ))
        .unwrap_err();
        assert!(matches!(err, CatalogLoadError::DuplicateResourceId { id } if id == "shared-id"));
    }

    #[test]
    fn test_duplicate_category_id_rejected() {
        let mut doc = document(vec![], vec![]);
        let category = doc["cityu"]["categories"][0].clone();
        doc["cityu"]["categories"].as_array_mut().unwrap().push(category);
        let err = load(doc).unwrap_err();
        assert!(matches!(
            err,
            CatalogLoadError::DuplicateCategoryId { university: University::Cityu, .. }
        ));
    }

    #[test]
    fn test_same_category_id_across_universities_allowed() {
        assert!(load(document(vec![], vec![])).is_ok());
    }

    #[test]
    fn test_escaping_file_path_rejected() {
        for file in ["../secrets.pdf", "/etc/passwd", "resources/../../x.pdf", "./x.pdf"] {
            let err = load(document(vec![pdf("escape", file)], vec![])).unwrap_err();
            assert!(
                matches!(err, CatalogLoadError::InvalidFilePath { .. }),
                "{file} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Catalog::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }

    #[test]
    fn test_shipped_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("content/resources.json");
        let catalog = Catalog::load(&path).unwrap();
        let guide = catalog.resource_by_id("cityu-admission-guide").unwrap();
        assert_eq!(guide.kind, ResourceKind::Pdf);
    }
}
