//! Resource catalog model matching the site's `resources.json` document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LocalizedText;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pdf,
    Video,
    Link,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pdf => "pdf",
            ResourceKind::Video => "video",
            ResourceKind::Link => "link",
        }
    }
}

/// Hosting platform of a video, informational only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Vimeo,
    Bilibili,
}

/// A single downloadable or viewable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Path relative to the public assets root. Required for pdf resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// External location. Required for video and link resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

impl Resource {
    /// The file to serve, if this resource is a downloadable PDF.
    pub fn pdf_file(&self) -> Option<&str> {
        match self.kind {
            ResourceKind::Pdf => self.file.as_deref().filter(|f| !f.is_empty()),
            _ => None,
        }
    }
}

/// Named grouping of resources within a university.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCategory {
    pub id: String,
    pub title: LocalizedText,
    pub resources: Vec<Resource>,
}

/// All categories published for one university.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityResources {
    pub categories: Vec<ResourceCategory>,
}

/// The whole catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesData {
    pub cityu: UniversityResources,
    pub columbia: UniversityResources,
}

/// The two partner universities, in lookup order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum University {
    Cityu,
    Columbia,
}

impl University {
    pub const ALL: [University; 2] = [University::Cityu, University::Columbia];

    pub fn as_str(&self) -> &'static str {
        match self {
            University::Cityu => "cityu",
            University::Columbia => "columbia",
        }
    }
}

impl fmt::Display for University {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for University {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cityu" => Ok(University::Cityu),
            "columbia" => Ok(University::Columbia),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_deserialize_pdf() {
        let resource: Resource = serde_json::from_str(
            r#"{
                "id": "cityu-admission-guide",
                "title": {"en": "Admission Guide", "zh-cn": "招生指南", "zh-hk": "招生指南"},
                "description": {"en": "Guide", "zh-cn": "指南", "zh-hk": "指南"},
                "type": "pdf",
                "file": "resources/cityu/admission-guide.pdf",
                "downloadCount": 42
            }"#,
        )
        .unwrap();

        assert_eq!(resource.kind, ResourceKind::Pdf);
        assert_eq!(resource.download_count, Some(42));
        assert_eq!(resource.pdf_file(), Some("resources/cityu/admission-guide.pdf"));
    }

    #[test]
    fn test_resource_deserialize_video() {
        let resource: Resource = serde_json::from_str(
            r#"{
                "id": "columbia-campus-tour",
                "title": {"en": "Tour"},
                "description": {"en": "Tour"},
                "type": "video",
                "url": "https://www.youtube.com/watch?v=abc",
                "platform": "youtube",
                "duration": "5:30"
            }"#,
        )
        .unwrap();

        assert_eq!(resource.kind, ResourceKind::Video);
        assert_eq!(resource.platform, Some(Platform::Youtube));
        assert_eq!(resource.pdf_file(), None);
    }

    #[test]
    fn test_non_pdf_with_file_is_not_downloadable() {
        let resource: Resource = serde_json::from_str(
            r#"{
                "id": "x",
                "title": {"en": "X"},
                "description": {"en": "X"},
                "type": "link",
                "file": "resources/x.pdf",
                "url": "https://example.com"
            }"#,
        )
        .unwrap();

        assert_eq!(resource.pdf_file(), None);
    }

    #[test]
    fn test_invalid_type_tag_rejected() {
        let result = serde_json::from_str::<Resource>(
            r#"{"id": "x", "title": {}, "description": {}, "type": "audio"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_university_round_trip_names() {
        for university in University::ALL {
            assert_eq!(university.as_str().parse::<University>(), Ok(university));
        }
        assert!("harvard".parse::<University>().is_err());
    }
}
