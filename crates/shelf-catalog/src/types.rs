//! Catalog API response types and client configuration.

use serde::{Deserialize, Serialize};
use shelf_core::Item;

/// Response from GET /volumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesResponse {
    /// Total matches reported by the catalog (approximate upstream).
    #[serde(default)]
    pub total_items: u64,

    /// Absent when the requested window is past the last match.
    #[serde(default)]
    pub items: Vec<VolumeResource>,
}

/// A single volume as returned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResource {
    pub id: String,

    #[serde(default)]
    pub volume_info: VolumeInfo,

    #[serde(default)]
    pub access_info: Option<AccessInfo>,
}

/// Bibliographic part of a volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub published_date: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub page_count: Option<u32>,

    #[serde(default)]
    pub average_rating: Option<f32>,

    #[serde(default)]
    pub maturity_rating: Option<String>,

    #[serde(default)]
    pub image_links: Option<ImageLinks>,

    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub small_thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessInfo {
    #[serde(default)]
    pub epub: Option<Availability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub is_available: bool,
}

/// Catalog entry as shown in lists and detail screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,

    /// Empty when the catalog has no title.
    pub title: String,

    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_rating: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub epub_available: bool,
}

impl From<VolumeResource> for Volume {
    fn from(resource: VolumeResource) -> Self {
        let info = resource.volume_info;
        Self {
            id: resource.id,
            title: info.title.unwrap_or_default(),
            authors: info.authors,
            published_date: info.published_date,
            description: info.description,
            page_count: info.page_count,
            average_rating: info.average_rating,
            maturity_rating: info.maturity_rating,
            categories: info.categories,
            thumbnail: info.image_links.and_then(|links| links.thumbnail),
            epub_available: resource
                .access_info
                .and_then(|access| access.epub)
                .is_some_and(|epub| epub.is_available),
        }
    }
}

impl Item for Volume {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Volume {
    /// Title followed by every author; the default search fields.
    pub fn title_and_authors(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(1 + self.authors.len());
        fields.push(self.title.as_str());
        fields.extend(self.authors.iter().map(String::as_str));
        fields
    }
}

/// Catalog client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the volumes API.
    #[serde(default = "default_catalog_url")]
    pub url: String,

    /// API key appended as `key=` when set.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_catalog_url() -> String {
    "https://www.googleapis.com/books/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    500
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SHELF_CATALOG_URL` | Volumes API base URL |
    /// | `SHELF_CATALOG_API_KEY` | API key |
    /// | `SHELF_CATALOG_TIMEOUT` | Request timeout in seconds |
    /// | `SHELF_CATALOG_MAX_RETRIES` | Retries for transient failures |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("SHELF_CATALOG_URL").unwrap_or_else(|_| default_catalog_url()),
            api_key: std::env::var("SHELF_CATALOG_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            timeout_secs: std::env::var("SHELF_CATALOG_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            max_retries: std::env::var("SHELF_CATALOG_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_retries),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the backoff base delay.
    pub fn with_backoff_base_ms(mut self, millis: u64) -> Self {
        self.backoff_base_ms = millis;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_volume_from_resource() {
        let json = r#"{
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "The Google Story",
                "authors": ["David A. Vise", "Mark Malseed"],
                "publishedDate": "2005-11-15",
                "pageCount": 207,
                "averageRating": 3.5,
                "maturityRating": "NOT_MATURE",
                "imageLinks": {"thumbnail": "http://books.example/thumb.jpg"},
                "categories": ["Browsers (Computer programs)"]
            },
            "accessInfo": {"epub": {"isAvailable": true}}
        }"#;
        let resource: VolumeResource = serde_json::from_str(json).unwrap();
        let volume = Volume::from(resource);

        assert_eq!(volume.id, "zyTCAlFPjgYC");
        assert_eq!(volume.title, "The Google Story");
        assert_eq!(volume.authors.len(), 2);
        assert_eq!(volume.page_count, Some(207));
        assert_eq!(
            volume.thumbnail.as_deref(),
            Some("http://books.example/thumb.jpg")
        );
        assert!(volume.epub_available);
    }

    #[test]
    fn test_volume_missing_fields_default() {
        let resource: VolumeResource = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        let volume = Volume::from(resource);

        assert_eq!(volume.title, "");
        assert!(volume.authors.is_empty());
        assert!(volume.categories.is_empty());
        assert!(!volume.epub_available);
        assert_eq!(volume.title_and_authors(), vec![""]);
    }

    #[test]
    fn test_volumes_response_without_items() {
        let response: VolumesResponse =
            serde_json::from_str(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.total_items, 0);
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        std::env::remove_var("SHELF_CATALOG_URL");
        std::env::remove_var("SHELF_CATALOG_API_KEY");
        std::env::remove_var("SHELF_CATALOG_MAX_RETRIES");

        let config = CatalogConfig::from_env();
        assert_eq!(config.url, "https://www.googleapis.com/books/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_config_builder() {
        let config = CatalogConfig::default()
            .with_url("http://localhost:9000")
            .with_api_key("k")
            .with_max_retries(0);

        assert_eq!(config.url, "http://localhost:9000");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.max_retries, 0);
    }
}
