//! Catalog client for searching and looking up volumes.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use shelf_core::{ListError, ListResult};
use tracing::debug;

use crate::types::{CatalogConfig, Volume, VolumeResource, VolumesResponse};

mod helpers;
mod http;

pub(crate) use helpers::{next_cursor, parse_cursor, Position, MAX_RESULTS_LIMIT};
use http::HttpBackend;

pub const CATALOG_USER_AGENT: &str = concat!("shelf-catalog/", env!("CARGO_PKG_VERSION"));

/// One window of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub volumes: Vec<Volume>,
    pub total_items: u64,
}

/// Client for the volumes API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: HttpBackend,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> ListResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CATALOG_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ListError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self {
            http: HttpBackend {
                client,
                base_url,
                config,
            },
        })
    }

    pub fn from_env() -> ListResult<Self> {
        Self::new(CatalogConfig::from_env())
    }

    /// Search volumes, returning `max_results` matches starting at `start_index`.
    pub async fn search(
        &self,
        query: &str,
        start_index: u64,
        max_results: usize,
    ) -> ListResult<SearchPage> {
        let max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        let url = helpers::volumes_url(
            &self.http.base_url,
            query,
            start_index,
            max_results,
            self.api_key(),
        )?;
        debug!(query, start_index, max_results, "searching volumes");

        let response: VolumesResponse = self.http.get_json(&url).await?;

        Ok(SearchPage {
            volumes: response.items.into_iter().map(Volume::from).collect(),
            total_items: response.total_items,
        })
    }

    /// Look up a single volume. Unknown ids yield `NotFound`.
    pub async fn fetch_volume(&self, id: &str) -> ListResult<Volume> {
        let url = helpers::volume_url(&self.http.base_url, id, self.api_key())?;
        debug!(id, "fetching volume");

        let resource: VolumeResource = self.http.get_json(&url).await?;
        Ok(resource.into())
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.http.config.api_key.as_deref()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> CatalogClient {
        let config = CatalogConfig::default()
            .with_url(mock_server.uri())
            .with_max_retries(0);
        CatalogClient::new(config).expect("failed to create client")
    }

    #[tokio::test]
    async fn test_search_sends_window_and_user_agent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/volumes"))
            .and(query_param("q", "dune"))
            .and(query_param("startIndex", "20"))
            .and(query_param("maxResults", "10"))
            .and(header("user-agent", CATALOG_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalItems": 21,
                "items": [{"id": "d1", "volumeInfo": {"title": "Dune"}}]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let page = client.search("dune", 20, 10).await.expect("search failed");

        assert_eq!(page.total_items, 21);
        assert_eq!(page.volumes.len(), 1);
        assert_eq!(page.volumes[0].title, "Dune");
    }

    #[tokio::test]
    async fn test_search_clamps_max_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/volumes"))
            .and(query_param("maxResults", "40"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalItems": 0})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let page = client.search("anything", 0, 500).await.unwrap();
        assert!(page.volumes.is_empty());
    }

    #[tokio::test]
    async fn test_api_key_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/volumes/v1"))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "v1",
                "volumeInfo": {"title": "Keyed"}
            })))
            .mount(&mock_server)
            .await;

        let config = CatalogConfig::default()
            .with_url(mock_server.uri())
            .with_api_key("secret")
            .with_max_retries(0);
        let client = CatalogClient::new(config).unwrap();

        let volume = client.fetch_volume("v1").await.unwrap();
        assert_eq!(volume.title, "Keyed");
    }
}
