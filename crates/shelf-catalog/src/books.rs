//! Catalog search as a paged source.
//!
//! Cursors are decimal `startIndex` values. When a page reaches the
//! reported `totalItems` the next cursor is a terminal marker; fetching with
//! it returns an empty page without a request, which ends the list.

use async_trait::async_trait;
use shelf_core::{selector, Cursor, ListResult, Page, PageSource, SharedSelector};
use tracing::debug;

use crate::client::{next_cursor, parse_cursor, CatalogClient, Position, MAX_RESULTS_LIMIT};
use crate::types::Volume;

/// Search results for one query, paged through [`CatalogClient::search`].
#[derive(Debug, Clone)]
pub struct VolumeSearchSource {
    client: CatalogClient,
    query: String,
}

impl VolumeSearchSource {
    pub fn new(client: CatalogClient, query: impl Into<String>) -> Self {
        Self {
            client,
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl PageSource<Volume> for VolumeSearchSource {
    async fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> ListResult<Page<Volume>> {
        let start = match parse_cursor(cursor)? {
            Position::Start(start) => start,
            Position::End => {
                debug!(query = %self.query, "search window past total");
                return Ok(Page::empty());
            }
        };

        let window = page_size.clamp(1, MAX_RESULTS_LIMIT);
        let page = self.client.search(&self.query, start, window).await?;

        if page.volumes.is_empty() {
            return Ok(Page::empty());
        }

        let next = next_cursor(start, window, page.total_items);
        Ok(Page::new(page.volumes, Some(next)))
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

fn volume_fields(volume: &Volume) -> Vec<&str> {
    volume.title_and_authors()
}

/// Title and authors; the search fields of every book list.
pub fn volume_selector() -> SharedSelector<Volume> {
    selector::<Volume>(volume_fields)
}
