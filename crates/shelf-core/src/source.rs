//! The paged-fetch seam between a list cache and whatever backs it.

use async_trait::async_trait;

use crate::error::ListResult;
use crate::item::Cursor;

/// One page returned by a [`PageSource`].
#[derive(Debug, Clone)]
pub struct Page<I> {
    /// Items in server order.
    pub items: Vec<I>,

    /// Where the next page starts. `None` lets the cache position the cursor
    /// after the last item of this page.
    pub next_cursor: Option<Cursor>,
}

impl<I> Page<I> {
    pub fn new(items: Vec<I>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    /// An empty page; marks the end of the sequence.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Remote paged data source.
///
/// Retrying with the same cursor must not skip results. Returning items the
/// caller already holds is fine; the cache drops them by id.
#[async_trait]
pub trait PageSource<I>: Send + Sync {
    /// Fetch up to `page_size` items starting at `cursor` (`None` = start).
    async fn fetch_page(&self, cursor: Option<&Cursor>, page_size: usize) -> ListResult<Page<I>>;

    /// Short name used in log fields.
    fn name(&self) -> &str {
        "source"
    }
}
