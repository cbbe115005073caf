//! Paginated, filtered list caches for catalog screens.
//!
//! Every list screen (catalog browse, saved books, own posts, posts feed)
//! uses the same [`ListCache`], parametrized by:
//!
//! - the item type ([`Item`]),
//! - the fields the search box looks at ([`FieldSelector`]),
//! - the remote [`PageSource`] it pages through.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shelf_core::{ListCache, ListConfig, PageSource};
//!
//! # async fn example<I: shelf_core::Item>(source: Arc<dyn PageSource<I>>) -> shelf_core::ListResult<()> {
//! let cache = ListCache::builder(source)
//!     .config(ListConfig::default().with_page_size(10))
//!     .build()
//!     .await?;
//!
//! cache.fetch_next().await?;
//! cache.set_search_term("space");
//! // ...after the debounce window:
//! let visible = cache.current_view();
//! # let _ = visible;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SHELF_PAGE_SIZE` | Items per page (default: 10) |
//! | `SHELF_DEBOUNCE_MS` | Search debounce window in ms (default: 300) |
//! | `SHELF_REMOUNT` | Remount policy: `reset` or `preserve` (default: `reset`) |

pub mod cache;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod item;
pub mod source;
pub mod term_store;

pub use cache::{FetchOutcome, ListCache, ListCacheBuilder, SkipReason};
pub use config::{ListConfig, RemountPolicy};
pub use debounce::Debouncer;
pub use error::{ErrorKind, ListError, ListResult};
pub use filter::{filter_items, Needle};
pub use item::{selector, ById, Cursor, FieldSelector, Item, SharedSelector};
pub use source::{Page, PageSource};
pub use term_store::{FileTermStore, MemoryTermStore, TermStore};
