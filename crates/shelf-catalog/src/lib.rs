//! Page sources for shelf lists.
//!
//! This crate plugs the collaborators behind each list screen into
//! [`shelf_core::ListCache`]:
//!
//! - [`VolumeSearchSource`]: catalog search over the Google Books volumes API
//! - [`SavedBooksSource`]: one user's saved books
//! - [`UserPostsSource`]: one user's posts
//! - [`PostFeedSource`]: posts of every user
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shelf_catalog::{volume_selector, CatalogClient, VolumeSearchSource};
//! use shelf_core::ListCache;
//!
//! # async fn example() -> shelf_core::ListResult<()> {
//! let client = CatalogClient::from_env()?;
//! let cache = ListCache::builder(Arc::new(VolumeSearchSource::new(client, "dune")))
//!     .selector(volume_selector())
//!     .build()
//!     .await?;
//!
//! cache.fetch_next().await?;
//! for volume in cache.current_view() {
//!     println!("{}", volume.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SHELF_CATALOG_URL` | Volumes API base URL (default: `https://www.googleapis.com/books/v1`) |
//! | `SHELF_CATALOG_API_KEY` | API key, sent as `key=` |
//! | `SHELF_CATALOG_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `SHELF_CATALOG_MAX_RETRIES` | Max retries for transient failures (default: 2) |

pub mod books;
pub mod client;
pub mod sources;
pub mod store;
pub mod types;

pub use books::{volume_selector, VolumeSearchSource};
pub use client::{CatalogClient, SearchPage, CATALOG_USER_AGENT};
pub use sources::{
    feed_selector, post_selector, saved_book_selector, PostFeedSource, SavedBooksSource,
    UserPostsSource,
};
pub use store::{
    DocumentStore, FeedPost, MemoryStore, Post, SavedBook, UserContext, UserProfile,
};
pub use types::{CatalogConfig, Volume};
