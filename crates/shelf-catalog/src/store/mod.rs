//! Document store abstraction for per-user saved books and posts.
//!
//! The hosted document database is an external collaborator; this module is
//! the minimal interface the list screens need from it. Every user-scoped
//! call takes an explicit [`UserContext`] instead of reading a "current user"
//! from shared state.
//!
//! # Layout
//!
//! ```text
//! users/{email}                  # UserProfile
//! users/{email}/books/{volumeId} # SavedBook
//! users/{email}/posts/{name}     # Post
//! ```
//!
//! Listings are ordered by document id and resume strictly after the given
//! id. Placeholder documents created with a new user are never listed.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_core::{Item, ListError, ListResult};

use crate::types::Volume;

pub use memory::MemoryStore;

/// Id of the placeholder document seeded into a new user's books.
pub const PLACEHOLDER_BOOK: &str = "exampleBook";

/// Id of the placeholder document seeded into a new user's posts.
pub const PLACEHOLDER_POST: &str = "examplePost";

/// Shown for posts saved without text.
pub const EMPTY_POST_TEXT: &str = "No text provided";

/// Who a data-access call acts for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserContext {
    email: String,
}

impl UserContext {
    pub fn new(email: impl Into<String>) -> ListResult<Self> {
        let email = email.into().trim().to_string();
        if email.is_empty() {
            return Err(ListError::Config {
                message: "user context requires an email".to_string(),
            });
        }
        Ok(Self { email })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Top-level user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
}

/// A catalog volume saved to a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBook {
    /// Catalog volume id.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl SavedBook {
    pub fn from_volume(volume: &Volume) -> Self {
        let title = if volume.title.is_empty() {
            "N/A".to_string()
        } else {
            volume.title.clone()
        };
        Self {
            id: volume.id.clone(),
            title,
            authors: volume.authors.clone(),
        }
    }

    pub fn title_and_authors(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(1 + self.authors.len());
        fields.push(self.title.as_str());
        fields.extend(self.authors.iter().map(String::as_str));
        fields
    }
}

impl Item for SavedBook {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A short text post. The id is the post's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Text for display; empty text shows a fixed notice.
    pub fn display_text(&self) -> &str {
        if self.text.trim().is_empty() {
            EMPTY_POST_TEXT
        } else {
            &self.text
        }
    }
}

impl Item for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A post in the all-users feed, with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPost {
    /// `{email}/{post name}`; unique across users.
    pub key: String,
    pub post: Post,
    pub username: String,
    pub email: String,
}

impl FeedPost {
    pub fn new(author: &UserProfile, post: Post) -> Self {
        Self {
            key: feed_key(&author.email, &post.id),
            username: author.username.clone(),
            email: author.email.clone(),
            post,
        }
    }
}

impl Item for FeedPost {
    fn id(&self) -> &str {
        &self.key
    }
}

/// `<email>/<post name>`, with `%` and `/` escaped in the email part so the
/// first `/` always separates the two.
pub fn feed_key(email: &str, post_id: &str) -> String {
    format!("{}/{}", email.replace('%', "%25").replace('/', "%2F"), post_id)
}

/// Split a feed key into `(email, post name)`.
pub fn split_feed_key(key: &str) -> Option<(String, &str)> {
    let (email, name) = key.split_once('/')?;
    Some((email.replace("%2F", "/").replace("%25", "%"), name))
}

/// Storage for user documents.
///
/// Missing users or documents are reported as [`ListError::NotFound`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create or replace the user document and seed its placeholders.
    async fn register_user(&self, profile: UserProfile) -> ListResult<()>;

    async fn get_user(&self, ctx: &UserContext) -> ListResult<UserProfile>;

    /// Save (or overwrite) a book in the user's list.
    async fn save_book(&self, ctx: &UserContext, book: SavedBook) -> ListResult<()>;

    async fn get_book(&self, ctx: &UserContext, id: &str) -> ListResult<SavedBook>;

    async fn remove_book(&self, ctx: &UserContext, id: &str) -> ListResult<()>;

    /// Up to `limit` books with id strictly greater than `after`.
    async fn list_books(
        &self,
        ctx: &UserContext,
        after: Option<&str>,
        limit: usize,
    ) -> ListResult<Vec<SavedBook>>;

    /// Create (or overwrite) the post `name`, stamped with the store's clock.
    async fn create_post(&self, ctx: &UserContext, name: &str, text: &str) -> ListResult<Post>;

    async fn get_post(&self, ctx: &UserContext, name: &str) -> ListResult<Post>;

    /// Up to `limit` of the user's posts with name strictly greater than `after`.
    async fn list_posts(
        &self,
        ctx: &UserContext,
        after: Option<&str>,
        limit: usize,
    ) -> ListResult<Vec<Post>>;

    /// Posts of every user, ordered by (email, name), resuming after a feed key.
    async fn list_feed(&self, after: Option<&str>, limit: usize) -> ListResult<Vec<FeedPost>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_context_requires_email() {
        assert!(UserContext::new("  ").is_err());
        assert_eq!(
            UserContext::new(" reader@example.com ").unwrap().email(),
            "reader@example.com"
        );
    }

    #[test]
    fn test_saved_book_defaults_title() {
        let volume = Volume {
            id: "v1".into(),
            title: String::new(),
            authors: vec!["Anon".into()],
            published_date: None,
            description: None,
            page_count: None,
            average_rating: None,
            maturity_rating: None,
            categories: Vec::new(),
            thumbnail: None,
            epub_available: false,
        };
        let book = SavedBook::from_volume(&volume);
        assert_eq!(book.title, "N/A");
        assert_eq!(book.title_and_authors(), vec!["N/A", "Anon"]);
    }

    #[test]
    fn test_post_display_text() {
        let mut post = Post {
            id: "hello".into(),
            text: String::new(),
            created_at: Utc::now(),
        };
        assert_eq!(post.display_text(), EMPTY_POST_TEXT);
        post.text = "hi".into();
        assert_eq!(post.display_text(), "hi");
    }

    #[test]
    fn test_feed_key_roundtrip() {
        let key = feed_key("a@example.com", "my/post");
        assert_eq!(
            split_feed_key(&key),
            Some(("a@example.com".to_string(), "my/post"))
        );
    }

    #[test]
    fn test_feed_key_escapes_slash_in_email() {
        let key = feed_key("a/b%2F@example.com", "one/two");
        assert_eq!(key, "a%2Fb%252F@example.com/one/two");
        assert_eq!(
            split_feed_key(&key),
            Some(("a/b%2F@example.com".to_string(), "one/two"))
        );
    }
}
