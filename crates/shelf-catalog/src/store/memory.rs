//! In-process document store.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::Utc;
use shelf_core::{ListError, ListResult};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    split_feed_key, DocumentStore, FeedPost, Post, SavedBook, UserContext, UserProfile,
    PLACEHOLDER_BOOK, PLACEHOLDER_POST,
};

#[derive(Debug, Clone)]
struct UserDoc {
    profile: UserProfile,
    books: BTreeMap<String, SavedBook>,
    posts: BTreeMap<String, Post>,
}

impl UserDoc {
    fn seeded(profile: UserProfile) -> Self {
        let mut books = BTreeMap::new();
        books.insert(
            PLACEHOLDER_BOOK.to_string(),
            SavedBook {
                id: PLACEHOLDER_BOOK.to_string(),
                title: "Example Book".to_string(),
                authors: Vec::new(),
            },
        );
        let mut posts = BTreeMap::new();
        posts.insert(
            PLACEHOLDER_POST.to_string(),
            Post {
                id: PLACEHOLDER_POST.to_string(),
                text: String::new(),
                created_at: Utc::now(),
            },
        );
        Self {
            profile,
            books,
            posts,
        }
    }
}

/// [`DocumentStore`] backed by id-ordered maps behind a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<String, UserDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn user_missing(ctx: &UserContext) -> ListError {
    ListError::not_found(format!("users/{}", ctx.email()))
}

/// Entries strictly after `after`, skipping `placeholder`, at most `limit`.
fn page_after<T: Clone>(
    map: &BTreeMap<String, T>,
    after: Option<&str>,
    limit: usize,
    placeholder: &str,
) -> Vec<T> {
    let lower = match after {
        Some(after) => Bound::Excluded(after),
        None => Bound::Unbounded,
    };
    map.range::<str, _>((lower, Bound::Unbounded))
        .filter(|(id, _)| id.as_str() != placeholder)
        .take(limit)
        .map(|(_, value)| value.clone())
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn register_user(&self, profile: UserProfile) -> ListResult<()> {
        let ctx = UserContext::new(profile.email.clone())?;
        debug!(email = ctx.email(), username = %profile.username, "registering user");
        let mut users = self.users.write().await;
        users.insert(ctx.email().to_string(), UserDoc::seeded(profile));
        Ok(())
    }

    async fn get_user(&self, ctx: &UserContext) -> ListResult<UserProfile> {
        let users = self.users.read().await;
        users
            .get(ctx.email())
            .map(|doc| doc.profile.clone())
            .ok_or_else(|| user_missing(ctx))
    }

    async fn save_book(&self, ctx: &UserContext, book: SavedBook) -> ListResult<()> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        debug!(email = ctx.email(), id = %book.id, "saving book");
        doc.books.insert(book.id.clone(), book);
        Ok(())
    }

    async fn get_book(&self, ctx: &UserContext, id: &str) -> ListResult<SavedBook> {
        let users = self.users.read().await;
        let doc = users.get(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        doc.books
            .get(id)
            .filter(|_| id != PLACEHOLDER_BOOK)
            .cloned()
            .ok_or_else(|| ListError::not_found(format!("users/{}/books/{}", ctx.email(), id)))
    }

    async fn remove_book(&self, ctx: &UserContext, id: &str) -> ListResult<()> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        if id == PLACEHOLDER_BOOK || doc.books.remove(id).is_none() {
            return Err(ListError::not_found(format!(
                "users/{}/books/{}",
                ctx.email(),
                id
            )));
        }
        debug!(email = ctx.email(), id, "removed book");
        Ok(())
    }

    async fn list_books(
        &self,
        ctx: &UserContext,
        after: Option<&str>,
        limit: usize,
    ) -> ListResult<Vec<SavedBook>> {
        let users = self.users.read().await;
        let doc = users.get(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        Ok(page_after(&doc.books, after, limit, PLACEHOLDER_BOOK))
    }

    async fn create_post(&self, ctx: &UserContext, name: &str, text: &str) -> ListResult<Post> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ListError::Config {
                message: "post name must not be empty".to_string(),
            });
        }
        let mut users = self.users.write().await;
        let doc = users.get_mut(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        let post = Post {
            id: name.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        debug!(email = ctx.email(), name, "creating post");
        doc.posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn get_post(&self, ctx: &UserContext, name: &str) -> ListResult<Post> {
        let users = self.users.read().await;
        let doc = users.get(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        doc.posts
            .get(name)
            .filter(|_| name != PLACEHOLDER_POST)
            .cloned()
            .ok_or_else(|| ListError::not_found(format!("users/{}/posts/{}", ctx.email(), name)))
    }

    async fn list_posts(
        &self,
        ctx: &UserContext,
        after: Option<&str>,
        limit: usize,
    ) -> ListResult<Vec<Post>> {
        let users = self.users.read().await;
        let doc = users.get(ctx.email()).ok_or_else(|| user_missing(ctx))?;
        Ok(page_after(&doc.posts, after, limit, PLACEHOLDER_POST))
    }

    async fn list_feed(&self, after: Option<&str>, limit: usize) -> ListResult<Vec<FeedPost>> {
        let after = match after {
            Some(key) => Some(split_feed_key(key).ok_or_else(|| ListError::Config {
                message: format!("invalid feed cursor '{}'", key),
            })?),
            None => None,
        };

        let users = self.users.read().await;
        let mut feed = Vec::new();
        for (email, doc) in users.iter() {
            if feed.len() >= limit {
                break;
            }
            let posts_after = match &after {
                Some((after_email, _)) if email < after_email => continue,
                Some((after_email, after_name)) if email == after_email => Some(*after_name),
                _ => None,
            };
            let remaining = limit - feed.len();
            feed.extend(
                page_after(&doc.posts, posts_after, remaining, PLACEHOLDER_POST)
                    .into_iter()
                    .map(|post| FeedPost::new(&doc.profile, post)),
            );
        }
        Ok(feed)
    }
}
