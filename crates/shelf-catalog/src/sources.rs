//! Paged sources over the document store.
//!
//! Each source resumes after the id of the last document it returned, so the
//! cursor is always that id.

use std::sync::Arc;

use async_trait::async_trait;
use shelf_core::{selector, Cursor, Item, ListResult, Page, PageSource, SharedSelector};

use crate::store::{DocumentStore, FeedPost, Post, SavedBook, UserContext};

fn page_from<I: Item>(items: Vec<I>) -> Page<I> {
    let next = items.last().map(|item| Cursor::after_id(item.id()));
    Page::new(items, next)
}

/// One user's saved books.
#[derive(Clone)]
pub struct SavedBooksSource {
    store: Arc<dyn DocumentStore>,
    ctx: UserContext,
}

impl SavedBooksSource {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: UserContext) -> Self {
        Self { store, ctx }
    }
}

#[async_trait]
impl PageSource<SavedBook> for SavedBooksSource {
    async fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> ListResult<Page<SavedBook>> {
        let books = self
            .store
            .list_books(&self.ctx, cursor.map(Cursor::as_str), page_size)
            .await?;
        Ok(page_from(books))
    }

    fn name(&self) -> &str {
        "saved-books"
    }
}

/// One user's own posts.
#[derive(Clone)]
pub struct UserPostsSource {
    store: Arc<dyn DocumentStore>,
    ctx: UserContext,
}

impl UserPostsSource {
    pub fn new(store: Arc<dyn DocumentStore>, ctx: UserContext) -> Self {
        Self { store, ctx }
    }
}

#[async_trait]
impl PageSource<Post> for UserPostsSource {
    async fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> ListResult<Page<Post>> {
        let posts = self
            .store
            .list_posts(&self.ctx, cursor.map(Cursor::as_str), page_size)
            .await?;
        Ok(page_from(posts))
    }

    fn name(&self) -> &str {
        "my-posts"
    }
}

/// Posts of every user.
#[derive(Clone)]
pub struct PostFeedSource {
    store: Arc<dyn DocumentStore>,
}

impl PostFeedSource {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PageSource<FeedPost> for PostFeedSource {
    async fn fetch_page(
        &self,
        cursor: Option<&Cursor>,
        page_size: usize,
    ) -> ListResult<Page<FeedPost>> {
        let posts = self
            .store
            .list_feed(cursor.map(Cursor::as_str), page_size)
            .await?;
        Ok(page_from(posts))
    }

    fn name(&self) -> &str {
        "feed"
    }
}

fn saved_book_fields(book: &SavedBook) -> Vec<&str> {
    book.title_and_authors()
}

fn post_fields(post: &Post) -> Vec<&str> {
    vec![post.id.as_str()]
}

fn feed_fields(post: &FeedPost) -> Vec<&str> {
    vec![post.post.id.as_str(), post.username.as_str()]
}

pub fn saved_book_selector() -> SharedSelector<SavedBook> {
    selector::<SavedBook>(saved_book_fields)
}

/// Posts are searched by name.
pub fn post_selector() -> SharedSelector<Post> {
    selector::<Post>(post_fields)
}

pub fn feed_selector() -> SharedSelector<FeedPost> {
    selector::<FeedPost>(feed_fields)
}
