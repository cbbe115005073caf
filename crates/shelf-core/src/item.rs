//! Item identity and searchable-field selection.

use std::fmt;
use std::sync::Arc;

/// A record shown in a list.
///
/// Identity is the id: two items with the same id are treated as the same
/// record, and only the first one seen is kept.
pub trait Item: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Picks the fields of an item that the substring filter looks at.
///
/// The same item type can be searched by different fields on different
/// screens, so the selector is supplied per cache rather than per type.
pub trait FieldSelector<I>: Send + Sync {
    fn fields<'a>(&self, item: &'a I) -> Vec<&'a str>;
}

impl<I> FieldSelector<I> for fn(&I) -> Vec<&str> {
    fn fields<'a>(&self, item: &'a I) -> Vec<&'a str> {
        self(item)
    }
}

/// Selector that only searches the item id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ById;

impl<I: Item> FieldSelector<I> for ById {
    fn fields<'a>(&self, item: &'a I) -> Vec<&'a str> {
        vec![item.id()]
    }
}

/// Shared handle to a selector.
pub type SharedSelector<I> = Arc<dyn FieldSelector<I>>;

/// Build a shared selector from a plain function.
pub fn selector<I: 'static>(f: fn(&I) -> Vec<&str>) -> SharedSelector<I> {
    Arc::new(f)
}

/// Opaque continuation marker for resuming paged retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Cursor positioned after the item with the given id.
    pub fn after_id(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}
