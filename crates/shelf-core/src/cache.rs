//! Paginated filtered list cache.
//!
//! Accumulates pages from a [`PageSource`] into an ordered, id-unique set and
//! serves a debounced substring filter over everything loaded so far.
//!
//! Concurrency guards:
//! - `loading` makes `fetch_next` single-flight; extra calls return
//!   [`FetchOutcome::Skipped`].
//! - `generation` is bumped by `reset`; a page that was requested under an
//!   older generation is dropped when it arrives.
//! - the [`Debouncer`] holds at most one pending term update.
//!
//! The state mutex is never held across an `.await`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, info, warn};

use crate::config::{ListConfig, RemountPolicy};
use crate::debounce::Debouncer;
use crate::error::{ErrorKind, ListResult};
use crate::filter::{filter_items, Needle};
use crate::item::{ById, Cursor, Item, SharedSelector};
use crate::source::{Page, PageSource};
use crate::term_store::TermStore;

/// Why `fetch_next` did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An empty page was seen; call `reset` to start over.
    Exhausted,
    /// Another fetch is still outstanding.
    InFlight,
}

/// Result of a successful `fetch_next` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was merged. `added` excludes items whose id was already held.
    Merged { fetched: usize, added: usize },
    /// The source returned an empty page; no more fetches until `reset`.
    Exhausted,
    /// No request was made.
    Skipped(SkipReason),
    /// The page arrived after a `reset` and was thrown away.
    Discarded,
}

struct State<I> {
    items: Vec<I>,
    ids: HashSet<String>,
    cursor: Option<Cursor>,
    exhausted: bool,
    loading: bool,
    generation: u64,
    last_error: Option<ErrorKind>,
    pending_term: String,
    applied_term: String,
    needle: Needle,
    view: Vec<I>,
}

impl<I: Item> State<I> {
    fn new(term: String) -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
            cursor: None,
            exhausted: false,
            loading: false,
            generation: 0,
            last_error: None,
            needle: Needle::new(&term),
            pending_term: term.clone(),
            applied_term: term,
            view: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.view.clear();
        self.cursor = None;
        self.exhausted = false;
        self.loading = false;
        self.last_error = None;
        self.generation += 1;
    }

    fn merge(&mut self, page: Page<I>, selector: &SharedSelector<I>) -> FetchOutcome {
        self.last_error = None;

        if page.items.is_empty() {
            self.exhausted = true;
            return FetchOutcome::Exhausted;
        }

        let fetched = page.items.len();
        let last_id = page.items.last().map(|item| item.id().to_string());
        let first_new = self.items.len();

        for item in page.items {
            if self.ids.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }

        self.cursor = page.next_cursor.or_else(|| last_id.as_deref().map(Cursor::after_id));

        // Appending keeps the view a stable filter of the whole set.
        let added = &self.items[first_new..];
        let matched = filter_items(added, selector.as_ref(), &self.needle);
        self.view.extend(matched);

        FetchOutcome::Merged {
            fetched,
            added: self.items.len() - first_new,
        }
    }

    /// Apply the pending term, or only `scheduled` if it is still the
    /// pending one. Returns the term if the applied term changed.
    fn apply_pending(
        &mut self,
        scheduled: Option<&str>,
        selector: &SharedSelector<I>,
    ) -> Option<String> {
        if scheduled.is_some_and(|term| term != self.pending_term) {
            return None;
        }
        if self.pending_term == self.applied_term {
            return None;
        }
        self.applied_term = self.pending_term.clone();
        self.needle = Needle::new(&self.applied_term);
        self.view = filter_items(&self.items, selector.as_ref(), &self.needle);
        Some(self.applied_term.clone())
    }
}

struct Inner<I> {
    name: String,
    source: Arc<dyn PageSource<I>>,
    selector: SharedSelector<I>,
    config: ListConfig,
    terms: Option<Arc<dyn TermStore>>,
    state: Mutex<State<I>>,
    debouncer: Debouncer,
}

impl<I: Item> Inner<I> {
    fn state(&self) -> MutexGuard<'_, State<I>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply_pending_term(&self, scheduled: Option<&str>) -> Option<String> {
        let term = self.state().apply_pending(scheduled, &self.selector)?;
        debug!(list = %self.name, term = %term, "search term applied");
        Some(term)
    }

    async fn persist_term(&self, term: &str) {
        if let Some(store) = &self.terms {
            if let Err(e) = store.save(&self.name, term).await {
                warn!(list = %self.name, error = %e, "failed to persist search term");
            }
        }
    }
}

/// Clears the loading flag if a fetch future is dropped before it completes.
struct InFlight<'a, I: Item> {
    inner: &'a Inner<I>,
    generation: u64,
    armed: bool,
}

impl<I: Item> Drop for InFlight<'_, I> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.state();
        if state.generation == self.generation {
            state.loading = false;
        }
    }
}

/// Accumulating, de-duplicating, debounce-filtered view over a paged source.
///
/// Cloning is cheap; clones share the same state.
pub struct ListCache<I: Item> {
    inner: Arc<Inner<I>>,
}

impl<I: Item> Clone for ListCache<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: Item> std::fmt::Debug for ListCache<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state();
        f.debug_struct("ListCache")
            .field("name", &self.inner.name)
            .field("items", &state.items.len())
            .field("view", &state.view.len())
            .field("cursor", &state.cursor)
            .field("exhausted", &state.exhausted)
            .field("loading", &state.loading)
            .finish()
    }
}

impl<I: Item> ListCache<I> {
    /// Start building a cache over `source`.
    pub fn builder(source: Arc<dyn PageSource<I>>) -> ListCacheBuilder<I> {
        ListCacheBuilder::new(source)
    }

    /// Cache with default config that searches item ids only.
    pub async fn new(source: Arc<dyn PageSource<I>>) -> ListResult<Self> {
        Self::builder(source).build().await
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &ListConfig {
        &self.inner.config
    }

    /// Drop everything loaded so far. The remote source is not touched and
    /// search terms are kept. A fetch still in flight will be discarded.
    pub fn reset(&self) {
        let mut state = self.inner.state();
        state.clear();
        debug!(list = %self.inner.name, generation = state.generation, "list reset");
    }

    /// Apply the configured [`RemountPolicy`]. Returns true if the cache was reset.
    pub fn remount(&self) -> bool {
        match self.inner.config.remount {
            RemountPolicy::Reset => {
                self.reset();
                true
            }
            RemountPolicy::Preserve => false,
        }
    }

    /// Fetch and merge the next page.
    ///
    /// Errors leave the accumulated items and cursor untouched, so calling
    /// again repeats the same request.
    pub async fn fetch_next(&self) -> ListResult<FetchOutcome> {
        let inner = self.inner.as_ref();
        let page_size = inner.config.page_size;

        let (generation, cursor) = {
            let mut state = inner.state();
            if state.exhausted {
                return Ok(FetchOutcome::Skipped(SkipReason::Exhausted));
            }
            if state.loading {
                debug!(list = %inner.name, "fetch already in flight");
                return Ok(FetchOutcome::Skipped(SkipReason::InFlight));
            }
            state.loading = true;
            (state.generation, state.cursor.clone())
        };

        let mut guard = InFlight {
            inner,
            generation,
            armed: true,
        };

        debug!(
            list = %inner.name,
            source = inner.source.name(),
            cursor = ?cursor.as_ref().map(Cursor::as_str),
            page_size,
            "fetching page"
        );
        let result = inner.source.fetch_page(cursor.as_ref(), page_size).await;
        guard.armed = false;

        let mut state = inner.state();
        if state.generation != generation {
            match &result {
                Ok(_) => debug!(list = %inner.name, "discarding page fetched before reset"),
                Err(e) => warn!(
                    list = %inner.name,
                    error = %e,
                    "discarding fetch error from before reset"
                ),
            }
            return Ok(FetchOutcome::Discarded);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let outcome = state.merge(page, &inner.selector);
                match outcome {
                    FetchOutcome::Merged { fetched, added } => debug!(
                        list = %inner.name,
                        fetched,
                        added,
                        total = state.items.len(),
                        "page merged"
                    ),
                    _ => info!(list = %inner.name, total = state.items.len(), "list exhausted"),
                }
                Ok(outcome)
            }
            Err(e) => {
                state.last_error = Some(e.kind());
                warn!(list = %inner.name, error = %e, "page fetch failed");
                Err(e)
            }
        }
    }

    /// Record a new search term. The filtered view follows once no other
    /// term has been set for the debounce window.
    ///
    /// Outside a tokio runtime the term is applied at once and not persisted.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.inner.state().pending_term = term.clone();

        let weak: Weak<Inner<I>> = Arc::downgrade(&self.inner);
        let scheduled = self.inner.debouncer.schedule(move || async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(applied) = inner.apply_pending_term(Some(&term)) {
                inner.persist_term(&applied).await;
            }
        });

        if !scheduled {
            let applied = self.inner.apply_pending_term(None);
            if applied.is_some() && self.inner.terms.is_some() {
                warn!(list = %self.inner.name, "no tokio runtime, search term not persisted");
            }
        }
    }

    /// Apply the pending term now instead of waiting for the window, and
    /// persist it if it changed.
    pub async fn flush_search(&self) {
        self.inner.debouncer.cancel();
        if let Some(applied) = self.inner.apply_pending_term(None) {
            self.inner.persist_term(&applied).await;
        }
    }

    /// Items of the accumulated set that match the applied term, in load order.
    pub fn current_view(&self) -> Vec<I> {
        self.inner.state().view.clone()
    }

    /// Every accumulated item, unfiltered, in load order.
    pub fn accumulated(&self) -> Vec<I> {
        self.inner.state().items.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state().items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        !self.inner.state().exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state().loading
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.inner.state().last_error
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.inner.state().cursor.clone()
    }

    /// Term as last typed, applied or not.
    pub fn pending_term(&self) -> String {
        self.inner.state().pending_term.clone()
    }

    /// Term the current view was computed with.
    pub fn search_term(&self) -> String {
        self.inner.state().applied_term.clone()
    }

    pub fn is_search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }
}

/// Builder for [`ListCache`].
pub struct ListCacheBuilder<I> {
    name: String,
    source: Arc<dyn PageSource<I>>,
    selector: Option<SharedSelector<I>>,
    config: ListConfig,
    terms: Option<Arc<dyn TermStore>>,
    initial_term: Option<String>,
}

impl<I: Item> ListCacheBuilder<I> {
    fn new(source: Arc<dyn PageSource<I>>) -> Self {
        Self {
            name: source.name().to_string(),
            source,
            selector: None,
            config: ListConfig::default(),
            terms: None,
            initial_term: None,
        }
    }

    /// Name used in logs and as the term-store key.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fields searched by the filter. Defaults to the item id.
    pub fn selector(mut self, selector: SharedSelector<I>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn config(mut self, config: ListConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the initial term from `store` and save every applied term to it.
    pub fn term_store(mut self, store: Arc<dyn TermStore>) -> Self {
        self.terms = Some(store);
        self
    }

    /// Start with this term applied. Takes precedence over a stored term.
    pub fn initial_term(mut self, term: impl Into<String>) -> Self {
        self.initial_term = Some(term.into());
        self
    }

    /// Validate the config and load the stored term, if a store is attached.
    pub async fn build(self) -> ListResult<ListCache<I>> {
        self.config.validate()?;

        let stored = match (&self.initial_term, &self.terms) {
            (None, Some(store)) => match store.load(&self.name).await {
                Ok(term) => term,
                Err(e) => {
                    warn!(list = %self.name, error = %e, "ignoring unreadable stored search term");
                    None
                }
            },
            _ => None,
        };
        let term = self.initial_term.or(stored).unwrap_or_default();

        let selector = self
            .selector
            .unwrap_or_else(|| Arc::new(ById) as SharedSelector<I>);
        let debouncer = Debouncer::new(self.config.debounce());

        Ok(ListCache {
            inner: Arc::new(Inner {
                name: self.name,
                source: self.source,
                selector,
                config: self.config,
                terms: self.terms,
                state: Mutex::new(State::new(term)),
                debouncer,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Tag(String);

    impl Item for Tag {
        fn id(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_superseded_term_is_not_applied() {
        let selector: SharedSelector<Tag> = Arc::new(ById);
        let mut state = State::<Tag>::new(String::new());
        state.pending_term = "ocean".to_string();

        // A debounce task for an older term woke after "ocean" was typed.
        assert_eq!(state.apply_pending(Some("space"), &selector), None);
        assert_eq!(state.applied_term, "");

        assert_eq!(
            state.apply_pending(Some("ocean"), &selector).as_deref(),
            Some("ocean")
        );
        assert_eq!(state.apply_pending(None, &selector), None);
    }

    #[test]
    fn test_applying_term_refilters_loaded_items() {
        let selector: SharedSelector<Tag> = Arc::new(ById);
        let mut state = State::<Tag>::new(String::new());
        state.merge(
            Page::new(vec![Tag("dune".into()), Tag("emma".into())], None),
            &selector,
        );
        assert_eq!(state.view.len(), 2);

        state.pending_term = "EM".to_string();
        assert!(state.apply_pending(None, &selector).is_some());
        assert_eq!(state.view.len(), 1);
        assert_eq!(state.view[0].0, "emma");
    }
}
