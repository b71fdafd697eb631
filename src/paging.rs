//! Page-keyed incremental loading
//!
//! One generic [`Pager`] drives every paged listing. It is parameterized by
//! a request function `page -> CatalogPage<T>` and turns each response into
//! a [`PageLoad`] with previous/next keys. Each call performs exactly one
//! request; there is no retry, caching or guard against concurrent loads of
//! the same key.

use futures::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;

use crate::api::tmdb::CatalogError;
use crate::models::{CatalogPage, MediaItem};

/// Page size used by every catalog listing
pub const PAGE_SIZE: usize = 20;

/// First page key
pub const FIRST_PAGE: u32 = 1;

/// Boxed request function, `page -> CatalogPage<T>`
pub type PageFn<T, E> = Box<dyn Fn(u32) -> BoxFuture<'static, Result<CatalogPage<T>, E>> + Send + Sync>;

/// Pager over catalog media items
pub type FeedPager = Pager<MediaItem, PageFn<MediaItem, CatalogError>>;

/// Result of loading one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLoad<T> {
    pub items: Vec<T>,
    /// `None` on the first page
    pub prev_key: Option<u32>,
    /// `None` when the page came back empty
    pub next_key: Option<u32>,
}

impl<T> PageLoad<T> {
    /// Compute keys for the page fetched with `key`.
    ///
    /// An empty page ends pagination even if the server reports more pages.
    pub fn from_page(key: u32, page: CatalogPage<T>) -> Self {
        let prev_key = key.checked_sub(1).filter(|k| *k >= FIRST_PAGE);
        let next_key = if page.items.is_empty() {
            None
        } else {
            Some(page.page.saturating_add(1))
        };

        Self {
            items: page.items,
            prev_key,
            next_key,
        }
    }
}

/// Generic page-keyed loader
pub struct Pager<T, F> {
    fetch: F,
    next: Option<u32>,
    page_size: usize,
    _items: PhantomData<fn() -> T>,
}

impl<T, F, Fut, E> Pager<T, F>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<CatalogPage<T>, E>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            next: Some(FIRST_PAGE),
            page_size: PAGE_SIZE,
            _items: PhantomData,
        }
    }

    /// Load the page for `key` (page 1 when `None`). One request, no retry.
    pub async fn load(&self, key: Option<u32>) -> Result<PageLoad<T>, E> {
        let key = key.unwrap_or(FIRST_PAGE);
        let page = (self.fetch)(key).await?;
        Ok(PageLoad::from_page(key, page))
    }

    /// Load the next unseen page, or `None` once the feed is exhausted.
    ///
    /// The stored key only advances on success, so calling again after an
    /// error retries the same page.
    pub async fn load_next(&mut self) -> Option<Result<Vec<T>, E>> {
        let key = self.next?;
        match self.load(Some(key)).await {
            Ok(load) => {
                self.next = load.next_key;
                Some(Ok(load.items))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Key the next `load_next` call will fetch
    pub fn next_key(&self) -> Option<u32> {
        self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// Start over from the first page
    pub fn reset(&mut self) {
        self.next = Some(FIRST_PAGE);
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
