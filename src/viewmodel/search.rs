//! Search state: multi-search honoring the include-adult preference

use anyhow::Result;

use crate::api::TmdbClient;
use crate::paging::FeedPager;
use crate::store::PrefsStore;

pub struct SearchViewModel {
    catalog: TmdbClient,
    prefs: PrefsStore,
}

impl SearchViewModel {
    pub fn new(catalog: TmdbClient, prefs: PrefsStore) -> Self {
        Self { catalog, prefs }
    }

    pub fn include_adult(&self) -> bool {
        self.prefs.include_adult()
    }

    pub async fn set_include_adult(&self, include_adult: bool) -> Result<()> {
        self.prefs.set_include_adult(include_adult).await
    }

    /// Pager for `query`, `None` when the query is blank
    pub fn search(&self, query: &str) -> Option<FeedPager> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.catalog.search(query, self.include_adult()))
    }
}
