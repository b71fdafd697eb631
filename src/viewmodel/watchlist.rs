use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;

use crate::models::{MediaItem, WatchListEntry};
use crate::store::WatchListStore;

/// Watch-list screen state
pub struct WatchListViewModel {
    store: WatchListStore,
}

impl WatchListViewModel {
    pub fn new(store: WatchListStore) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> watch::Receiver<Vec<WatchListEntry>> {
        self.store.subscribe()
    }

    pub async fn add(&self, item: &MediaItem) -> Result<()> {
        self.store.add(&item.to_watch_list_entry(Utc::now())).await
    }

    pub async fn remove(&self, media_id: u64) -> Result<()> {
        self.store.remove(media_id).await
    }

    pub async fn exists(&self, media_id: u64) -> Result<bool> {
        self.store.contains(media_id).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
