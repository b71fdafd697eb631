//! Detail screen state: related titles, cast and watch-list membership

use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;
use tracing::warn;

use crate::api::{Feed, TmdbClient};
use crate::models::{CastMember, MediaItem, MediaType, Resource};
use crate::paging::FeedPager;
use crate::store::WatchListStore;

pub const CAST_LOAD_FAILED: &str = "Error when loading movie cast";

pub struct DetailsViewModel {
    catalog: TmdbClient,
    watch_list: WatchListStore,
    cast: watch::Sender<Resource<Vec<CastMember>>>,
    in_watch_list: watch::Sender<bool>,
}

impl DetailsViewModel {
    pub fn new(catalog: TmdbClient, watch_list: WatchListStore) -> Self {
        Self {
            catalog,
            watch_list,
            cast: watch::channel(Resource::Initial).0,
            in_watch_list: watch::channel(false).0,
        }
    }

    pub fn similar_films(&self, id: u64, media_type: MediaType) -> FeedPager {
        self.catalog.pager(Feed::Similar { id, media_type })
    }

    pub fn recommended_films(&self, id: u64, media_type: MediaType) -> FeedPager {
        self.catalog.pager(Feed::Recommended { id, media_type })
    }

    pub fn cast(&self) -> watch::Receiver<Resource<Vec<CastMember>>> {
        self.cast.subscribe()
    }

    pub fn in_watch_list(&self) -> watch::Receiver<bool> {
        self.in_watch_list.subscribe()
    }

    pub async fn load_cast(&self, id: u64, media_type: MediaType) -> Resource<Vec<CastMember>> {
        self.cast.send_replace(Resource::Loading);
        let state = match self.catalog.credits(id, media_type).await {
            Ok(cast) => Resource::Success(cast),
            Err(e) => {
                warn!(error = %e, id, "cast request failed");
                Resource::Error(CAST_LOAD_FAILED.to_string())
            }
        };
        self.cast.send_replace(state.clone());
        state
    }

    /// Re-read whether `id` is saved
    pub async fn refresh_watch_list_status(&self, id: u64) -> Result<bool> {
        let present = self.watch_list.contains(id).await?;
        self.in_watch_list.send_replace(present);
        Ok(present)
    }

    /// Save the item if absent, remove it if present. Returns the new state.
    pub async fn toggle_watch_list(&self, item: &MediaItem) -> Result<bool> {
        let present = if self.watch_list.contains(item.id).await? {
            self.watch_list.remove(item.id).await?;
            false
        } else {
            self.watch_list
                .add(&item.to_watch_list_entry(Utc::now()))
                .await?;
            true
        };
        self.in_watch_list.send_replace(present);
        Ok(present)
    }
}
