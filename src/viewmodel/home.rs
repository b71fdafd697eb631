//! Home screen state: selected media type, genres and the category feeds

use tokio::sync::watch;
use tracing::warn;

use crate::api::{Category, Feed, TmdbClient};
use crate::models::{Genre, MediaType, Resource};
use crate::paging::FeedPager;

pub const GENRES_LOAD_FAILED: &str = "Unknown error occurred!";

pub struct HomeViewModel {
    catalog: TmdbClient,
    media_type: watch::Sender<MediaType>,
    genres: watch::Sender<Resource<Vec<Genre>>>,
}

impl HomeViewModel {
    pub fn new(catalog: TmdbClient) -> Self {
        Self {
            catalog,
            media_type: watch::channel(MediaType::Movie).0,
            genres: watch::channel(Resource::Initial).0,
        }
    }

    pub fn selected_media_type(&self) -> MediaType {
        *self.media_type.borrow()
    }

    /// Switch between movies and TV; genres are dropped until reloaded
    pub fn select_media_type(&self, media_type: MediaType) {
        let previous = self.media_type.send_replace(media_type);
        if previous != media_type {
            self.genres.send_replace(Resource::Initial);
        }
    }

    pub fn genres(&self) -> watch::Receiver<Resource<Vec<Genre>>> {
        self.genres.subscribe()
    }

    /// Fetch genres for the selected media type
    pub async fn load_genres(&self) -> Resource<Vec<Genre>> {
        let media_type = self.selected_media_type();
        self.genres.send_replace(Resource::Loading);
        let state = match self.catalog.genres(media_type).await {
            Ok(genres) => Resource::Success(genres),
            Err(e) => {
                warn!(error = %e, %media_type, "genre request failed");
                Resource::Error(GENRES_LOAD_FAILED.to_string())
            }
        };
        self.genres.send_replace(state.clone());
        state
    }

    /// Pager for a category of the selected media type
    pub fn feed(&self, category: Category) -> FeedPager {
        self.catalog
            .pager(Feed::category(category, self.selected_media_type()))
    }
}
