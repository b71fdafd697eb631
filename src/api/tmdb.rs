//! TMDB (The Movie Database) API client
//!
//! Provides paged feeds, search, genres and credits for movies and TV shows.
//! API docs: https://developer.themoviedb.org/docs

use futures::FutureExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::http_client;
use crate::config::{Config, DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT_SECS};
use crate::models::{CastMember, CatalogPage, Genre, MediaItem, MediaType};
use crate::paging::{FeedPager, PageFn, Pager};

/// Lower bound of the "back in the days" discover window
pub const CLASSICS_FROM: &str = "1940-01-01";
/// Upper bound of the "back in the days" discover window
pub const CLASSICS_TO: &str = "1981-01-01";

/// TMDB API error types
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid API key (401)")]
    Unauthorized,

    #[error("Resource not found (404)")]
    NotFound,

    #[error("Rate limited (429)")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(u16),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

impl CatalogError {
    /// True when the request never got an HTTP answer
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CatalogError::RequestFailed(e) if e.is_connect() || e.is_timeout())
    }
}

/// Home-screen content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
    BackInTheDays,
}

/// A paged catalog listing
#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    Category {
        category: Category,
        media_type: MediaType,
    },
    Recommended {
        id: u64,
        media_type: MediaType,
    },
    Similar {
        id: u64,
        media_type: MediaType,
    },
    Search {
        query: String,
        include_adult: bool,
    },
}

impl Feed {
    pub fn category(category: Category, media_type: MediaType) -> Self {
        Feed::Category {
            category,
            media_type,
        }
    }

    /// Endpoint path relative to the API root
    pub fn endpoint(&self) -> String {
        match self {
            Feed::Category {
                category,
                media_type,
            } => match (category, media_type) {
                (Category::Trending, mt) => format!("trending/{}/day", mt.as_path()),
                (Category::Popular, mt) => format!("{}/popular", mt.as_path()),
                (Category::TopRated, mt) => format!("{}/top_rated", mt.as_path()),
                (Category::NowPlaying, MediaType::Movie) => "movie/now_playing".to_string(),
                (Category::NowPlaying, MediaType::Tv) => "tv/on_the_air".to_string(),
                // Upcoming only exists for movies
                (Category::Upcoming, _) => "movie/upcoming".to_string(),
                (Category::BackInTheDays, mt) => format!("discover/{}", mt.as_path()),
            },
            Feed::Recommended { id, media_type } => {
                format!("{}/{}/recommendations", media_type.as_path(), id)
            }
            Feed::Similar { id, media_type } => format!("{}/{}/similar", media_type.as_path(), id),
            Feed::Search { .. } => "search/multi".to_string(),
        }
    }

    /// Feed-specific query parameters (page, key and language are added by the client)
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Feed::Category {
                category: Category::BackInTheDays,
                media_type,
            } => {
                let (gte, lte) = match media_type {
                    MediaType::Movie => ("primary_release_date.gte", "primary_release_date.lte"),
                    MediaType::Tv => ("first_air_date.gte", "first_air_date.lte"),
                };
                vec![
                    (gte, CLASSICS_FROM.to_string()),
                    (lte, CLASSICS_TO.to_string()),
                    ("sort_by", "vote_count.desc".to_string()),
                ]
            }
            Feed::Search {
                query,
                include_adult,
            } => vec![
                ("query", query.clone()),
                ("include_adult", include_adult.to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// Media type stamped on every result, `None` when results carry their own
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Feed::Category {
                category: Category::Upcoming,
                ..
            } => Some(MediaType::Movie),
            Feed::Category { media_type, .. }
            | Feed::Recommended { media_type, .. }
            | Feed::Similar { media_type, .. } => Some(*media_type),
            Feed::Search { .. } => None,
        }
    }
}

/// TMDB API client
#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_CATALOG_URL)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: "en".to_string(),
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, config.catalog_base_url.as_str())
            .with_language(config.language.as_str())
            .with_timeout(config.request_timeout())
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Make an authenticated GET request
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, ?params, "catalog request");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    CatalogError::InvalidResponse(format!("JSON parse error: {}", e))
                })
            }
            StatusCode::UNAUTHORIZED => Err(CatalogError::Unauthorized),
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited),
            status if status.is_server_error() => Err(CatalogError::ServerError(status.as_u16())),
            status => Err(CatalogError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// Fetch one page of a feed
    pub async fn feed_page(
        &self,
        feed: &Feed,
        page: u32,
    ) -> Result<CatalogPage<MediaItem>, CatalogError> {
        let mut params = vec![("page", page.to_string())];
        params.extend(feed.params());

        let response: PageResponse = self.get(&feed.endpoint(), &params).await?;
        Ok(response.into_page(feed.media_type()))
    }

    /// Pager over a feed, starting at page 1
    pub fn pager(&self, feed: Feed) -> FeedPager {
        let client = self.clone();
        let fetch: PageFn<MediaItem, CatalogError> = Box::new(move |page: u32| {
            let client = client.clone();
            let feed = feed.clone();
            async move { client.feed_page(&feed, page).await }.boxed()
        });
        Pager::new(fetch)
    }

    /// Multi-search (movies and TV shows, people filtered out)
    pub fn search(&self, query: &str, include_adult: bool) -> FeedPager {
        self.pager(Feed::Search {
            query: query.to_string(),
            include_adult,
        })
    }

    /// Genre list for a media type
    pub async fn genres(&self, media_type: MediaType) -> Result<Vec<Genre>, CatalogError> {
        let endpoint = format!("genre/{}/list", media_type.as_path());
        let response: GenreResponse = self.get(&endpoint, &[]).await?;
        Ok(response.genres)
    }

    /// Cast for a movie or TV show, in billing order
    pub async fn credits(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> Result<Vec<CastMember>, CatalogError> {
        let endpoint = format!("{}/{}/credits", media_type.as_path(), id);
        let response: CreditsResponse = self.get(&endpoint, &[]).await?;
        Ok(response.into_cast())
    }

    /// Single title lookup
    pub async fn details(&self, id: u64, media_type: MediaType) -> Result<MediaItem, CatalogError> {
        let endpoint = format!("{}/{}", media_type.as_path(), id);
        let raw: MediaItemRaw = self.get(&endpoint, &[]).await?;
        raw.into_media_item(Some(media_type))
            .ok_or_else(|| CatalogError::InvalidResponse(format!("no {} with id {}", media_type, id)))
    }
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct PageResponse {
    page: u32,
    results: Vec<MediaItemRaw>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
}

impl PageResponse {
    fn into_page(self, media_type: Option<MediaType>) -> CatalogPage<MediaItem> {
        CatalogPage {
            page: self.page,
            items: self
                .results
                .into_iter()
                .filter_map(|r| r.into_media_item(media_type))
                .collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaItemRaw {
    id: u64,
    media_type: Option<String>,
    // Movies use "title", TV uses "name"
    title: Option<String>,
    name: Option<String>,
    // Movies use "release_date", TV uses "first_air_date"
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    popularity: Option<f64>,
    vote_average: Option<f32>,
    vote_count: Option<u32>,
    genre_ids: Option<Vec<u32>>,
    adult: Option<bool>,
    original_language: Option<String>,
}

impl MediaItemRaw {
    fn into_media_item(self, stamped: Option<MediaType>) -> Option<MediaItem> {
        let media_type = match stamped {
            Some(mt) => mt,
            None => match self.media_type.as_deref() {
                Some("movie") => MediaType::Movie,
                Some("tv") => MediaType::Tv,
                _ => return None, // Filter out "person" and other types
            },
        };

        Some(MediaItem {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            overview: self.overview.unwrap_or_default(),
            release_date: self
                .release_date
                .or(self.first_air_date)
                .filter(|d| !d.is_empty()),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            popularity: self.popularity.unwrap_or(0.0),
            vote_average: self.vote_average.unwrap_or(0.0),
            vote_count: self.vote_count.unwrap_or(0),
            genre_ids: self.genre_ids.unwrap_or_default(),
            adult: self.adult.unwrap_or(false),
            original_language: self.original_language,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenreResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastRaw>,
}

impl CreditsResponse {
    fn into_cast(self) -> Vec<CastMember> {
        let mut cast: Vec<CastMember> = self
            .cast
            .into_iter()
            .map(|c| CastMember {
                id: c.id,
                name: c.name,
                character: c.character,
                profile_path: c.profile_path,
                order: c.order.unwrap_or(u32::MAX),
            })
            .collect();
        cast.sort_by_key(|c| c.order);
        cast
    }
}

#[derive(Debug, Deserialize)]
struct CastRaw {
    id: u64,
    name: String,
    character: Option<String>,
    profile_path: Option<String>,
    order: Option<u32>,
}
