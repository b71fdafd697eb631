//! Data structures and types for nitflex
//!
//! Contains all shared models used across the application organized by domain:
//! - **Catalog**: TMDB media items, genres, cast and paged results
//! - **Watch list**: locally saved entries
//! - **Auth**: backend user, request/response payloads and error bodies
//! - **Preferences**: persisted key-value settings
//! - **Resource**: four-state wrapper for asynchronous results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Base URL for poster images (w500)
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500/";

/// Base URL for backdrop images (w780)
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/w780/";

fn image_url(base: &str, path: &str) -> String {
    format!("{}{}", base, path.trim_start_matches('/'))
}

// =============================================================================
// Catalog Models (TMDB)
// =============================================================================

/// Media type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the catalog API ("movie" / "tv")
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "Movie"),
            MediaType::Tv => write!(f, "TV Show"),
        }
    }
}

/// A movie or TV show from the catalog
///
/// Movies and shows use different field names upstream (`title` vs `name`,
/// `release_date` vs `first_air_date`); both land in the same fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_average: f32,
    pub vote_count: u32,
    pub genre_ids: Vec<u32>,
    pub adult: bool,
    pub original_language: Option<String>,
}

impl MediaItem {
    /// Release (or first air) year
    pub fn year(&self) -> Option<u16> {
        self.release_date.as_deref().and_then(extract_year)
    }

    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| image_url(POSTER_BASE_URL, p))
    }

    pub fn backdrop_url(&self) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|p| image_url(BACKDROP_BASE_URL, p))
    }

    /// Build the watch-list entry saved for this item
    pub fn to_watch_list_entry(&self, added_on: DateTime<Utc>) -> WatchListEntry {
        WatchListEntry {
            media_id: self.id,
            image_path: self.poster_path.clone(),
            title: self.title.clone(),
            release_date: self.release_date.clone(),
            rating: self.vote_average,
            added_on,
        }
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year().map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} [{}]", self.title, year_str, self.media_type)
    }
}

/// Genre id and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Cast member from the credits endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: u32,
}

impl fmt::Display for CastMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.character {
            Some(character) if !character.is_empty() => write!(f, "{} as {}", self.name, character),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// One fetched batch of catalog results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage<T> {
    pub page: u32,
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total_results: u32,
}

// =============================================================================
// Watch List Models
// =============================================================================

/// A locally saved reference to a catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchListEntry {
    pub media_id: u64,
    pub image_path: Option<String>,
    pub title: String,
    pub release_date: Option<String>,
    pub rating: f32,
    pub added_on: DateTime<Utc>,
}

impl WatchListEntry {
    pub fn image_url(&self) -> Option<String> {
        self.image_path
            .as_deref()
            .map(|p| image_url(POSTER_BASE_URL, p))
    }
}

impl fmt::Display for WatchListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self
            .release_date
            .as_deref()
            .and_then(extract_year)
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        write!(f, "{}{} - {:.1}", self.title, year_str, self.rating)
    }
}

// =============================================================================
// Auth Models (backend)
// =============================================================================

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Login payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Backend user profile. Only `name` is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Successful register/login payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ApiErrorBody {
    /// Messages attached to a single field
    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors
            .as_ref()
            .and_then(|e| e.get(field))
            .map(Vec::as_slice)
    }
}

// =============================================================================
// Preferences
// =============================================================================

fn default_include_adult() -> bool {
    true
}

/// Persisted key-value settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_include_adult")]
    pub include_adult: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            include_adult: default_include_adult(),
            auth_token: None,
            user_name: None,
        }
    }
}

// =============================================================================
// Resource
// =============================================================================

/// State of an asynchronous operation as seen by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    /// Nothing requested yet
    Initial,
    /// Request in flight
    Loading,
    /// Completed with data
    Success(T),
    /// Failed with a user-facing message
    Error(String),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Initial
    }
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Resource::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Turn a result into `Success`, or `Error` with the error's display text
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Error(e.to_string()),
        }
    }
}

/// Extract year from a date string like "2022-03-04"
pub fn extract_year(date: &str) -> Option<u16> {
    date.get(..4).and_then(|y| y.parse().ok())
}
