//! nitflex - movie and TV catalog client
//!
//! Browse paged TMDB feeds, search, keep a local watch list and sign in
//! to the account backend from the terminal.
//!
//! # Modules
//!
//! - `models` - Catalog items, watch-list entries, auth payloads, preferences
//! - `api` - HTTP clients (TMDB catalog, account backend, token propagator)
//! - `paging` - Page-keyed loader shared by every feed
//! - `store` - Preference file and SQLite watch list
//! - `viewmodel` - UI-facing state built on the clients and stores
//! - `app` - Wiring of clients, stores and view-models
//! - `cli` / `commands` - The `nitflex` command line

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod paging;
pub mod store;
pub mod viewmodel;

// Re-export commonly used types
pub use models::{
    AuthResponse, CastMember, CatalogPage, Genre, LoginRequest, MediaItem, MediaType,
    Preferences, RegisterRequest, Resource, User, WatchListEntry,
};

pub use api::{AuthClient, AuthError, CatalogError, Category, Feed, TmdbClient, TokenPropagator};
pub use app::App;
pub use config::Config;
pub use paging::{FeedPager, PageLoad, Pager};
pub use store::{PrefsStore, WatchListStore};
