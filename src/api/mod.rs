//! API clients for external services
//!
//! - TMDB: movie/TV catalog feeds, search, genres and credits
//! - Auth: account backend (register, login, logout) and token propagation

pub mod auth;
pub mod tmdb;

pub use auth::{AuthClient, AuthError, TokenPropagator};
pub use tmdb::{CatalogError, Category, Feed, TmdbClient};

use std::time::Duration;

/// Shared client builder with a blanket request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
