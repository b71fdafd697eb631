//! Presentation adapters
//!
//! Each view-model holds UI-facing state in `watch` channels and calls into
//! the catalog client, auth client and local stores.

pub mod auth;
pub mod details;
pub mod home;
pub mod search;
pub mod watchlist;

pub use auth::AuthViewModel;
pub use details::DetailsViewModel;
pub use home::HomeViewModel;
pub use search::SearchViewModel;
pub use watchlist::WatchListViewModel;
