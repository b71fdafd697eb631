//! Local persistence
//!
//! - Prefs: TOML key-value preferences (include-adult flag, session)
//! - Watch list: SQLite table of saved catalog items

pub mod entities;
pub mod migrator;
pub mod prefs;
pub mod watchlist;

pub use prefs::PrefsStore;
pub use watchlist::WatchListStore;
