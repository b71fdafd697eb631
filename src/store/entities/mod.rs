pub mod watch_list;

pub mod prelude {
    pub use super::watch_list::Entity as WatchList;
}
