//! Local watch-list store
//!
//! A single SQLite table keyed by catalog id. Every mutation republishes
//! the full ordered list on a `watch` channel so observers stay current.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::models::WatchListEntry;
use crate::store::entities::{prelude::*, watch_list};
use crate::store::migrator::Migrator;

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Handle to the watch-list table. Clones share the connection pool and
/// the published list.
#[derive(Clone)]
pub struct WatchListStore {
    conn: DatabaseConnection,
    tx: Arc<watch::Sender<Vec<WatchListEntry>>>,
    /// Held across mutate + publish so snapshots go out in write order
    write_lock: Arc<Mutex<()>>,
}

impl WatchListStore {
    /// Connect to `db_url`, creating the file and schema when missing
    pub async fn open(db_url: &str) -> Result<Self> {
        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path = Path::new(path_str);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !path.exists() {
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        // An in-memory database lives only as long as its single connection
        let max_connections = if in_memory { 1 } else { 4 };
        opt.max_connections(max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to open watch list at {}", db_url))?;

        Migrator::up(&conn, None)
            .await
            .context("Failed to apply watch list migrations")?;

        let (tx, _rx) = watch::channel(Vec::new());
        let store = Self {
            conn,
            tx: Arc::new(tx),
            write_lock: Arc::new(Mutex::new(())),
        };
        store.publish().await?;

        info!(url = db_url, "watch list opened");
        Ok(store)
    }

    /// Fresh private in-memory store
    pub async fn in_memory() -> Result<Self> {
        Self::open(IN_MEMORY_URL).await
    }

    /// Insert, or replace the entry with the same media id
    pub async fn add(&self, entry: &WatchListEntry) -> Result<()> {
        let model = watch_list::ActiveModel {
            media_id: Set(db_id(entry.media_id)?),
            image_path: Set(entry.image_path.clone()),
            title: Set(entry.title.clone()),
            release_date: Set(entry.release_date.clone()),
            rating: Set(f64::from(entry.rating)),
            added_on: Set(entry.added_on.to_rfc3339()),
            ..Default::default()
        };

        let _guard = self.write_lock.lock().await;
        WatchList::insert(model)
            .on_conflict(
                OnConflict::column(watch_list::Column::MediaId)
                    .update_columns([
                        watch_list::Column::ImagePath,
                        watch_list::Column::Title,
                        watch_list::Column::ReleaseDate,
                        watch_list::Column::Rating,
                        watch_list::Column::AddedOn,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to add watch list entry")?;

        debug!(media_id = entry.media_id, "watch list entry saved");
        self.publish().await
    }

    /// Number of rows for `media_id` (0 or 1)
    pub async fn exists(&self, media_id: u64) -> Result<u64> {
        let count = WatchList::find()
            .filter(watch_list::Column::MediaId.eq(db_id(media_id)?))
            .count(&self.conn)
            .await
            .context("Failed to query watch list")?;

        Ok(count)
    }

    pub async fn contains(&self, media_id: u64) -> Result<bool> {
        Ok(self.exists(media_id).await? > 0)
    }

    pub async fn remove(&self, media_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        WatchList::delete_many()
            .filter(watch_list::Column::MediaId.eq(db_id(media_id)?))
            .exec(&self.conn)
            .await
            .context("Failed to remove watch list entry")?;

        debug!(media_id, "watch list entry removed");
        self.publish().await
    }

    /// All entries in insertion order
    pub async fn list(&self) -> Result<Vec<WatchListEntry>> {
        let rows = WatchList::find()
            .order_by_asc(watch_list::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list watch list")?;

        rows.into_iter().map(WatchListEntry::try_from).collect()
    }

    /// Live view of the full list
    pub fn subscribe(&self) -> watch::Receiver<Vec<WatchListEntry>> {
        self.tx.subscribe()
    }

    /// Delete every entry
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let result = WatchList::delete_many()
            .exec(&self.conn)
            .await
            .context("Failed to clear watch list")?;

        info!(removed = result.rows_affected, "watch list cleared");
        self.publish().await
    }

    /// Callers hold `write_lock`
    async fn publish(&self) -> Result<()> {
        let entries = self.list().await?;
        self.tx.send_replace(entries);
        Ok(())
    }
}

impl TryFrom<watch_list::Model> for WatchListEntry {
    type Error = anyhow::Error;

    fn try_from(model: watch_list::Model) -> Result<Self> {
        let added_on = DateTime::parse_from_rfc3339(&model.added_on)
            .with_context(|| format!("Bad added_on for media {}", model.media_id))?
            .with_timezone(&Utc);

        Ok(Self {
            media_id: u64::try_from(model.media_id)
                .with_context(|| format!("Negative media id {}", model.media_id))?,
            image_path: model.image_path,
            title: model.title,
            release_date: model.release_date,
            rating: model.rating as f32,
            added_on,
        })
    }
}

fn db_id(media_id: u64) -> Result<i64> {
    i64::try_from(media_id).with_context(|| format!("Media id {} out of range", media_id))
}
