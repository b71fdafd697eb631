//! Persisted key-value preferences
//!
//! Holds the include-adult flag and the signed-in session (auth token and
//! user name) in a small TOML file. The current values live in a `watch`
//! channel, so readers such as the token propagator never wait on disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::models::Preferences;

/// Handle to the preference store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PrefsStore {
    inner: Arc<PrefsInner>,
}

struct PrefsInner {
    path: Option<PathBuf>,
    tx: watch::Sender<Preferences>,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl PrefsStore {
    /// Open the store backed by `path`, reading existing values if present
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let prefs = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Preferences::default()
        };

        debug!(path = %path.display(), "preferences loaded");
        Ok(Self::build(Some(path), prefs))
    }

    /// Store that never touches disk (tests, ephemeral sessions)
    pub fn in_memory() -> Self {
        Self::build(None, Preferences::default())
    }

    fn build(path: Option<PathBuf>, prefs: Preferences) -> Self {
        let (tx, _rx) = watch::channel(prefs);
        Self {
            inner: Arc::new(PrefsInner {
                path,
                tx,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Snapshot of all values
    pub fn current(&self) -> Preferences {
        self.inner.tx.borrow().clone()
    }

    /// Live view of the preferences, updated after every write
    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.inner.tx.subscribe()
    }

    pub fn include_adult(&self) -> bool {
        self.inner.tx.borrow().include_adult
    }

    pub fn auth_token(&self) -> Option<String> {
        self.inner.tx.borrow().auth_token.clone()
    }

    pub fn user_name(&self) -> Option<String> {
        self.inner.tx.borrow().user_name.clone()
    }

    pub async fn set_include_adult(&self, include_adult: bool) -> Result<()> {
        self.update(|p| p.include_adult = include_adult).await
    }

    pub async fn save_auth_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.update(|p| p.auth_token = Some(token)).await
    }

    pub async fn save_user_name(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.update(|p| p.user_name = Some(name)).await
    }

    /// Store token and user name in a single write
    pub async fn save_session(&self, token: impl Into<String>, user_name: Option<String>) -> Result<()> {
        let token = token.into();
        self.update(|p| {
            p.auth_token = Some(token);
            if user_name.is_some() {
                p.user_name = user_name;
            }
        })
        .await?;
        info!("session saved");
        Ok(())
    }

    /// Remove the auth token and user name
    pub async fn clear_auth(&self) -> Result<()> {
        self.update(|p| {
            p.auth_token = None;
            p.user_name = None;
        })
        .await?;
        info!("session cleared");
        Ok(())
    }

    async fn update(&self, apply: impl FnOnce(&mut Preferences)) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;

        let mut next = self.current();
        apply(&mut next);

        if let Some(path) = &self.inner.path {
            persist(path, &next).await?;
        }

        self.inner.tx.send_replace(next);
        Ok(())
    }
}

async fn persist(path: &Path, prefs: &Preferences) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(prefs)?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
