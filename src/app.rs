//! Application wiring
//!
//! Owns the long-lived clients and stores and hands out view-models that
//! share them. Built once per process from the loaded [`Config`].

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::api::{AuthClient, TmdbClient};
use crate::config::{Config, API_KEY_ENV};
use crate::store::{PrefsStore, WatchListStore};
use crate::viewmodel::{
    AuthViewModel, DetailsViewModel, HomeViewModel, SearchViewModel, WatchListViewModel,
};

// =============================================================================
// App
// =============================================================================

pub struct App {
    config: Config,
    /// Absent when no API key is configured; only catalog commands need it
    catalog: Option<TmdbClient>,
    auth: AuthClient,
    prefs: PrefsStore,
    watch_list: WatchListStore,
}

impl App {
    /// Open the on-disk stores under the configured data directory
    pub async fn open(config: Config) -> Result<Self> {
        let prefs = PrefsStore::open(config.prefs_path()).await?;
        let watch_list = WatchListStore::open(&config.database_url()).await?;
        info!(data_dir = %config.data_dir().display(), "stores opened");
        Ok(Self::assemble(config, prefs, watch_list))
    }

    /// Same wiring with stores that never touch disk
    pub async fn in_memory(config: Config) -> Result<Self> {
        let prefs = PrefsStore::in_memory();
        let watch_list = WatchListStore::in_memory().await?;
        Ok(Self::assemble(config, prefs, watch_list))
    }

    fn assemble(config: Config, prefs: PrefsStore, watch_list: WatchListStore) -> Self {
        let catalog = match config.api_key() {
            Ok(key) => Some(TmdbClient::from_config(&config, key)),
            Err(e) => {
                debug!(error = %e, "catalog client disabled");
                None
            }
        };
        let auth = AuthClient::from_config(&config, &prefs);

        Self {
            config,
            catalog,
            auth,
            prefs,
            watch_list,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> Result<&TmdbClient> {
        self.catalog.as_ref().ok_or_else(|| {
            anyhow!(
                "TMDB API key not configured. Set {} or add tmdb_api_key to the config file",
                API_KEY_ENV
            )
        })
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn prefs(&self) -> &PrefsStore {
        &self.prefs
    }

    pub fn watch_list(&self) -> &WatchListStore {
        &self.watch_list
    }

    // -------------------------------------------------------------------------
    // View-models
    // -------------------------------------------------------------------------

    pub fn home(&self) -> Result<HomeViewModel> {
        Ok(HomeViewModel::new(self.catalog()?.clone()))
    }

    pub fn details(&self) -> Result<DetailsViewModel> {
        Ok(DetailsViewModel::new(
            self.catalog()?.clone(),
            self.watch_list.clone(),
        ))
    }

    pub fn search(&self) -> Result<SearchViewModel> {
        Ok(SearchViewModel::new(
            self.catalog()?.clone(),
            self.prefs.clone(),
        ))
    }

    pub fn watch_list_view(&self) -> WatchListViewModel {
        WatchListViewModel::new(self.watch_list.clone())
    }

    pub fn session(&self) -> AuthViewModel {
        AuthViewModel::new(self.auth.clone(), self.prefs.clone())
    }
}
