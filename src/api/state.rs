use std::sync::Arc;

use crate::config::AppConfig;
use crate::draft::DraftService;
use crate::service::StandingsService;
use crate::storage::{JsonlStore, LeagueStore, StorageConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub standings: Arc<StandingsService>,
    pub drafts: Arc<DraftService>,
}

impl AppState {
    /// Wire the services over a JSONL store in `config.data_dir`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn LeagueStore> =
            Arc::new(JsonlStore::new(StorageConfig::new(config.data_dir.clone())));
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn LeagueStore>) -> anyhow::Result<Self> {
        let ttl = config.standings.cache_ttl()?;
        let standings = StandingsService::new(store.clone(), ttl, config.standings.tied_games);
        let drafts = DraftService::new(store, config.draft.rounds);
        Ok(Self {
            config: Arc::new(config),
            standings: Arc::new(standings),
            drafts: Arc::new(drafts),
        })
    }

    pub fn default_league(&self) -> &str {
        &self.config.standings.default_league
    }
}
