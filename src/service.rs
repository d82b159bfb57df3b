//! Cached standings loading.
//!
//! A snapshot is the aggregated records for one league at one moment. Complete
//! snapshots of leagues with teams are cached for the configured TTL; a snapshot
//! built after a failed fetch is returned to the caller but never cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::cache::{shared_cache, SharedCache};
use crate::calculate::{
    aggregate_records, build_tables, rank_records, AggregateError, StandingsTable, StandingsView,
    TiedGamePolicy,
};
use crate::models::{PlayoffStatus, Team, TeamId, TeamRecord};
use crate::storage::{LeagueStore, StorageError};

#[derive(Debug, Error)]
pub enum StandingsError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Aggregated records for one league.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsSnapshot {
    /// Normalized league key
    pub league: String,
    pub computed_at: DateTime<Utc>,
    /// Records in league-wide standings order
    pub records: Vec<TeamRecord>,
    pub teams_loaded: bool,
    pub games_loaded: bool,
}

impl StandingsSnapshot {
    pub fn is_complete(&self) -> bool {
        self.teams_loaded && self.games_loaded
    }

    pub fn record(&self, team_id: &TeamId) -> Option<&TeamRecord> {
        self.records.iter().find(|r| &r.team_id == team_id)
    }

    /// Grouped, ranked and annotated tables for a view.
    pub fn tables(&self, view: StandingsView) -> Vec<StandingsTable> {
        build_tables(&self.records, view, &league_title(&self.league))
    }
}

pub struct StandingsService {
    store: Arc<dyn LeagueStore>,
    cache: SharedCache<String, StandingsSnapshot>,
    ttl: Duration,
    policy: TiedGamePolicy,
    // bumped on every invalidation; a load that straddles one is not cached
    generation: AtomicU64,
}

impl StandingsService {
    pub fn new(store: Arc<dyn LeagueStore>, ttl: Duration, policy: TiedGamePolicy) -> Self {
        Self::with_cache(store, shared_cache(), ttl, policy)
    }

    pub fn with_cache(
        store: Arc<dyn LeagueStore>,
        cache: SharedCache<String, StandingsSnapshot>,
        ttl: Duration,
        policy: TiedGamePolicy,
    ) -> Self {
        Self {
            store,
            cache,
            ttl,
            policy,
            generation: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &SharedCache<String, StandingsSnapshot> {
        &self.cache
    }

    fn cache_key(league: &str) -> String {
        league.trim().to_ascii_lowercase()
    }

    /// Records for a league, from cache when fresh.
    pub async fn load(&self, league: &str) -> Result<StandingsSnapshot, StandingsError> {
        let key = Self::cache_key(league);
        if let Some(snapshot) = self.cache.read().await.get(&key) {
            debug!("Standings cache hit for {}", key);
            return Ok(snapshot);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let snapshot = self.compute(&key).await?;

        if snapshot.is_complete() && !snapshot.records.is_empty() {
            let mut cache = self.cache.write().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired standings snapshots", purged);
            }
            if self.generation.load(Ordering::SeqCst) == generation {
                cache.put_for(key, snapshot.clone(), self.ttl);
            } else {
                debug!("Standings for {} invalidated while loading, not caching", key);
            }
        }
        Ok(snapshot)
    }

    /// Drop the cached snapshot and load again.
    pub async fn refresh(&self, league: &str) -> Result<StandingsSnapshot, StandingsError> {
        self.invalidate(league).await;
        self.load(league).await
    }

    pub async fn invalidate(&self, league: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().await.invalidate(&Self::cache_key(league));
    }

    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.write().await.clear();
    }

    /// Assign or clear a team's playoff status.
    pub async fn set_playoff_status(
        &self,
        team_id: &TeamId,
        status: Option<PlayoffStatus>,
    ) -> Result<Team, StandingsError> {
        let team = self.store.set_playoff_status(team_id, status).await?;
        self.invalidate_all().await;
        Ok(team)
    }

    async fn compute(&self, league: &str) -> Result<StandingsSnapshot, StandingsError> {
        let (teams, games) = tokio::join!(self.store.fetch_teams(league), self.store.fetch_games(league));

        let mut snapshot = StandingsSnapshot {
            league: league.to_string(),
            computed_at: Utc::now(),
            records: Vec::new(),
            teams_loaded: true,
            games_loaded: true,
        };

        let teams = match teams {
            Ok(teams) => teams,
            Err(e) => {
                error!("Failed to load teams for {}: {}", league, e);
                snapshot.teams_loaded = false;
                snapshot.games_loaded = games.is_ok();
                return Ok(snapshot);
            }
        };

        let games = match games {
            Ok(games) => games,
            Err(e) => {
                error!("Failed to load games for {}: {}", league, e);
                snapshot.games_loaded = false;
                Vec::new()
            }
        };

        let records = aggregate_records(&teams, &games, self.policy)?;
        snapshot.records = rank_records(records.into_values().collect());

        info!(
            "Computed standings for {}: {} teams from {} games",
            league,
            snapshot.records.len(),
            games.len()
        );
        Ok(snapshot)
    }
}

/// "major" -> "Major League".
pub fn league_title(league: &str) -> String {
    let league = league.trim();
    let mut chars = league.chars();
    match chars.next() {
        Some(first) => format!("{}{} League", first.to_uppercase(), chars.as_str().to_lowercase()),
        None => "League".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftClass, DraftClassId, DraftPick, GameResult, Period};
    use crate::storage::{EntityType, JsonlStore, JsonlWriter, StorageConfig};
    use async_trait::async_trait;
    use crate::models::{Player, PlayerId};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn teams() -> Vec<Team> {
        vec![
            Team::new("tor", "Toronto", "Maple Leafs", "Eastern", "Atlantic"),
            Team::new("mtl", "Montreal", "Canadiens", "Eastern", "Atlantic"),
            Team::new("van", "Vancouver", "Canucks", "Western", "Pacific"),
        ]
    }

    fn games() -> Vec<GameResult> {
        vec![
            GameResult::played("g1", "tor", "mtl", 5, 2, Period::Regulation),
            GameResult::played("g2", "van", "tor", 3, 2, Period::Overtime),
            GameResult::scheduled("g3", "mtl", "van"),
        ]
    }

    /// In-memory store that can be told to fail and counts fetches.
    ///
    /// With `games_gate` set, `fetch_games` signals `games_started` and then
    /// waits for the gate before answering.
    #[derive(Default)]
    struct FakeStore {
        teams: Vec<Team>,
        games: Vec<GameResult>,
        fail_teams: bool,
        fail_games: bool,
        fetches: AtomicUsize,
        games_started: Option<Arc<Notify>>,
        games_gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl LeagueStore for FakeStore {
        async fn fetch_teams(&self, _league: &str) -> Result<Vec<Team>, StorageError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_teams {
                return Err(StorageError::NotFound("teams".to_string()));
            }
            Ok(self.teams.clone())
        }

        async fn fetch_games(&self, _league: &str) -> Result<Vec<GameResult>, StorageError> {
            if let Some(started) = &self.games_started {
                started.notify_one();
            }
            if let Some(gate) = &self.games_gate {
                gate.notified().await;
            }
            if self.fail_games {
                return Err(StorageError::NotFound("games".to_string()));
            }
            Ok(self.games.clone())
        }

        async fn set_playoff_status(
            &self,
            team_id: &TeamId,
            status: Option<PlayoffStatus>,
        ) -> Result<Team, StorageError> {
            let mut team = self
                .teams
                .iter()
                .find(|t| &t.id == team_id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(team_id.to_string()))?;
            team.playoff_status = status;
            Ok(team)
        }

        async fn fetch_draft_class(&self, id: &DraftClassId) -> Result<DraftClass, StorageError> {
            Err(StorageError::NotFound(id.to_string()))
        }

        async fn fetch_draft_classes(&self, _league: &str) -> Result<Vec<DraftClass>, StorageError> {
            Ok(Vec::new())
        }

        async fn save_draft_class(&self, _class: &DraftClass) -> Result<(), StorageError> {
            Ok(())
        }

        async fn fetch_draft_picks(&self, _class_id: &DraftClassId) -> Result<Vec<DraftPick>, StorageError> {
            Ok(Vec::new())
        }

        async fn save_draft_picks(
            &self,
            _class_id: &DraftClassId,
            _picks: &[DraftPick],
        ) -> Result<(), StorageError> {
            Ok(())
        }

        async fn fetch_player(&self, id: &PlayerId) -> Result<Player, StorageError> {
            Err(StorageError::NotFound(id.to_string()))
        }

        async fn fetch_draft_pool(&self, _season: u32) -> Result<Vec<Player>, StorageError> {
            Ok(Vec::new())
        }

        async fn save_players(&self, _players: &[Player]) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn service(store: FakeStore) -> (Arc<FakeStore>, StandingsService) {
        let store = Arc::new(store);
        let service = StandingsService::new(store.clone(), Duration::minutes(5), TiedGamePolicy::Skip);
        (store, service)
    }

    #[tokio::test]
    async fn test_load_ranks_league() {
        let (_store, service) = service(FakeStore {
            teams: teams(),
            games: games(),
            ..Default::default()
        });

        let snapshot = service.load("major").await.unwrap();
        assert!(snapshot.is_complete());
        let order: Vec<&str> = snapshot.records.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["tor", "van", "mtl"]);

        let tor = snapshot.record(&"tor".into()).unwrap();
        assert_eq!((tor.wins, tor.losses, tor.overtime_losses), (1, 0, 1));
        assert_eq!(tor.points, 3);
    }

    #[tokio::test]
    async fn test_load_uses_cache() {
        let (store, service) = service(FakeStore {
            teams: teams(),
            games: games(),
            ..Default::default()
        });

        service.load("major").await.unwrap();
        service.load("MAJOR").await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);

        service.refresh("major").await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_snapshot_names_normalized_league() {
        let (_store, service) = service(FakeStore {
            teams: teams(),
            games: games(),
            ..Default::default()
        });

        assert_eq!(service.load(" MAJOR ").await.unwrap().league, "major");
        assert_eq!(service.load("major").await.unwrap().league, "major");
    }

    #[tokio::test]
    async fn test_load_overlapping_invalidation_is_not_cached() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let (store, service) = service(FakeStore {
            teams: teams(),
            games: games(),
            games_started: Some(started.clone()),
            games_gate: Some(gate.clone()),
            ..Default::default()
        });
        let service = Arc::new(service);

        let loading = tokio::spawn({
            let service = service.clone();
            async move { service.load("major").await }
        });
        started.notified().await;
        service.invalidate("major").await;
        gate.notify_one();

        let snapshot = loading.await.unwrap().unwrap();
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.records.len(), 3);
        assert!(service.cache().read().await.is_empty());

        // the next load starts after the invalidation and is cached
        gate.notify_one();
        service.load("major").await.unwrap();
        assert_eq!(service.cache().read().await.len(), 1);
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_snapshots_are_purged() {
        let store = Arc::new(FakeStore {
            teams: teams(),
            games: games(),
            ..Default::default()
        });
        let service = StandingsService::new(store, Duration::milliseconds(1), TiedGamePolicy::Skip);

        for league in ["alpha", "beta", "gamma", "delta"] {
            service.load(league).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        service.load("major").await.unwrap();
        assert_eq!(service.cache().read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_league_without_teams_is_not_cached() {
        let (store, service) = service(FakeStore::default());

        let snapshot = service.load("nowhere").await.unwrap();
        assert!(snapshot.is_complete());
        assert!(snapshot.records.is_empty());
        assert!(service.cache().read().await.is_empty());

        service.load("nowhere").await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_team_fetch_yields_empty_uncached_snapshot() {
        let (store, service) = service(FakeStore {
            games: games(),
            fail_teams: true,
            ..Default::default()
        });

        let snapshot = service.load("major").await.unwrap();
        assert!(!snapshot.teams_loaded);
        assert!(snapshot.records.is_empty());

        service.load("major").await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_game_fetch_yields_zero_records() {
        let (_store, service) = service(FakeStore {
            teams: teams(),
            fail_games: true,
            ..Default::default()
        });

        let snapshot = service.load("major").await.unwrap();
        assert!(snapshot.teams_loaded);
        assert!(!snapshot.games_loaded);
        assert_eq!(snapshot.records.len(), 3);
        assert!(snapshot.records.iter().all(|r| r.games_played == 0 && r.points == 0));
        assert!(service.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_reject_policy_propagates() {
        let store = Arc::new(FakeStore {
            teams: teams(),
            games: vec![GameResult::played("g9", "tor", "mtl", 2, 2, Period::Regulation)],
            ..Default::default()
        });
        let service = StandingsService::new(store, Duration::minutes(5), TiedGamePolicy::Reject);
        assert!(matches!(
            service.load("major").await,
            Err(StandingsError::Aggregate(AggregateError::TiedGame { .. }))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_tables() {
        let (_store, service) = service(FakeStore {
            teams: teams(),
            games: games(),
            ..Default::default()
        });

        let snapshot = service.load("major").await.unwrap();
        let tables = snapshot.tables(StandingsView::Division);
        let titles: Vec<&str> = tables.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Atlantic", "Pacific"]);
        assert_eq!(tables[0].rows[0].record.team_id.as_str(), "tor");
        assert_eq!(tables[0].rows[0].rank, 1);

        let overall = snapshot.tables(StandingsView::Overall);
        assert_eq!(overall.len(), 1);
        assert_eq!(overall[0].title, "Major League");
    }

    #[tokio::test]
    async fn test_set_playoff_status_invalidates_cache() {
        let tmp = TempDir::new().unwrap();
        let config = StorageConfig::new(tmp.path().to_path_buf());
        JsonlWriter::for_entity(&config, EntityType::Team)
            .write_all(&teams())
            .unwrap();
        JsonlWriter::for_entity(&config, EntityType::Game)
            .write_all(&games())
            .unwrap();
        let service = StandingsService::new(
            Arc::new(JsonlStore::new(config)),
            Duration::minutes(5),
            TiedGamePolicy::Skip,
        );

        let before = service.load("major").await.unwrap();
        assert!(before.records.iter().all(|r| r.badge().is_none()));

        service
            .set_playoff_status(&"tor".into(), Some(PlayoffStatus::Division))
            .await
            .unwrap();

        let after = service.load("major").await.unwrap();
        let badge = after.record(&"tor".into()).unwrap().badge().unwrap();
        assert_eq!(badge.text, "y");
    }

    #[test]
    fn test_league_title() {
        assert_eq!(league_title("major"), "Major League");
        assert_eq!(league_title("MINOR"), "Minor League");
        assert_eq!(league_title(""), "League");
    }
}
