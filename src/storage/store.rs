//! Read/write collaborators for the league documents.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::{dedup_by_id, EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{
    DraftClass, DraftClassId, DraftPick, GameResult, Player, PlayerId, PlayoffStatus, Team, TeamId,
};

/// Access to the league's document collections.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    /// All teams in a league.
    async fn fetch_teams(&self, league: &str) -> Result<Vec<Team>, StorageError>;

    /// All games (played or scheduled) between teams of a league.
    async fn fetch_games(&self, league: &str) -> Result<Vec<GameResult>, StorageError>;

    /// Assign or clear a team's playoff status, returning the updated team.
    async fn set_playoff_status(
        &self,
        team_id: &TeamId,
        status: Option<PlayoffStatus>,
    ) -> Result<Team, StorageError>;

    async fn fetch_draft_class(&self, id: &DraftClassId) -> Result<DraftClass, StorageError>;

    /// Every draft class of a league.
    async fn fetch_draft_classes(&self, league: &str) -> Result<Vec<DraftClass>, StorageError>;

    /// Insert or replace a draft class.
    async fn save_draft_class(&self, class: &DraftClass) -> Result<(), StorageError>;

    /// Picks of a draft class, in stored order.
    async fn fetch_draft_picks(&self, class_id: &DraftClassId) -> Result<Vec<DraftPick>, StorageError>;

    /// Replace every pick of a draft class.
    async fn save_draft_picks(
        &self,
        class_id: &DraftClassId,
        picks: &[DraftPick],
    ) -> Result<(), StorageError>;

    async fn fetch_player(&self, id: &PlayerId) -> Result<Player, StorageError>;

    /// Players still eligible in the `season` draft pool.
    async fn fetch_draft_pool(&self, season: u32) -> Result<Vec<Player>, StorageError>;

    /// Insert or replace players by id.
    async fn save_players(&self, players: &[Player]) -> Result<(), StorageError>;
}

/// [`LeagueStore`] backed by JSONL files in a data directory.
pub struct JsonlStore {
    config: StorageConfig,
    // serializes read-modify-write cycles on the files
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn all_teams(&self) -> Result<Vec<Team>, StorageError> {
        let teams = JsonlReader::<Team>::for_entity(&self.config, EntityType::Team).read_all()?;
        Ok(dedup_by_id(teams, |t| t.id.as_str()))
    }

    fn all_draft_classes(&self) -> Result<Vec<DraftClass>, StorageError> {
        let classes = JsonlReader::<DraftClass>::for_entity(&self.config, EntityType::DraftClass)
            .read_all()?;
        Ok(dedup_by_id(classes, |c| c.id.as_str()))
    }

    fn all_draft_picks(&self) -> Result<Vec<DraftPick>, StorageError> {
        let picks = JsonlReader::<DraftPick>::for_entity(&self.config, EntityType::DraftPick)
            .read_all()?;
        Ok(dedup_by_id(picks, |p| p.id.as_str()))
    }

    fn all_players(&self) -> Result<Vec<Player>, StorageError> {
        let players =
            JsonlReader::<Player>::for_entity(&self.config, EntityType::Player).read_all()?;
        Ok(dedup_by_id(players, |p| p.id.as_str()))
    }
}

#[async_trait]
impl LeagueStore for JsonlStore {
    async fn fetch_teams(&self, league: &str) -> Result<Vec<Team>, StorageError> {
        let teams: Vec<Team> = self
            .all_teams()?
            .into_iter()
            .filter(|t| t.in_league(league))
            .collect();
        info!("Loaded {} teams for league {}", teams.len(), league);
        Ok(teams)
    }

    async fn fetch_games(&self, league: &str) -> Result<Vec<GameResult>, StorageError> {
        let league_teams: std::collections::HashSet<TeamId> = self
            .all_teams()?
            .into_iter()
            .filter(|t| t.in_league(league))
            .map(|t| t.id)
            .collect();

        let games = JsonlReader::<GameResult>::for_entity(&self.config, EntityType::Game)
            .read_all()?;
        let games: Vec<GameResult> = dedup_by_id(games, |g| g.id.as_str())
            .into_iter()
            .filter(|g| league_teams.contains(&g.home_team_id))
            .collect();
        info!("Loaded {} games for league {}", games.len(), league);
        Ok(games)
    }

    async fn set_playoff_status(
        &self,
        team_id: &TeamId,
        status: Option<PlayoffStatus>,
    ) -> Result<Team, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut teams = self.all_teams()?;
        let team = teams
            .iter_mut()
            .find(|t| &t.id == team_id)
            .ok_or_else(|| StorageError::NotFound(format!("team {}", team_id)))?;
        team.playoff_status = status;
        let updated = team.clone();

        JsonlWriter::for_entity(&self.config, EntityType::Team).write_all(&teams)?;
        info!(
            "Playoff status for {} set to {}",
            team_id,
            status.map(|s| s.as_str()).unwrap_or("none")
        );
        Ok(updated)
    }

    async fn fetch_draft_class(&self, id: &DraftClassId) -> Result<DraftClass, StorageError> {
        self.all_draft_classes()?
            .into_iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("draft class {}", id)))
    }

    async fn fetch_draft_classes(&self, league: &str) -> Result<Vec<DraftClass>, StorageError> {
        let league = league.trim();
        Ok(self
            .all_draft_classes()?
            .into_iter()
            .filter(|c| c.league.eq_ignore_ascii_case(league))
            .collect())
    }

    async fn save_draft_class(&self, class: &DraftClass) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut classes = self.all_draft_classes()?;
        match classes.iter_mut().find(|c| c.id == class.id) {
            Some(existing) => *existing = class.clone(),
            None => classes.push(class.clone()),
        }
        JsonlWriter::for_entity(&self.config, EntityType::DraftClass).write_all(&classes)?;
        Ok(())
    }

    async fn fetch_draft_picks(&self, class_id: &DraftClassId) -> Result<Vec<DraftPick>, StorageError> {
        Ok(self
            .all_draft_picks()?
            .into_iter()
            .filter(|p| &p.draft_class_id == class_id)
            .collect())
    }

    async fn save_draft_picks(
        &self,
        class_id: &DraftClassId,
        picks: &[DraftPick],
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut all: Vec<DraftPick> = self
            .all_draft_picks()?
            .into_iter()
            .filter(|p| &p.draft_class_id != class_id)
            .collect();
        all.extend_from_slice(picks);
        JsonlWriter::for_entity(&self.config, EntityType::DraftPick).write_all(&all)?;
        info!("Saved {} picks for draft class {}", picks.len(), class_id);
        Ok(())
    }

    async fn fetch_player(&self, id: &PlayerId) -> Result<Player, StorageError> {
        self.all_players()?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("player {}", id)))
    }

    async fn fetch_draft_pool(&self, season: u32) -> Result<Vec<Player>, StorageError> {
        Ok(self
            .all_players()?
            .into_iter()
            .filter(|p| p.is_eligible_for(season))
            .collect())
    }

    async fn save_players(&self, players: &[Player]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.all_players()?;
        for player in players {
            match all.iter_mut().find(|p| p.id == player.id) {
                Some(existing) => *existing = player.clone(),
                None => all.push(player.clone()),
            }
        }
        JsonlWriter::for_entity(&self.config, EntityType::Player).write_all(&all)?;
        Ok(())
    }
}
