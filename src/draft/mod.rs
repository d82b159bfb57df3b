//! Draft pick generation and turn advancement.
//!
//! Picks are issued round by round in the class's draft order. The board then
//! walks them in (round, pick) order: the first incomplete pick is always the
//! one on the clock.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::{
    DraftClass, DraftClassId, DraftPick, DraftStatus, Player, PlayerDraftStatus, PlayerId, Team,
    TeamId,
};
use crate::storage::{LeagueStore, StorageError};

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft order is empty")]
    EmptyOrder,

    #[error("draft needs at least one round")]
    NoRounds,

    #[error("draft is {0}, not active")]
    NotActive(DraftStatus),

    #[error("cannot move draft from {from} to {to}")]
    InvalidTransition { from: DraftStatus, to: DraftStatus },

    #[error("every pick has been made")]
    DraftComplete,

    #[error("player {0} has already been drafted")]
    PlayerAlreadyDrafted(PlayerId),

    #[error("player {0} does not exist")]
    UnknownPlayer(PlayerId),

    #[error("player {player} is not eligible for the {season} draft")]
    PlayerNotEligible { player: PlayerId, season: u32 },

    #[error("picks already exist for draft class {0}")]
    PicksExist(DraftClassId),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Issue `rounds` rounds of picks following the class's draft order.
///
/// An order entry missing from `directory` gets no pick; its slot number is
/// not handed to the next team.
pub fn generate_picks(
    class: &DraftClass,
    rounds: u32,
    directory: &[Team],
) -> Result<Vec<DraftPick>, DraftError> {
    if rounds == 0 {
        return Err(DraftError::NoRounds);
    }
    if class.draft_order.is_empty() {
        return Err(DraftError::EmptyOrder);
    }

    let known: HashSet<&TeamId> = directory.iter().map(|t| &t.id).collect();
    for team_id in class.draft_order.iter().filter(|id| !known.contains(id)) {
        warn!("Draft order for {} names unknown team {}", class.id, team_id);
    }

    let mut picks = Vec::with_capacity(rounds as usize * class.draft_order.len());
    for round in 1..=rounds {
        for (idx, team_id) in class.draft_order.iter().enumerate() {
            if known.contains(team_id) {
                picks.push(DraftPick::new(class, round, idx as u32 + 1, team_id.clone()));
            }
        }
    }

    info!(
        "Generated {} rounds ({} picks) for draft class {}",
        rounds,
        picks.len(),
        class.id
    );
    Ok(picks)
}

/// Move an upcoming draft to active.
pub fn start_draft(class: &mut DraftClass) -> Result<(), DraftError> {
    if class.status != DraftStatus::Upcoming {
        return Err(DraftError::InvalidTransition {
            from: class.status,
            to: DraftStatus::Active,
        });
    }
    class.status = DraftStatus::Active;
    class.started_at = Some(Utc::now());
    Ok(())
}

/// Close an active draft.
pub fn finish_draft(class: &mut DraftClass) -> Result<(), DraftError> {
    if class.status != DraftStatus::Active {
        return Err(DraftError::InvalidTransition {
            from: class.status,
            to: DraftStatus::Completed,
        });
    }
    class.status = DraftStatus::Completed;
    class.completed_at = Some(Utc::now());
    Ok(())
}

/// The picks of one draft class in selection order.
#[derive(Debug, Clone, Default)]
pub struct DraftBoard {
    picks: Vec<DraftPick>,
}

impl DraftBoard {
    pub fn new(mut picks: Vec<DraftPick>) -> Self {
        picks.sort_by_key(|p| p.slot());
        Self { picks }
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn into_picks(self) -> Vec<DraftPick> {
        self.picks
    }

    /// The pick on the clock.
    pub fn current_pick(&self) -> Option<&DraftPick> {
        self.picks.iter().find(|p| !p.completed)
    }

    /// (round, pick) on the clock, or the final slot once every pick is made.
    pub fn current_position(&self) -> Option<(u32, u32)> {
        self.current_pick()
            .or_else(|| self.picks.last())
            .map(|p| p.slot())
    }

    pub fn is_complete(&self) -> bool {
        !self.picks.is_empty() && self.picks.iter().all(|p| p.completed)
    }

    pub fn rounds(&self) -> u32 {
        self.picks.iter().map(|p| p.round).max().unwrap_or(0)
    }

    pub fn picks_for_round(&self, round: u32) -> Vec<&DraftPick> {
        self.picks.iter().filter(|p| p.round == round).collect()
    }

    /// Spend the current pick on `player`, returning the completed pick.
    pub fn make_pick(&mut self, status: DraftStatus, player: PlayerId) -> Result<DraftPick, DraftError> {
        if status != DraftStatus::Active {
            return Err(DraftError::NotActive(status));
        }
        if self
            .picks
            .iter()
            .any(|p| p.player_id.as_ref() == Some(&player))
        {
            return Err(DraftError::PlayerAlreadyDrafted(player));
        }

        let pick = self
            .picks
            .iter_mut()
            .find(|p| !p.completed)
            .ok_or(DraftError::DraftComplete)?;
        pick.player_id = Some(player);
        pick.completed = true;

        info!(
            "Round {}, pick {}: {} selects {}",
            pick.round,
            pick.pick,
            pick.team_id,
            pick.player_id.as_ref().map(|p| p.as_str()).unwrap_or_default()
        );
        Ok(pick.clone())
    }
}

/// Draft operations against the store.
///
/// Every operation that reads, changes and writes back draft documents holds
/// `lock` for the whole cycle, so two clients can never spend the same pick
/// or issue the same class twice.
#[derive(Clone)]
pub struct DraftService {
    store: Arc<dyn LeagueStore>,
    rounds: u32,
    lock: Arc<Mutex<()>>,
}

impl DraftService {
    pub fn new(store: Arc<dyn LeagueStore>, rounds: u32) -> Self {
        Self {
            store,
            rounds,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn default_rounds(&self) -> u32 {
        self.rounds
    }

    /// Store `class` unless a class with its id already exists; returns the stored class.
    pub async fn ensure_class(&self, class: DraftClass) -> Result<DraftClass, DraftError> {
        let _guard = self.lock.lock().await;

        match self.store.fetch_draft_class(&class.id).await {
            Ok(existing) => Ok(existing),
            Err(StorageError::NotFound(_)) => {
                self.store.save_draft_class(&class).await?;
                info!("Created draft class {} for {} {}", class.id, class.league, class.season);
                Ok(class)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Set the draft order and issue the picks.
    pub async fn generate(
        &self,
        class_id: &DraftClassId,
        order: Option<Vec<TeamId>>,
        rounds: Option<u32>,
    ) -> Result<DraftBoard, DraftError> {
        let _guard = self.lock.lock().await;

        let mut class = self.store.fetch_draft_class(class_id).await?;
        if !self.store.fetch_draft_picks(class_id).await?.is_empty() {
            return Err(DraftError::PicksExist(class_id.clone()));
        }
        if let Some(order) = order {
            class.draft_order = order;
        }

        let directory = self.store.fetch_teams(&class.league).await?;
        let picks = generate_picks(&class, rounds.unwrap_or(self.rounds), &directory)?;

        self.store.save_draft_class(&class).await?;
        self.store.save_draft_picks(class_id, &picks).await?;
        Ok(DraftBoard::new(picks))
    }

    pub async fn board(&self, class_id: &DraftClassId) -> Result<(DraftClass, DraftBoard), DraftError> {
        let class = self.store.fetch_draft_class(class_id).await?;
        let picks = self.store.fetch_draft_picks(class_id).await?;
        Ok((class, DraftBoard::new(picks)))
    }

    pub async fn start(&self, class_id: &DraftClassId) -> Result<DraftClass, DraftError> {
        let _guard = self.lock.lock().await;

        let mut class = self.store.fetch_draft_class(class_id).await?;
        start_draft(&mut class)?;
        self.store.save_draft_class(&class).await?;
        info!("Draft {} started", class_id);
        Ok(class)
    }

    /// Close the draft and release everyone left in the pool to free agency.
    pub async fn finish(&self, class_id: &DraftClassId) -> Result<DraftClass, DraftError> {
        let _guard = self.lock.lock().await;

        let mut class = self.store.fetch_draft_class(class_id).await?;
        finish_draft(&mut class)?;

        let mut undrafted = self.store.fetch_draft_pool(class.season).await?;
        for player in &mut undrafted {
            player.mark_undrafted();
        }
        self.store.save_players(&undrafted).await?;
        self.store.save_draft_class(&class).await?;
        info!(
            "Draft {} completed, {} players released as free agents",
            class_id,
            undrafted.len()
        );
        Ok(class)
    }

    /// Spend the pick on the clock on `player_id`, who must be in this class's pool.
    pub async fn make_pick(&self, class_id: &DraftClassId, player_id: PlayerId) -> Result<DraftPick, DraftError> {
        let _guard = self.lock.lock().await;

        let (class, mut board) = self.board(class_id).await?;
        if !class.is_active() {
            return Err(DraftError::NotActive(class.status));
        }

        let mut player = match self.store.fetch_player(&player_id).await {
            Ok(player) => player,
            Err(StorageError::NotFound(_)) => return Err(DraftError::UnknownPlayer(player_id)),
            Err(e) => return Err(e.into()),
        };
        if player.draft_status == Some(PlayerDraftStatus::Drafted) {
            return Err(DraftError::PlayerAlreadyDrafted(player_id));
        }
        if !player.is_eligible_for(class.season) {
            return Err(DraftError::PlayerNotEligible {
                player: player_id,
                season: class.season,
            });
        }

        let pick = board.make_pick(class.status, player_id)?;
        player.mark_drafted(&pick);
        self.store.save_draft_picks(class_id, board.picks()).await?;
        self.store.save_players(std::slice::from_ref(&player)).await?;
        Ok(pick)
    }

    /// Players still available to the class, ordered by name.
    pub async fn available_players(&self, class_id: &DraftClassId) -> Result<Vec<Player>, DraftError> {
        let class = self.store.fetch_draft_class(class_id).await?;
        let mut pool = self.store.fetch_draft_pool(class.season).await?;
        pool.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str(), &a.id)
                .cmp(&(b.last_name.as_str(), b.first_name.as_str(), &b.id))
        });
        Ok(pool)
    }

    /// Completed drafts of a league with their boards, newest season first.
    pub async fn history(&self, league: &str) -> Result<Vec<(DraftClass, DraftBoard)>, DraftError> {
        let mut classes: Vec<DraftClass> = self
            .store
            .fetch_draft_classes(league)
            .await?
            .into_iter()
            .filter(|c| c.status == DraftStatus::Completed)
            .collect();
        classes.sort_by(|a, b| b.season.cmp(&a.season).then_with(|| a.id.cmp(&b.id)));

        let mut history = Vec::with_capacity(classes.len());
        for class in classes {
            let picks = self.store.fetch_draft_picks(&class.id).await?;
            history.push((class, DraftBoard::new(picks)));
        }
        Ok(history)
    }
}
