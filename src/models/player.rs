//! Player documents, as far as the draft needs them.

use serde::{Deserialize, Serialize};

use super::{DraftPick, PlayerId, TeamId};

/// Where a player stands with respect to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerDraftStatus {
    /// In a draft pool and not yet selected
    Eligible,
    Drafted,
    /// Passed over when the draft closed
    Undrafted,
}

impl std::fmt::Display for PlayerDraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerDraftStatus::Eligible => write!(f, "eligible"),
            PlayerDraftStatus::Drafted => write!(f, "drafted"),
            PlayerDraftStatus::Undrafted => write!(f, "undrafted"),
        }
    }
}

/// A player in the player directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub position: String,

    /// Team the player is rostered on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,

    #[serde(default)]
    pub free_agent: bool,

    /// Season of the draft class whose pool the player belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_class: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_status: Option<PlayerDraftStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drafted_by: Option<TeamId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_round: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_pick: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_season: Option<u32>,
}

impl Player {
    /// A prospect in the pool for the `season` draft.
    pub fn prospect(
        id: impl Into<PlayerId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        season: u32,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            position: String::new(),
            team_id: None,
            free_agent: false,
            draft_class: Some(season),
            draft_status: Some(PlayerDraftStatus::Eligible),
            drafted_by: None,
            draft_round: None,
            draft_pick: None,
            draft_season: None,
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Whether the player can be taken in the `season` draft.
    pub fn is_eligible_for(&self, season: u32) -> bool {
        self.draft_class == Some(season) && self.draft_status == Some(PlayerDraftStatus::Eligible)
    }

    /// Record the player's selection and roster them on the picking team.
    pub fn mark_drafted(&mut self, pick: &DraftPick) {
        self.team_id = Some(pick.team_id.clone());
        self.drafted_by = Some(pick.team_id.clone());
        self.draft_round = Some(pick.round);
        self.draft_pick = Some(pick.pick);
        self.draft_season = Some(pick.season);
        self.draft_status = Some(PlayerDraftStatus::Drafted);
        self.free_agent = false;
    }

    /// Release a player nobody picked into free agency.
    pub fn mark_undrafted(&mut self) {
        self.team_id = None;
        self.draft_status = Some(PlayerDraftStatus::Undrafted);
        self.free_agent = true;
    }
}
