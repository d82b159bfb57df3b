//! Draft classes and picks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DraftClassId, DraftPickId, EntityId, PlayerId, TeamId, DEFAULT_LEAGUE};

/// Lifecycle of a draft class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftStatus::Upcoming => write!(f, "upcoming"),
            DraftStatus::Active => write!(f, "active"),
            DraftStatus::Completed => write!(f, "completed"),
        }
    }
}

fn default_league() -> String {
    DEFAULT_LEAGUE.to_string()
}

/// One season's draft for one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftClass {
    pub id: DraftClassId,

    pub season: u32,

    #[serde(default = "default_league")]
    pub league: String,

    #[serde(default)]
    pub status: DraftStatus,

    /// Team ids in selection order for every round
    #[serde(default)]
    pub draft_order: Vec<TeamId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DraftClass {
    pub fn new(id: impl Into<DraftClassId>, season: u32) -> Self {
        Self {
            id: id.into(),
            season,
            league: default_league(),
            status: DraftStatus::Upcoming,
            draft_order: Vec::new(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = league.into();
        self
    }

    pub fn with_order(mut self, order: Vec<TeamId>) -> Self {
        self.draft_order = order;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == DraftStatus::Active
    }
}

/// A single selection slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPick {
    pub id: DraftPickId,
    pub draft_class_id: DraftClassId,
    pub season: u32,
    pub round: u32,
    /// Position within the round, 1-based
    pub pick: u32,
    /// Team currently holding the pick
    pub team_id: TeamId,
    /// Team the pick was originally issued to
    pub original_team_id: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub completed: bool,
}

impl DraftPick {
    pub fn new(class: &DraftClass, round: u32, pick: u32, team_id: TeamId) -> Self {
        let id = EntityId::generate(&[class.id.as_str(), &round.to_string(), &pick.to_string()]);
        Self {
            id,
            draft_class_id: class.id.clone(),
            season: class.season,
            round,
            pick,
            original_team_id: team_id.clone(),
            team_id,
            player_id: None,
            completed: false,
        }
    }

    /// Sort key: round first, then position within the round.
    pub fn slot(&self) -> (u32, u32) {
        (self.round, self.pick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_class_document_defaults() {
        let class: DraftClass = serde_json::from_str(r#"{"id":"dc-2026","season":2026}"#).unwrap();
        assert_eq!(class.league, "major");
        assert_eq!(class.status, DraftStatus::Upcoming);
        assert!(class.draft_order.is_empty());
    }

    #[test]
    fn test_draft_status_serialization() {
        assert_eq!(serde_json::to_string(&DraftStatus::Active).unwrap(), "\"active\"");
        assert_eq!(DraftStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_pick_ids_are_stable_per_slot() {
        let class = DraftClass::new("dc-2026", 2026);
        let a = DraftPick::new(&class, 1, 3, "tor".into());
        let b = DraftPick::new(&class, 1, 3, "mtl".into());
        let c = DraftPick::new(&class, 2, 3, "tor".into());
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.original_team_id, a.team_id);
        assert!(!a.completed);
    }
}
