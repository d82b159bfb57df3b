//! Derived standings models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Team, TeamId};

/// Manually curated playoff classification.
///
/// Purely presentational; it never affects ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayoffStatus {
    /// League champion / presidents' trophy
    League,
    Conference,
    Division,
    /// Clinched a playoff spot
    Playoff,
    Eliminated,
}

impl PlayoffStatus {
    pub const ALL: [PlayoffStatus; 5] = [
        PlayoffStatus::League,
        PlayoffStatus::Conference,
        PlayoffStatus::Division,
        PlayoffStatus::Playoff,
        PlayoffStatus::Eliminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayoffStatus::League => "league",
            PlayoffStatus::Conference => "conference",
            PlayoffStatus::Division => "division",
            PlayoffStatus::Playoff => "playoff",
            PlayoffStatus::Eliminated => "eliminated",
        }
    }

    /// Badge shown next to the team name.
    pub fn badge(&self) -> Badge {
        let (text, style) = match self {
            PlayoffStatus::League => ("P", BadgeStyle::Success),
            PlayoffStatus::Conference => ("z", BadgeStyle::Info),
            PlayoffStatus::Division => ("y", BadgeStyle::Warning),
            PlayoffStatus::Playoff => ("x", BadgeStyle::Primary),
            PlayoffStatus::Eliminated => ("e", BadgeStyle::Danger),
        };
        Badge {
            text: text.to_string(),
            style,
        }
    }

    /// Parse a user-supplied status where "none" (or empty) clears it.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, UnknownPlayoffStatus> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        s.parse().map(Some)
    }

    /// Serde helper for document fields that may be absent, null or "none".
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => Self::parse_optional(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown playoff status: {0:?}")]
pub struct UnknownPlayoffStatus(pub String);

impl FromStr for PlayoffStatus {
    type Err = UnknownPlayoffStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPlayoffStatus(s.to_string()))
    }
}

impl fmt::Display for PlayoffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bootstrap-style colour for a badge or highlighted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStyle {
    Success,
    Info,
    Warning,
    Primary,
    Danger,
}

impl BadgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeStyle::Success => "success",
            BadgeStyle::Info => "info",
            BadgeStyle::Warning => "warning",
            BadgeStyle::Primary => "primary",
            BadgeStyle::Danger => "danger",
        }
    }
}

/// Display badge for a playoff status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub text: String,
    pub style: BadgeStyle,
}

impl Badge {
    /// CSS classes for the badge element, e.g. "badge bg-success".
    pub fn badge_class(&self) -> String {
        format!("badge bg-{}", self.style.as_str())
    }

    /// CSS class for the highlighted table row, e.g. "table-success".
    pub fn row_class(&self) -> String {
        format!("table-{}", self.style.as_str())
    }
}

/// Badge for a record, if a status has been assigned.
pub fn annotate(record: &TeamRecord) -> Option<Badge> {
    record.playoff_status.map(|s| s.badge())
}

/// Cumulative season record for one team.
///
/// Rebuilt from the full game set on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub name: String,
    pub league: String,
    pub conference: String,
    pub division: String,
    pub logo_url: Option<String>,

    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub overtime_losses: u32,

    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_differential: i64,

    pub points: u32,

    /// points / (2 * games_played), 0.0 with no games
    pub point_percentage: f64,

    pub playoff_status: Option<PlayoffStatus>,
}

impl TeamRecord {
    /// A zeroed record carrying the team's static attributes.
    pub fn empty(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            name: team.name(),
            league: team.league.clone(),
            conference: team.conference.clone(),
            division: team.division.clone(),
            logo_url: team.logo_url.clone(),
            games_played: 0,
            wins: 0,
            losses: 0,
            overtime_losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_differential: 0,
            points: 0,
            point_percentage: 0.0,
            playoff_status: team.playoff_status,
        }
    }

    /// Recompute the derived fields from the counters.
    pub fn refresh_derived(&mut self) {
        self.goal_differential = self.goals_for as i64 - self.goals_against as i64;
        self.points = crate::calculate::calculate_points(self.wins, self.overtime_losses);
        self.point_percentage =
            crate::calculate::calculate_point_percentage(self.points, self.games_played);
    }

    pub fn badge(&self) -> Option<Badge> {
        annotate(self)
    }
}
