//! Folding raw game results into per-team records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{FinalScore, GameId, GameResult, Team, TeamId, TeamRecord};

/// What to do with a played game whose scores are level.
///
/// Hockey games cannot end tied, so such a document is a data-entry problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiedGamePolicy {
    /// Log and leave the game out of every counter.
    #[default]
    Skip,
    /// Fail the whole aggregation.
    Reject,
}

impl FromStr for TiedGamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(TiedGamePolicy::Skip),
            "reject" => Ok(TiedGamePolicy::Reject),
            other => Err(format!("unknown tied game policy: {other}")),
        }
    }
}

impl fmt::Display for TiedGamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiedGamePolicy::Skip => write!(f, "skip"),
            TiedGamePolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("game {game_id} ended tied {score}-{score}")]
    TiedGame { game_id: GameId, score: u32 },

    #[error("goal totals for {team_id} overflow at game {game_id}")]
    GoalOverflow { team_id: TeamId, game_id: GameId },
}

/// Build one record per team from the full game set.
///
/// Every team in `teams` gets a record, including teams without games.
/// Unplayed games are ignored; played games naming a team outside `teams`
/// are skipped entirely so goals stay balanced across the returned records.
pub fn aggregate_records(
    teams: &[Team],
    games: &[GameResult],
    policy: TiedGamePolicy,
) -> Result<BTreeMap<TeamId, TeamRecord>, AggregateError> {
    let mut records: BTreeMap<TeamId, TeamRecord> = teams
        .iter()
        .map(|t| (t.id.clone(), TeamRecord::empty(t)))
        .collect();

    let mut counted = 0usize;

    for game in games {
        let Some(score) = game.score else {
            continue;
        };

        if score.is_tied() {
            match policy {
                TiedGamePolicy::Skip => {
                    warn!(
                        "Skipping game {} ({} vs {}): tied {}-{}",
                        game.id, game.home_team_id, game.away_team_id, score.home, score.away
                    );
                    continue;
                }
                TiedGamePolicy::Reject => {
                    return Err(AggregateError::TiedGame {
                        game_id: game.id.clone(),
                        score: score.home,
                    });
                }
            }
        }

        if !records.contains_key(&game.home_team_id) || !records.contains_key(&game.away_team_id) {
            warn!(
                "Skipping game {}: {} vs {} names a team outside the directory",
                game.id, game.home_team_id, game.away_team_id
            );
            continue;
        }

        if let Some(home) = records.get_mut(&game.home_team_id) {
            apply_side(home, &game.id, score.home, score.away, &score)?;
        }
        if let Some(away) = records.get_mut(&game.away_team_id) {
            apply_side(away, &game.id, score.away, score.home, &score)?;
        }
        counted += 1;
    }

    for record in records.values_mut() {
        record.refresh_derived();
    }

    debug!(
        "Aggregated {} played games into {} team records",
        counted,
        records.len()
    );
    Ok(records)
}

/// Apply one side of a decided game to a record.
fn apply_side(
    record: &mut TeamRecord,
    game_id: &GameId,
    scored: u32,
    conceded: u32,
    score: &FinalScore,
) -> Result<(), AggregateError> {
    let (Some(goals_for), Some(goals_against)) = (
        record.goals_for.checked_add(scored),
        record.goals_against.checked_add(conceded),
    ) else {
        return Err(AggregateError::GoalOverflow {
            team_id: record.team_id.clone(),
            game_id: game_id.clone(),
        });
    };
    record.games_played += 1;
    record.goals_for = goals_for;
    record.goals_against = goals_against;

    if scored > conceded {
        record.wins += 1;
    } else if score.period.is_extra_time() {
        record.overtime_losses += 1;
    } else {
        record.losses += 1;
    }
    Ok(())
}
