//! Game results.
//!
//! Raw game documents are loosely shaped: scores and period are optional and the
//! period is whatever label the scorekeeper picked. [`GameResult`] is the parsed
//! form; it deserializes through [`GameDocument`] so a malformed document fails
//! at the store boundary instead of defaulting to zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{GameId, TeamId};

/// How a game ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    #[default]
    Regulation,
    Overtime,
    Shootout,
}

impl Period {
    /// Whether the loser of a game ending in this period earns an overtime loss.
    pub fn is_extra_time(&self) -> bool {
        matches!(self, Period::Overtime | Period::Shootout)
    }
}

impl FromStr for Period {
    type Err = InvalidGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regulation" | "1st" | "2nd" | "3rd" | "final" => Ok(Period::Regulation),
            "overtime" | "ot" => Ok(Period::Overtime),
            "shootout" | "so" => Ok(Period::Shootout),
            _ => Err(InvalidGame::UnknownPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Regulation => write!(f, "REGULATION"),
            Period::Overtime => write!(f, "OVERTIME"),
            Period::Shootout => write!(f, "SHOOTOUT"),
        }
    }
}

/// Highest score a single team can post in one game.
pub const MAX_SCORE: u32 = 99;

/// Why a game document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGame {
    #[error("game has an empty id")]
    MissingId,

    #[error("game {0} has an empty team id")]
    MissingTeam(GameId),

    #[error("game {0} lists the same team as home and away")]
    SameTeam(GameId),

    #[error("game {0} has only one of homeScore/awayScore")]
    PartialScore(GameId),

    #[error("game {game_id} has an implausible score of {score}")]
    ImplausibleScore { game_id: GameId, score: u32 },

    #[error("unknown period label: {0:?}")]
    UnknownPeriod(String),
}

/// The game document as it sits in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    pub id: GameId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    #[serde(default)]
    pub period: Option<String>,
}

/// Final score of a played game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub home: u32,
    pub away: u32,
    pub period: Period,
}

impl FinalScore {
    pub fn is_tied(&self) -> bool {
        self.home == self.away
    }
}

/// A validated game. `score` is `None` until the game has been played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameDocument", into = "GameDocument")]
pub struct GameResult {
    pub id: GameId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub score: Option<FinalScore>,
}

impl GameResult {
    pub fn scheduled(id: impl Into<GameId>, home: impl Into<TeamId>, away: impl Into<TeamId>) -> Self {
        Self {
            id: id.into(),
            home_team_id: home.into(),
            away_team_id: away.into(),
            score: None,
        }
    }

    pub fn played(
        id: impl Into<GameId>,
        home: impl Into<TeamId>,
        away: impl Into<TeamId>,
        home_score: u32,
        away_score: u32,
        period: Period,
    ) -> Self {
        Self {
            score: Some(FinalScore {
                home: home_score,
                away: away_score,
                period,
            }),
            ..Self::scheduled(id, home, away)
        }
    }
}

impl TryFrom<GameDocument> for GameResult {
    type Error = InvalidGame;

    fn try_from(doc: GameDocument) -> Result<Self, Self::Error> {
        if doc.id.is_empty() {
            return Err(InvalidGame::MissingId);
        }
        if doc.home_team_id.is_empty() || doc.away_team_id.is_empty() {
            return Err(InvalidGame::MissingTeam(doc.id));
        }
        if doc.home_team_id == doc.away_team_id {
            return Err(InvalidGame::SameTeam(doc.id));
        }

        let score = match (doc.home_score, doc.away_score) {
            (Some(home), Some(away)) => {
                if let Some(score) = [home, away].into_iter().find(|s| *s > MAX_SCORE) {
                    return Err(InvalidGame::ImplausibleScore {
                        game_id: doc.id,
                        score,
                    });
                }
                let period = match doc.period.as_deref() {
                    Some(label) => label.parse()?,
                    None => Period::Regulation,
                };
                Some(FinalScore { home, away, period })
            }
            (None, None) => None,
            _ => return Err(InvalidGame::PartialScore(doc.id)),
        };

        Ok(Self {
            id: doc.id,
            home_team_id: doc.home_team_id,
            away_team_id: doc.away_team_id,
            score,
        })
    }
}

impl From<GameResult> for GameDocument {
    fn from(game: GameResult) -> Self {
        Self {
            id: game.id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            home_score: game.score.map(|s| s.home),
            away_score: game.score.map(|s| s.away),
            period: game.score.map(|s| s.period.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<GameResult, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_period_labels() {
        assert_eq!("REGULATION".parse::<Period>().unwrap(), Period::Regulation);
        assert_eq!("3rd".parse::<Period>().unwrap(), Period::Regulation);
        assert_eq!("Final".parse::<Period>().unwrap(), Period::Regulation);
        assert_eq!("OT".parse::<Period>().unwrap(), Period::Overtime);
        assert_eq!("overtime".parse::<Period>().unwrap(), Period::Overtime);
        assert_eq!("SO".parse::<Period>().unwrap(), Period::Shootout);
        assert!("4th".parse::<Period>().is_err());
    }

    #[test]
    fn test_extra_time() {
        assert!(!Period::Regulation.is_extra_time());
        assert!(Period::Overtime.is_extra_time());
        assert!(Period::Shootout.is_extra_time());
    }

    #[test]
    fn test_parse_played_game() {
        let game = parse(
            r#"{"id":"g1","homeTeamId":"tor","awayTeamId":"mtl","homeScore":5,"awayScore":2,"period":"Final"}"#,
        )
        .unwrap();
        let score = game.score.unwrap();
        assert_eq!((score.home, score.away), (5, 2));
        assert_eq!(score.period, Period::Regulation);
    }

    #[test]
    fn test_parse_played_game_without_period_is_regulation() {
        let game = parse(r#"{"id":"g1","homeTeamId":"a","awayTeamId":"b","homeScore":1,"awayScore":3}"#).unwrap();
        assert_eq!(game.score.unwrap().period, Period::Regulation);
    }

    #[test]
    fn test_parse_scheduled_game() {
        let game = parse(r#"{"id":"g2","homeTeamId":"a","awayTeamId":"b","period":"1st"}"#).unwrap();
        assert!(game.score.is_none());
    }

    #[test]
    fn test_parse_rejects_partial_score() {
        let err = parse(r#"{"id":"g3","homeTeamId":"a","awayTeamId":"b","homeScore":2}"#).unwrap_err();
        assert!(err.to_string().contains("only one of"));
    }

    #[test]
    fn test_parse_rejects_same_team() {
        assert!(parse(r#"{"id":"g4","homeTeamId":"a","awayTeamId":"a"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_negative_score() {
        assert!(parse(r#"{"id":"g5","homeTeamId":"a","awayTeamId":"b","homeScore":-1,"awayScore":2}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_implausible_score() {
        let err = parse(
            r#"{"id":"g9","homeTeamId":"a","awayTeamId":"b","homeScore":4294967295,"awayScore":0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("implausible score"));

        let game = parse(r#"{"id":"g9","homeTeamId":"a","awayTeamId":"b","homeScore":99,"awayScore":0}"#).unwrap();
        assert_eq!(game.score.unwrap().home, MAX_SCORE);
    }

    #[test]
    fn test_parse_rejects_unknown_period() {
        let err = parse(
            r#"{"id":"g6","homeTeamId":"a","awayTeamId":"b","homeScore":2,"awayScore":1,"period":"double overtime"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown period"));
    }

    #[test]
    fn test_serializes_back_to_document_shape() {
        let game = GameResult::played("g7", "a", "b", 3, 2, Period::Shootout);
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["homeTeamId"], "a");
        assert_eq!(value["period"], "SHOOTOUT");
        assert_eq!(parse(&value.to_string()).unwrap(), game);
    }
}
