//! Team directory documents.

use serde::{Deserialize, Serialize};

use super::{PlayoffStatus, TeamId};

/// League a team plays in when the document does not say.
pub const DEFAULT_LEAGUE: &str = "major";

fn default_league() -> String {
    DEFAULT_LEAGUE.to_string()
}

/// A team as stored in the team directory.
///
/// The directory is authoritative for identity and grouping: standings are
/// built for exactly the teams listed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,

    pub city: String,

    pub mascot: String,

    /// League key ("major" / "minor")
    #[serde(default = "default_league")]
    pub league: String,

    pub conference: String,

    pub division: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Manually assigned playoff classification
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "PlayoffStatus::deserialize_optional"
    )]
    pub playoff_status: Option<PlayoffStatus>,
}

impl Team {
    pub fn new(
        id: impl Into<TeamId>,
        city: impl Into<String>,
        mascot: impl Into<String>,
        conference: impl Into<String>,
        division: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            city: city.into(),
            mascot: mascot.into(),
            league: default_league(),
            conference: conference.into(),
            division: division.into(),
            logo_url: None,
            playoff_status: None,
        }
    }

    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = league.into();
        self
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn with_playoff_status(mut self, status: PlayoffStatus) -> Self {
        self.playoff_status = Some(status);
        self
    }

    /// Display name, e.g. "Toronto Maple Leafs".
    pub fn name(&self) -> String {
        format!("{} {}", self.city.trim(), self.mascot.trim())
            .trim()
            .to_string()
    }

    pub fn in_league(&self, league: &str) -> bool {
        self.league.eq_ignore_ascii_case(league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_name() {
        let team = Team::new("tor", "Toronto", "Maple Leafs", "Eastern", "Atlantic");
        assert_eq!(team.name(), "Toronto Maple Leafs");
    }

    #[test]
    fn test_team_document_defaults() {
        let json = r#"{"id":"sea","city":"Seattle","mascot":"Kraken","conference":"Western","division":"Pacific"}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert_eq!(team.league, "major");
        assert!(team.logo_url.is_none());
        assert!(team.playoff_status.is_none());
    }

    #[test]
    fn test_team_document_camel_case_fields() {
        let json = r#"{
            "id": "bos", "city": "Boston", "mascot": "Bruins", "league": "minor",
            "conference": "Eastern", "division": "Atlantic",
            "logoUrl": "https://img/bos.png", "playoffStatus": "division"
        }"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert_eq!(team.logo_url.as_deref(), Some("https://img/bos.png"));
        assert_eq!(team.playoff_status, Some(PlayoffStatus::Division));
        assert!(team.in_league("MINOR"));
    }

    #[test]
    fn test_team_document_null_or_none_status() {
        let json = r#"{"id":"a","city":"A","mascot":"B","conference":"C","division":"D","playoffStatus":null}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert!(team.playoff_status.is_none());

        let json = r#"{"id":"a","city":"A","mascot":"B","conference":"C","division":"D","playoffStatus":"none"}"#;
        let team: Team = serde_json::from_str(json).unwrap();
        assert!(team.playoff_status.is_none());
    }

    #[test]
    fn test_team_document_unknown_status_is_rejected() {
        let json = r#"{"id":"a","city":"A","mascot":"B","conference":"C","division":"D","playoffStatus":"wildcard"}"#;
        assert!(serde_json::from_str::<Team>(json).is_err());
    }
}
