//! Standings ordering and grouping.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{annotate, Badge, TeamRecord};

/// Total order used by every standings table: points, point percentage and goal
/// differential (all descending), then team id ascending.
pub fn compare_records(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.point_percentage.total_cmp(&a.point_percentage))
        .then_with(|| b.goal_differential.cmp(&a.goal_differential))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Sort records into standings order.
pub fn rank_records(mut records: Vec<TeamRecord>) -> Vec<TeamRecord> {
    records.sort_by(compare_records);
    records
}

/// Which teams a standings table covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandingsScope {
    League,
    Conference(String),
    Division { conference: String, division: String },
}

impl StandingsScope {
    pub fn matches(&self, record: &TeamRecord) -> bool {
        match self {
            StandingsScope::League => true,
            StandingsScope::Conference(conference) => &record.conference == conference,
            StandingsScope::Division {
                conference,
                division,
            } => &record.conference == conference && &record.division == division,
        }
    }
}

/// Filter records to a scope and rank them.
pub fn standings_for<'a, I>(records: I, scope: &StandingsScope) -> Vec<TeamRecord>
where
    I: IntoIterator<Item = &'a TeamRecord>,
{
    rank_records(
        records
            .into_iter()
            .filter(|r| scope.matches(r))
            .cloned()
            .collect(),
    )
}

/// How standings are grouped for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StandingsView {
    #[default]
    Division,
    Conference,
    Overall,
}

impl FromStr for StandingsView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "division" => Ok(StandingsView::Division),
            "conference" => Ok(StandingsView::Conference),
            "overall" | "league" => Ok(StandingsView::Overall),
            other => Err(format!("unknown standings view: {other}")),
        }
    }
}

impl fmt::Display for StandingsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingsView::Division => write!(f, "division"),
            StandingsView::Conference => write!(f, "conference"),
            StandingsView::Overall => write!(f, "overall"),
        }
    }
}

/// One ranked line of a standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    /// 1-based position within the table
    pub rank: usize,
    #[serde(flatten)]
    pub record: TeamRecord,
    pub badge: Option<Badge>,
}

/// A titled, ranked table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsTable {
    pub title: String,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub rows: Vec<StandingsRow>,
}

impl StandingsTable {
    fn new(title: String, scope: &StandingsScope, records: &[TeamRecord]) -> Self {
        let (conference, division) = match scope {
            StandingsScope::League => (None, None),
            StandingsScope::Conference(c) => (Some(c.clone()), None),
            StandingsScope::Division {
                conference,
                division,
            } => (Some(conference.clone()), Some(division.clone())),
        };
        let rows = standings_for(records, scope)
            .into_iter()
            .enumerate()
            .map(|(i, record)| StandingsRow {
                rank: i + 1,
                badge: annotate(&record),
                record,
            })
            .collect();
        Self {
            title,
            conference,
            division,
            rows,
        }
    }
}

/// Conference name -> division names, both in name order.
pub fn conference_layout(records: &[TeamRecord]) -> BTreeMap<String, Vec<String>> {
    let mut layout: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        let divisions = layout.entry(record.conference.clone()).or_default();
        if !divisions.contains(&record.division) {
            divisions.push(record.division.clone());
        }
    }
    for divisions in layout.values_mut() {
        divisions.sort();
    }
    layout
}

/// Build the grouped tables for a view.
pub fn build_tables(records: &[TeamRecord], view: StandingsView, title: &str) -> Vec<StandingsTable> {
    let layout = conference_layout(records);
    match view {
        StandingsView::Overall => vec![StandingsTable::new(
            title.to_string(),
            &StandingsScope::League,
            records,
        )],
        StandingsView::Conference => layout
            .keys()
            .map(|conference| {
                StandingsTable::new(
                    conference.clone(),
                    &StandingsScope::Conference(conference.clone()),
                    records,
                )
            })
            .collect(),
        StandingsView::Division => layout
            .iter()
            .flat_map(|(conference, divisions)| {
                divisions.iter().map(move |division| {
                    StandingsTable::new(
                        division.clone(),
                        &StandingsScope::Division {
                            conference: conference.clone(),
                            division: division.clone(),
                        },
                        records,
                    )
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayoffStatus, Team};
    use pretty_assertions::assert_eq;

    fn record(id: &str, points: u32, pct: f64, diff: i64) -> TeamRecord {
        let mut r = TeamRecord::empty(&Team::new(id, id, "Club", "Eastern", "Atlantic"));
        r.points = points;
        r.point_percentage = pct;
        r.goal_differential = diff;
        r
    }

    fn placed(id: &str, conference: &str, division: &str, points: u32) -> TeamRecord {
        let mut r = record(id, points, 0.5, 0);
        r.conference = conference.to_string();
        r.division = division.to_string();
        r
    }

    fn ids(records: &[TeamRecord]) -> Vec<&str> {
        records.iter().map(|r| r.team_id.as_str()).collect()
    }

    #[test]
    fn test_points_dominate() {
        let ranked = rank_records(vec![
            record("c", 8, 0.7, 10),
            record("b", 10, 0.55, 0),
            record("a", 10, 0.6, -4),
        ]);
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_goal_differential_breaks_tie() {
        let ranked = rank_records(vec![record("x", 20, 0.5, -2), record("y", 20, 0.5, 5)]);
        assert_eq!(ids(&ranked), vec!["y", "x"]);
    }

    #[test]
    fn test_team_id_is_final_tiebreak() {
        let ranked = rank_records(vec![
            record("mtl", 20, 0.5, 1),
            record("bos", 20, 0.5, 1),
            record("det", 20, 0.5, 1),
        ]);
        assert_eq!(ids(&ranked), vec!["bos", "det", "mtl"]);
    }

    #[test]
    fn test_zero_game_team_sorts_after_positive_points() {
        let ranked = rank_records(vec![record("empty", 0, 0.0, 0), record("one", 1, 0.5, -3)]);
        assert_eq!(ids(&ranked), vec!["one", "empty"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_records(Vec::new()).is_empty());
        assert!(standings_for(&Vec::<TeamRecord>::new(), &StandingsScope::League).is_empty());
    }

    #[test]
    fn test_scope_filters() {
        let records = vec![
            placed("a", "Eastern", "Atlantic", 10),
            placed("b", "Eastern", "Metropolitan", 12),
            placed("c", "Western", "Central", 14),
        ];

        let east = standings_for(&records, &StandingsScope::Conference("Eastern".into()));
        assert_eq!(ids(&east), vec!["b", "a"]);

        let atlantic = standings_for(
            &records,
            &StandingsScope::Division {
                conference: "Eastern".into(),
                division: "Atlantic".into(),
            },
        );
        assert_eq!(ids(&atlantic), vec!["a"]);

        let all = standings_for(&records, &StandingsScope::League);
        assert_eq!(ids(&all), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_division_scope_requires_both_names() {
        let records = vec![placed("a", "Western", "Atlantic", 10)];
        let scope = StandingsScope::Division {
            conference: "Eastern".into(),
            division: "Atlantic".into(),
        };
        assert!(standings_for(&records, &scope).is_empty());
    }

    #[test]
    fn test_build_tables_by_division() {
        let records = vec![
            placed("a", "Western", "Pacific", 10),
            placed("b", "Eastern", "Metropolitan", 12),
            placed("c", "Eastern", "Atlantic", 14),
            placed("d", "Eastern", "Atlantic", 16),
        ];
        let tables = build_tables(&records, StandingsView::Division, "Major League");
        let titles: Vec<_> = tables.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Atlantic", "Metropolitan", "Pacific"]);
        assert_eq!(tables[0].conference.as_deref(), Some("Eastern"));
        assert_eq!(tables[0].rows[0].record.team_id.as_str(), "d");
        assert_eq!(tables[0].rows[1].rank, 2);
    }

    #[test]
    fn test_build_tables_overall_with_badges() {
        let mut leader = placed("a", "Eastern", "Atlantic", 30);
        leader.playoff_status = Some(PlayoffStatus::League);
        let records = vec![placed("b", "Western", "Central", 10), leader];

        let tables = build_tables(&records, StandingsView::Overall, "Major League");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].title, "Major League");
        let first = &tables[0].rows[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.badge.as_ref().map(|b| b.text.as_str()), Some("P"));
        assert!(tables[0].rows[1].badge.is_none());
    }

    #[test]
    fn test_build_tables_by_conference() {
        let records = vec![
            placed("a", "Western", "Pacific", 10),
            placed("b", "Eastern", "Metropolitan", 12),
        ];
        let tables = build_tables(&records, StandingsView::Conference, "");
        let titles: Vec<_> = tables.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Eastern", "Western"]);
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("Division".parse::<StandingsView>().unwrap(), StandingsView::Division);
        assert_eq!("league".parse::<StandingsView>().unwrap(), StandingsView::Overall);
        assert!("wildcard".parse::<StandingsView>().is_err());
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = StandingsRow {
            rank: 1,
            record: record("a", 2, 1.0, 3),
            badge: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["teamId"], "a");
        assert_eq!(json["points"], 2);
        assert_eq!(json["goalDifferential"], 3);
        assert!(json.get("team_id").is_none());
    }
}
