//! Per-user tournament record, as recovered from a results payload.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TournamentId;

/// One tournament in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub tournament_id: TournamentId,

    /// Display name of the event
    pub event_name: Option<String>,

    /// Unix seconds
    pub start_time: Option<i64>,

    /// Final rank of this user's team (1 = winner)
    pub placement: Option<u32>,

    /// Teams in the division; only known once placement is
    pub team_count: Option<u32>,

    /// Division label (e.g., "Division A")
    pub division: Option<String>,

    pub logo_url: Option<String>,

    /// Lowercase usernames of the user's teammates
    #[serde(default)]
    pub teammates: BTreeSet<String>,
}

impl Tournament {
    /// Create a record carrying only its identifier.
    pub fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            event_name: None,
            start_time: None,
            placement: None,
            team_count: None,
            division: None,
            logo_url: None,
            teammates: BTreeSet::new(),
        }
    }

    /// Builder method to set event name.
    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    /// Builder method to set start time.
    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Builder method to set placement.
    pub fn with_placement(mut self, placement: u32) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Builder method to set team count.
    pub fn with_team_count(mut self, team_count: u32) -> Self {
        self.team_count = Some(team_count);
        self
    }

    /// Builder method to set division.
    pub fn with_division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    /// Builder method to add a teammate (stored lowercase).
    pub fn with_teammate(mut self, name: &str) -> Self {
        self.teammates.insert(name.to_lowercase());
        self
    }

    /// Whether `username` appears in this record's teammates, ignoring case.
    pub fn has_teammate(&self, username: &str) -> bool {
        let wanted = username.to_lowercase();
        self.teammates.iter().any(|mate| mate.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let t = Tournament::new(TournamentId::new(1234))
            .with_event_name("In The Zone 30")
            .with_placement(3)
            .with_team_count(48)
            .with_teammate("Bob");

        assert_eq!(t.event_name.as_deref(), Some("In The Zone 30"));
        assert_eq!(t.placement, Some(3));
        assert_eq!(t.team_count, Some(48));
        assert!(t.teammates.contains("bob"));
    }

    #[test]
    fn test_has_teammate_case_insensitive() {
        let t = Tournament::new(TournamentId::new(1234)).with_teammate("bob");

        assert!(t.has_teammate("BoB"));
        assert!(!t.has_teammate("alice"));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let t = Tournament::new(TournamentId::new(1234)).with_start_time(1_700_000_100);
        let json = serde_json::to_value(&t).unwrap();

        assert_eq!(json["tournamentId"], 1234);
        assert_eq!(json["startTime"], 1_700_000_100i64);
        assert!(json["teamCount"].is_null());
    }
}
