//! Reconciliation of two users' tournament histories.
//!
//! Tournaments are joined on id. Whether the two users played together is
//! read from the initiator's teammate list only; the target's own list is
//! never consulted, so swapping the two users can change the answer.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat};
use tracing::{debug, info};
use url::Url;

use crate::models::{CommonTournament, Tournament, TournamentId, UNKNOWN_TOURNAMENT_NAME};

/// Results page of a tournament on the site.
pub fn results_url(base_url: &Url, id: TournamentId) -> String {
    format!(
        "{}/to/{}/results",
        base_url.as_str().trim_end_matches('/'),
        id
    )
}

/// RFC 3339 date with millisecond precision, e.g. `2024-03-01T12:00:00.000Z`.
pub fn iso_date(start_time: i64) -> Option<String> {
    DateTime::from_timestamp(start_time, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Tournaments present in both `mine` (the initiator's) and `theirs`.
///
/// Output is ordered by start time, most recent first; undated tournaments
/// sort as timestamp 0 and keep the target's order among equals.
pub fn find_common_tournaments(
    mine: &[Tournament],
    theirs: &[Tournament],
    their_username: &str,
    base_url: &Url,
) -> Vec<CommonTournament> {
    let by_id: HashMap<TournamentId, &Tournament> =
        mine.iter().map(|t| (t.tournament_id, t)).collect();

    let mut shared: Vec<(&Tournament, &Tournament, bool)> = Vec::new();

    for their in theirs {
        let Some(my) = by_id.get(&their.tournament_id).copied() else {
            continue;
        };

        let were_teammates = !my.teammates.is_empty() && my.has_teammate(their_username);

        if were_teammates {
            debug!(
                "Shared tourney {} - {} (teammates #{})",
                my.tournament_id,
                my.event_name.as_deref().unwrap_or("?"),
                placement_label(my.placement)
            );
        } else {
            debug!(
                "Shared tourney {} - {} (you #{}, them #{})",
                my.tournament_id,
                my.event_name.as_deref().unwrap_or("?"),
                placement_label(my.placement),
                placement_label(their.placement)
            );
        }

        shared.push((my, their, were_teammates));
    }

    if shared.is_empty() {
        info!("No shared tourneys with {}", their_username);
        debug!("Sample ids (you): {:?}", sample_ids(mine));
        debug!("Sample ids (them): {:?}", sample_ids(theirs));
    }

    shared.sort_by_key(|(my, _, _)| std::cmp::Reverse(my.start_time.unwrap_or(0)));

    shared
        .into_iter()
        .map(|(my, their, were_teammates)| CommonTournament {
            tournament_id: my.tournament_id,
            tournament_name: my
                .event_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_TOURNAMENT_NAME.to_string()),
            url: results_url(base_url, my.tournament_id),
            date: my.start_time.and_then(iso_date),
            your_placement: my.placement,
            their_placement: their.placement,
            your_division: my.division.clone(),
            their_division: their.division.clone(),
            team_count: my.team_count,
            were_teammates,
        })
        .collect()
}

fn placement_label(placement: Option<u32>) -> String {
    placement.map_or_else(|| "?".to_string(), |p| p.to_string())
}

fn sample_ids(tournaments: &[Tournament]) -> Vec<u32> {
    tournaments
        .iter()
        .take(5)
        .map(|t| t.tournament_id.get())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://sendou.ink").unwrap()
    }

    fn t(id: u32) -> Tournament {
        Tournament::new(TournamentId::new(id))
    }

    #[test]
    fn test_teammates_detected_from_initiator_list() {
        let mine = [t(100).with_placement(1).with_teammate("bob")];
        let theirs = [t(100).with_placement(1)];

        let common = find_common_tournaments(&mine, &theirs, "bob", &base());

        assert_eq!(common.len(), 1);
        assert!(common[0].were_teammates);
        assert_eq!(common[0].your_placement, Some(1));
        assert_eq!(common[0].their_placement, Some(1));
    }

    #[test]
    fn test_teammate_match_ignores_case() {
        let mine = [t(100).with_teammate("bob")];
        let theirs = [t(100)];

        let common = find_common_tournaments(&mine, &theirs, "BOB", &base());
        assert!(common[0].were_teammates);
    }

    #[test]
    fn test_target_teammate_list_is_not_consulted() {
        let mine = [t(100).with_teammate("carol")];
        let theirs = [t(100).with_teammate("me")];

        let common = find_common_tournaments(&mine, &theirs, "bob", &base());
        assert!(!common[0].were_teammates);
    }

    #[test]
    fn test_no_shared_ids() {
        let common = find_common_tournaments(&[t(100)], &[t(200)], "bob", &base());
        assert!(common.is_empty());
    }

    #[test]
    fn test_sorted_most_recent_first_undated_last() {
        let mine = [
            t(1).with_start_time(300),
            t(2),
            t(3).with_start_time(100),
        ];
        let theirs = [t(3), t(2), t(1)];

        let common = find_common_tournaments(&mine, &theirs, "bob", &base());
        let ids: Vec<u32> = common.iter().map(|c| c.tournament_id.get()).collect();

        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(common[2].date, None);
    }

    #[test]
    fn test_fields_merged_from_both_sides() {
        let mine = [t(4242)
            .with_event_name("Picnic")
            .with_start_time(1_709_294_400)
            .with_placement(2)
            .with_team_count(16)
            .with_division("Division A")];
        let theirs = [t(4242).with_placement(9).with_team_count(32).with_division("Division B")];

        let common = find_common_tournaments(&mine, &theirs, "bob", &base());

        assert_eq!(
            common,
            vec![CommonTournament {
                tournament_id: TournamentId::new(4242),
                tournament_name: "Picnic".to_string(),
                url: "https://sendou.ink/to/4242/results".to_string(),
                date: Some("2024-03-01T12:00:00.000Z".to_string()),
                your_placement: Some(2),
                their_placement: Some(9),
                your_division: Some("Division A".to_string()),
                their_division: Some("Division B".to_string()),
                team_count: Some(16),
                were_teammates: false,
            }]
        );
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let common = find_common_tournaments(&[t(100)], &[t(100)], "bob", &base());
        assert_eq!(common[0].tournament_name, UNKNOWN_TOURNAMENT_NAME);
    }

    #[test]
    fn test_results_url_with_trailing_path_slash() {
        let base = Url::parse("https://sendou.ink/").unwrap();
        assert_eq!(
            results_url(&base, TournamentId::new(7)),
            "https://sendou.ink/to/7/results"
        );
    }
}
