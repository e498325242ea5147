//! Tournament extraction from a resolved payload.
//!
//! Record objects carry no usable field names, so each resolved property
//! value is classified by shape alone. The rules live in [`RULES`] and are
//! tried in order; the first rule whose predicate matches and whose target
//! field is still open claims the value. Fields are never overwritten.

use std::collections::{BTreeSet, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::models::{Tournament, TournamentId};
use crate::payload::Pool;

/// Record attribute a value can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TournamentId,
    Placement,
    TeamCount,
    StartTime,
    Teammates,
    Division,
    EventName,
    LogoUrl,
}

/// One shape heuristic: values matching `matches` go to `field`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub field: Field,
    pub matches: fn(&Value) -> bool,
}

/// Classification rules, in priority order.
///
/// Placement precedes team count: the producer emits placement first, so
/// the first small number is the rank and the second the division size.
pub const RULES: &[Rule] = &[
    Rule {
        field: Field::TournamentId,
        matches: is_tournament_id,
    },
    Rule {
        field: Field::Placement,
        matches: is_small_count,
    },
    Rule {
        field: Field::TeamCount,
        matches: is_small_count,
    },
    Rule {
        field: Field::StartTime,
        matches: is_timestamp,
    },
    Rule {
        field: Field::Teammates,
        matches: Value::is_array,
    },
    Rule {
        field: Field::Division,
        matches: is_division,
    },
    Rule {
        field: Field::EventName,
        matches: is_event_name,
    },
    Rule {
        field: Field::LogoUrl,
        matches: is_logo_url,
    },
];

/// Integral numeric value, if any.
fn integral(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}

fn in_open_range(value: &Value, low: i64, high: i64) -> bool {
    integral(value).is_some_and(|n| n > low && n < high)
}

pub fn is_tournament_id(value: &Value) -> bool {
    in_open_range(value, 1000, 10_000)
}

/// Placement or team count.
pub fn is_small_count(value: &Value) -> bool {
    in_open_range(value, 0, 200)
}

/// Unix seconds between late 2023 and 2033.
pub fn is_timestamp(value: &Value) -> bool {
    in_open_range(value, 1_700_000_000, 2_000_000_000)
}

pub fn is_division(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.starts_with("Division") && s.chars().count() < 20)
}

pub fn is_event_name(value: &Value) -> bool {
    value.as_str().is_some_and(|s| {
        let len = s.chars().count();
        len > 3 && len < 100 && !s.contains("http") && !s.contains('/') && !s.contains('.')
    })
}

pub fn is_logo_url(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.contains("http") && (s.contains("logo") || s.contains("tournament")))
}

/// Username-like string inside a teammate object.
pub fn is_teammate_name(s: &str) -> bool {
    let len = s.chars().count();
    (3..=30).contains(&len)
        && !s.contains("http")
        && !s.contains('@')
        && !s.contains('.')
        && !s.contains('/')
}

/// Partially classified record.
#[derive(Debug, Default)]
struct RecordDraft {
    tournament_id: Option<u32>,
    event_name: Option<String>,
    start_time: Option<i64>,
    placement: Option<u32>,
    team_count: Option<u32>,
    division: Option<String>,
    logo_url: Option<String>,
    teammates: BTreeSet<String>,
}

impl RecordDraft {
    /// Whether `field` can still take a value.
    fn is_open(&self, field: Field) -> bool {
        match field {
            Field::TournamentId => self.tournament_id.is_none(),
            Field::Placement => self.placement.is_none(),
            Field::TeamCount => self.placement.is_some() && self.team_count.is_none(),
            Field::StartTime => self.start_time.is_none(),
            Field::Teammates => self.teammates.is_empty(),
            Field::Division => self.division.is_none(),
            Field::EventName => self.event_name.is_none(),
            Field::LogoUrl => self.logo_url.is_none(),
        }
    }

    /// Store `value` in `field`. Predicates have already vetted the shape.
    fn assign(&mut self, field: Field, value: &Value, pool: &Pool) {
        let small = || integral(value).and_then(|n| u32::try_from(n).ok());
        let text = || value.as_str().map(str::to_string);

        match field {
            Field::TournamentId => self.tournament_id = small(),
            Field::Placement => self.placement = small(),
            Field::TeamCount => self.team_count = small(),
            Field::StartTime => self.start_time = integral(value),
            Field::Teammates => {
                if let Value::Array(mates) = value {
                    self.teammates = collect_teammates(pool, mates);
                }
            }
            Field::Division => self.division = text(),
            Field::EventName => self.event_name = text(),
            Field::LogoUrl => self.logo_url = text(),
        }
    }

    fn classify(&mut self, value: &Value, pool: &Pool) {
        let rule = RULES
            .iter()
            .find(|rule| (rule.matches)(value) && self.is_open(rule.field));

        if let Some(rule) = rule {
            self.assign(rule.field, value, pool);
        }
    }

    fn finish(self) -> Option<Tournament> {
        let id = self.tournament_id?;
        Some(Tournament {
            tournament_id: TournamentId::new(id),
            event_name: self.event_name,
            start_time: self.start_time,
            placement: self.placement,
            team_count: self.team_count,
            division: self.division,
            logo_url: self.logo_url,
            teammates: self.teammates,
        })
    }
}

/// Usernames found in the objects of a candidate teammate array.
fn collect_teammates(pool: &Pool, mates: &[Value]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();

    for mate in mates {
        let Value::Object(fields) = pool.resolve(mate) else {
            continue;
        };
        for raw in fields.values() {
            if let Some(name) = pool.resolve(raw).as_str() {
                if is_teammate_name(name) {
                    names.insert(name.to_lowercase());
                }
            }
        }
    }

    names
}

/// Classify one record object. `None` if no tournament id was recognised.
pub fn classify_record(pool: &Pool, record: &Map<String, Value>) -> Option<Tournament> {
    let mut draft = RecordDraft::default();

    for raw in record.values() {
        draft.classify(pool.resolve(raw), pool);
    }

    draft.finish()
}

/// Extract every tournament from every record block of `pool`.
///
/// The first record seen for an id wins, across all blocks.
pub fn extract_tournaments(pool: &Pool) -> Vec<Tournament> {
    let mut results = Vec::new();
    let mut seen_ids = HashSet::new();

    for block in pool.record_blocks() {
        let mut from_block = 0;

        for reference in block {
            let Value::Object(record) = pool.resolve(reference) else {
                continue;
            };
            let Some(tournament) = classify_record(pool, record) else {
                continue;
            };
            if seen_ids.insert(tournament.tournament_id) {
                results.push(tournament);
                from_block += 1;
            }
        }

        debug!(
            "Parsed {} unique tournaments from block of {} items",
            from_block,
            block.len()
        );
    }

    if results.is_empty() && !pool.is_empty() {
        info!(
            "No tournaments parsed from payload of {} values",
            pool.len()
        );
    }

    results
}
