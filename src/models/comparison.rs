//! Reconciliation output: tournaments two users both entered.

use serde::{Deserialize, Serialize};

use super::TournamentId;

/// Name shown when the payload carried no recognisable event name.
pub const UNKNOWN_TOURNAMENT_NAME: &str = "Unknown Tournament";

/// A tournament present in both users' histories.
///
/// "Your" fields come from the initiating user, "their" fields from the
/// target user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonTournament {
    pub tournament_id: TournamentId,

    pub tournament_name: String,

    /// Results page on the site
    pub url: String,

    /// RFC 3339 start date, millisecond precision, UTC
    pub date: Option<String>,

    pub your_placement: Option<u32>,
    pub their_placement: Option<u32>,
    pub your_division: Option<String>,
    pub their_division: Option<String>,

    /// Teams in the initiator's division
    pub team_count: Option<u32>,

    pub were_teammates: bool,
}

impl CommonTournament {
    /// Division to show for a shared team: the initiator's, else the target's.
    pub fn shared_division(&self) -> Option<&str> {
        self.your_division
            .as_deref()
            .or(self.their_division.as_deref())
    }
}

/// Shared tournaments plus the comparison window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Most recent first
    pub matches: Vec<CommonTournament>,

    pub total_common: usize,

    /// Shorter of the two users' history spans, capped at 12 months.
    /// Informational only; no tournament is filtered by it.
    pub time_range_months: u32,
}

impl Comparison {
    pub fn new(matches: Vec<CommonTournament>, time_range_months: u32) -> Self {
        Self {
            total_common: matches.len(),
            matches,
            time_range_months,
        }
    }

    /// Header line, e.g. "3 shared tourneys in the last 1 month".
    pub fn headline(&self) -> String {
        let tourneys = if self.total_common == 1 {
            "shared tourney"
        } else {
            "shared tourneys"
        };
        let months = if self.time_range_months == 1 {
            "month"
        } else {
            "months"
        };
        format!(
            "{} {} in the last {} {}",
            self.total_common, tourneys, self.time_range_months, months
        )
    }
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SharedHistory {
    /// At least one tournament in common
    Found(Comparison),

    /// Both histories loaded, no identifier overlap
    NoneShared {
        #[serde(rename = "timeRangeMonths")]
        time_range_months: u32,
    },
}

impl SharedHistory {
    /// Wrap a comparison, mapping an empty match list to `NoneShared`.
    pub fn from_comparison(comparison: Comparison) -> Self {
        if comparison.matches.is_empty() {
            SharedHistory::NoneShared {
                time_range_months: comparison.time_range_months,
            }
        } else {
            SharedHistory::Found(comparison)
        }
    }

    pub fn matches(&self) -> &[CommonTournament] {
        match self {
            SharedHistory::Found(c) => &c.matches,
            SharedHistory::NoneShared { .. } => &[],
        }
    }

    pub fn time_range_months(&self) -> u32 {
        match self {
            SharedHistory::Found(c) => c.time_range_months,
            SharedHistory::NoneShared { time_range_months } => *time_range_months,
        }
    }
}
