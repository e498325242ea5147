//! Shared history orchestration.
//!
//! Coordinates one comparison:
//! 1. Fetch both users' payloads concurrently
//! 2. Extract tournaments from each
//! 3. Compute each history span and the comparison window
//! 4. Join the two lists

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::calculate::{calculate_time_range_months, comparison_window};
use crate::extract::extract_tournaments;
use crate::fetch::{FetchError, HistorySource};
use crate::models::{Comparison, SharedHistory, Tournament};
use crate::reconcile::find_common_tournaments;

/// Which user of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The initiating user
    Own,
    /// The user being compared against
    Target,
}

/// A history could not be loaded. Parsing problems never end up here.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Could not load your tournament history")]
    OwnHistoryUnavailable {
        username: String,
        #[source]
        source: FetchError,
    },

    #[error("Could not load {username}'s tournament history")]
    TargetHistoryUnavailable {
        username: String,
        #[source]
        source: FetchError,
    },
}

impl CompareError {
    pub fn side(&self) -> Side {
        match self {
            CompareError::OwnHistoryUnavailable { .. } => Side::Own,
            CompareError::TargetHistoryUnavailable { .. } => Side::Target,
        }
    }

    /// User whose history failed to load.
    pub fn username(&self) -> &str {
        match self {
            CompareError::OwnHistoryUnavailable { username, .. }
            | CompareError::TargetHistoryUnavailable { username, .. } => username,
        }
    }
}

/// Compares two users' tournament histories.
pub struct HistoryComparer {
    source: Arc<dyn HistorySource>,
    base_url: Url,
}

impl HistoryComparer {
    /// `base_url` is used to build results page links.
    pub fn new(source: Arc<dyn HistorySource>, base_url: Url) -> Self {
        Self { source, base_url }
    }

    /// Fetch and extract one user's tournaments.
    pub async fn load_tournaments(&self, username: &str) -> Result<Vec<Tournament>, FetchError> {
        let pool = self.source.fetch_history(username).await?;
        let tournaments = extract_tournaments(&pool);
        info!(
            "Parsed {} tournaments for {} via {}",
            tournaments.len(),
            username,
            self.source.name()
        );
        Ok(tournaments)
    }

    /// Tournaments `me` and `them` both entered.
    ///
    /// Both histories are fetched concurrently and both must load. An empty
    /// overlap is `SharedHistory::NoneShared`, not an error.
    pub async fn compare(&self, me: &str, them: &str) -> Result<SharedHistory, CompareError> {
        info!("Comparing {} vs {}", me, them);

        let (mine, theirs) = tokio::join!(self.load_tournaments(me), self.load_tournaments(them));

        let mine = mine.map_err(|source| {
            error!("Failed to fetch results for {}: {}", me, source);
            CompareError::OwnHistoryUnavailable {
                username: me.to_string(),
                source,
            }
        })?;
        let theirs = theirs.map_err(|source| {
            error!("Failed to fetch results for {}: {}", them, source);
            CompareError::TargetHistoryUnavailable {
                username: them.to_string(),
                source,
            }
        })?;

        let my_range = calculate_time_range_months(&mine);
        let their_range = calculate_time_range_months(&theirs);
        let window = comparison_window(my_range, their_range);
        info!(
            "History spans: {} {} months, {} {} months; window {} months",
            me, my_range, them, their_range, window
        );

        let matches = find_common_tournaments(&mine, &theirs, them, &self.base_url);
        info!("Found {} shared tourneys", matches.len());

        Ok(SharedHistory::from_comparison(Comparison::new(matches, window)))
    }
}
