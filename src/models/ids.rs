//! Tournament identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a tournament on the results site.
///
/// The join key between two users' histories and the dedup key within one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(u32);

impl TournamentId {
    /// Create a new TournamentId.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw numeric id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TournamentId({})", self.0)
    }
}

impl From<u32> for TournamentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_id_serializes_as_number() {
        let id = TournamentId::new(2345);
        assert_eq!(serde_json::to_string(&id).unwrap(), "2345");

        let parsed: TournamentId = serde_json::from_str("2345").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_tournament_id_display() {
        assert_eq!(format!("{}", TournamentId::from(1001)), "1001");
    }

    #[test]
    fn test_tournament_id_debug() {
        let debug_str = format!("{:?}", TournamentId::new(42));
        assert_eq!(debug_str, "TournamentId(42)");
    }
}
