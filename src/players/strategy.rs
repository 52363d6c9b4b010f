// src/players/strategy.rs

use serde::{Deserialize, Serialize};

/// How a player models the players who move after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Knows every later player's true belief and solves the whole
    /// remaining game by backward induction.
    PerfectInformation,
    /// Only knows later beliefs to within `radius` grid steps, and keeps the
    /// most favourable scenario inside that neighborhood.
    BoundedInformation { radius: usize },
    /// Assumes every later player submits the same forecast it is weighing.
    Naive,
}

impl Strategy {
    pub fn neighborhood_radius(&self) -> Option<usize> {
        match self {
            Strategy::BoundedInformation { radius } => Some(*radius),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::PerfectInformation => write!(f, "perfect"),
            Strategy::BoundedInformation { radius } => write!(f, "bounded(r={radius})"),
            Strategy::Naive => write!(f, "naive"),
        }
    }
}
