// src/players/player.rs

use super::lookahead::Lookahead;
use super::strategy::Strategy;
use crate::domain::ForecastDomain;
use crate::error::SimulationError;
use crate::scoring::ScoringRule;
use crate::types::PredictionVector;
use std::sync::Arc;
use tracing::trace;

/// One participant of the market.
///
/// A player is built once per round and never changes while the round runs.
/// Hypothetical beliefs used during lookahead are passed around as values,
/// so predicting never touches any player's `belief`.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub index: usize,
    pub weight: f64,
    pub rule: ScoringRule,
    pub belief: f64,
    pub strategy: Strategy,
    domain: Arc<ForecastDomain>,
}

impl Player {
    pub fn new(
        index: usize,
        weight: f64,
        rule: ScoringRule,
        belief: f64,
        domain: Arc<ForecastDomain>,
        strategy: Strategy,
    ) -> Self {
        Self {
            index,
            weight,
            rule,
            belief,
            strategy,
            domain,
        }
    }

    pub fn domain(&self) -> &ForecastDomain {
        &self.domain
    }

    pub fn neighborhood_radius(&self) -> Option<usize> {
        self.strategy.neighborhood_radius()
    }

    /// Picks this player's forecast given the forecasts already submitted.
    ///
    /// `predictions` must have one entry per player; entries below this
    /// player's index are final, the rest are placeholders and are ignored.
    pub fn predict(
        &self,
        players: &[Player],
        predictions: &PredictionVector,
    ) -> Result<f64, SimulationError> {
        if players.is_empty() {
            return Err(SimulationError::NoPlayers);
        }
        if self.index >= players.len() {
            return Err(SimulationError::IndexOutOfRange {
                index: self.index,
                len: players.len(),
            });
        }
        if predictions.len() != players.len() {
            return Err(SimulationError::PredictionLength {
                expected: players.len(),
                actual: predictions.len(),
            });
        }

        let prefix = predictions.weighted_sum(players, self.index);
        let mut lookahead = Lookahead::new(players);
        let forecast = lookahead.decide(self, prefix);
        trace!(
            player = self.index,
            cached_responses = lookahead.cached_responses(),
            "lookahead finished"
        );
        Ok(forecast)
    }
}
