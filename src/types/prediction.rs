// src/types/prediction.rs

use crate::players::Player;
use serde::{Deserialize, Serialize};

/// Forecasts indexed by player index. Entries for players that have not
/// moved yet hold the `0.0` placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionVector(Vec<f64>);

impl PredictionVector {
    /// A vector of `n` placeholders.
    pub fn placeholders(n: usize) -> Self {
        Self(vec![0.0; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn set(&mut self, index: usize, forecast: f64) {
        self.0[index] = forecast;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// `Σ weight_i · prediction_i` over the first `upto` players, summed in
    /// index order from `0.0`. Lookaheads extend this sum in the same order,
    /// so a hypothetical aggregate and the real one agree bit for bit.
    pub fn weighted_sum(&self, players: &[Player], upto: usize) -> f64 {
        players
            .iter()
            .zip(&self.0)
            .take(upto)
            .fold(0.0, |market, (player, forecast)| market + player.weight * forecast)
    }
}

impl From<Vec<f64>> for PredictionVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
