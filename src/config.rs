// src/config.rs

//! Experiment configuration: defaults, file loading and validation.
//!
//! The round engine assumes a validated roster, so everything a user can
//! get wrong is caught here before any player is built.

use crate::domain::ForecastDomain;
use crate::error::ConfigError;
use crate::noise::NoiseKind;
use crate::players::{PlayerType, Strategy};
use crate::results::OutputFormat;
use crate::scoring::ScoringRule;
use crate::simulation::WEIGHT_TOLERANCE;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// --- Defaults ---
pub const DEFAULT_PLAYERS: usize = 4;
pub const DEFAULT_DELTA: f64 = 0.01;
pub const DEFAULT_DELTA_Q: f64 = 0.05;
pub const DEFAULT_NOISE_DELTA: f64 = 0.01;
pub const DEFAULT_OUTPUT_DIR: &str = "results";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Number of players.
    pub n: usize,
    /// Step of the forecast grid.
    pub delta: f64,
    /// Step of the grid of true probabilities swept by the experiment.
    pub delta_q: f64,
    pub player_type: PlayerType,
    /// Neighborhood radius, required for bounded players.
    pub radius: Option<usize>,
    /// Rule for every player unless `rules` is given.
    pub rule: ScoringRule,
    pub rules: Option<Vec<ScoringRule>>,
    /// Draw each player's rule at random from the experiment seed.
    pub random_rules: bool,
    /// Per-player weights; equal weights when absent.
    pub weights: Option<Vec<f64>>,
    pub noise: NoiseKind,
    pub noise_delta: f64,
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n: DEFAULT_PLAYERS,
            delta: DEFAULT_DELTA,
            delta_q: DEFAULT_DELTA_Q,
            player_type: PlayerType::Perfect,
            radius: None,
            rule: ScoringRule::Brier,
            rules: None,
            random_rules: false,
            weights: None,
            noise: NoiseKind::Identity,
            noise_delta: DEFAULT_NOISE_DELTA,
            seed: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Csv,
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Everything the round engine takes for granted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n == 0 {
            return Err(ConfigError::InvalidValue {
                field: "n",
                reason: "at least one player is required".into(),
            });
        }
        self.forecast_domain()?;
        self.probability_grid()?;

        let weights = self.weights();
        if weights.len() != self.n {
            return Err(ConfigError::CountMismatch {
                field: "weights",
                expected: self.n,
                actual: weights.len(),
            });
        }
        if let Some(w) = weights.iter().find(|w| !(**w >= 0.0)) {
            return Err(ConfigError::InvalidValue {
                field: "weights",
                reason: format!("weight {w} is negative"),
            });
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::InvalidValue {
                field: "weights",
                reason: format!("weights sum to {sum}, expected 1 ± {WEIGHT_TOLERANCE}"),
            });
        }

        if let Some(rules) = &self.rules {
            if rules.len() != self.n {
                return Err(ConfigError::CountMismatch {
                    field: "rules",
                    expected: self.n,
                    actual: rules.len(),
                });
            }
            if self.random_rules {
                return Err(ConfigError::InvalidValue {
                    field: "random_rules",
                    reason: "cannot be combined with explicit rules".into(),
                });
            }
        }

        self.strategy()?;

        if !self.noise_delta.is_finite() || self.noise_delta < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "noise_delta",
                reason: format!("must be finite and non-negative, got {}", self.noise_delta),
            });
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.player_type.strategy(self.radius)
    }

    pub fn weights(&self) -> Vec<f64> {
        self.weights.clone().unwrap_or_else(|| equal_weights(self.n))
    }

    pub fn rules(&self) -> Vec<ScoringRule> {
        self.rules
            .clone()
            .unwrap_or_else(|| equal_rules(self.n, self.rule))
    }

    pub fn forecast_domain(&self) -> Result<ForecastDomain, ConfigError> {
        ForecastDomain::with_step(self.delta).map_err(|e| ConfigError::InvalidValue {
            field: "delta",
            reason: e.to_string(),
        })
    }

    /// The true probabilities swept by an experiment: `0, delta_q, .., 1`.
    pub fn probability_grid(&self) -> Result<Vec<f64>, ConfigError> {
        ForecastDomain::with_step(self.delta_q)
            .map(|grid| grid.values().to_vec())
            .map_err(|e| ConfigError::InvalidValue {
                field: "delta_q",
                reason: e.to_string(),
            })
    }

    /// Stem shared by every output file of a run.
    pub fn run_label(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.player_type.name(),
            self.n,
            self.delta,
            self.delta_q
        )
    }
}

pub fn equal_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

pub fn equal_rules(n: usize, rule: ScoringRule) -> Vec<ScoringRule> {
    vec![rule; n]
}

pub fn random_rules<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<ScoringRule> {
    (0..n).map(|_| ScoringRule::random(rng)).collect()
}
