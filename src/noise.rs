// src/noise.rs

use crate::error::ConfigError;
use crate::scoring::round_to;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How a player's private belief is perturbed away from the true probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    #[default]
    Identity,
    Gaussian,
    Uniform,
    Sinusoidal,
    Exponential,
}

// Sampling distribution, built once so a bad spread is caught up front.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Identity,
    Gaussian(Normal<f64>),
    Uniform(f64),
    Sinusoidal(f64),
    Exponential(Option<Exp<f64>>),
}

/// Turns the true probability into each player's private belief.
///
/// Output is clamped to [0, 1] and rounded to two decimals. Runs are
/// repeatable for a given seed.
pub struct NoiseSource {
    kind: NoiseKind,
    shape: Shape,
    seed: u64,
    rng: StdRng,
}

impl NoiseSource {
    /// `seed = None` draws a fresh seed; [`seed`](Self::seed) reports it so
    /// the run can be reproduced.
    pub fn new(kind: NoiseKind, spread: f64, seed: Option<u64>) -> Result<Self, ConfigError> {
        if !spread.is_finite() || spread < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "noise_delta",
                reason: format!("spread must be finite and non-negative, got {spread}"),
            });
        }
        let shape = match kind {
            NoiseKind::Identity => Shape::Identity,
            NoiseKind::Gaussian => Shape::Gaussian(Normal::new(0.0, spread).map_err(|e| {
                ConfigError::InvalidValue {
                    field: "noise_delta",
                    reason: e.to_string(),
                }
            })?),
            NoiseKind::Uniform => Shape::Uniform(spread),
            NoiseKind::Sinusoidal => Shape::Sinusoidal(spread),
            // Exp is parameterised by its rate; a zero scale means no noise at all.
            NoiseKind::Exponential if spread == 0.0 => Shape::Exponential(None),
            NoiseKind::Exponential => Shape::Exponential(Some(Exp::new(1.0 / spread).map_err(
                |e| ConfigError::InvalidValue {
                    field: "noise_delta",
                    reason: e.to_string(),
                },
            )?)),
        };
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..u64::MAX));
        Ok(Self {
            kind,
            shape,
            seed,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A private belief for true probability `q`.
    pub fn generate(&mut self, q: f64) -> f64 {
        let shift = match self.shape {
            Shape::Identity => 0.0,
            Shape::Gaussian(normal) => normal.sample(&mut self.rng),
            Shape::Uniform(spread) => self.rng.gen_range(-spread..=spread),
            Shape::Sinusoidal(spread) => spread * (2.0 * PI * q).sin(),
            Shape::Exponential(Some(exp)) => exp.sample(&mut self.rng),
            Shape::Exponential(None) => 0.0,
        };
        round_to((q + shift).clamp(0.0, 1.0), 2)
    }
}
