// src/experiment.rs

use crate::config::{random_rules, ExperimentConfig};
use crate::domain::ForecastDomain;
use crate::error::Result;
use crate::noise::NoiseSource;
use crate::players::{Player, Strategy};
use crate::results::ResultSink;
use crate::scoring::ScoringRule;
use crate::simulation::Simulation;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::sync::Arc;
use tracing::{debug, info};

/// The rule the market forecast itself is judged by in the result files.
pub const MARKET_RULE: ScoringRule = ScoringRule::Brier;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub rounds: usize,
    pub seed: u64,
    pub mean_market_score: f64,
    /// Sample standard deviation; NaN with fewer than two rounds.
    pub market_score_std_dev: f64,
    /// Mean of `|realized outcome - q|` across rounds.
    pub mean_outcome_gap: f64,
}

/// Sweeps the true probability over its grid and plays one round per value.
/// Players are rebuilt every round with freshly drawn beliefs.
pub struct Experiment {
    config: ExperimentConfig,
    domain: Arc<ForecastDomain>,
    strategy: Strategy,
    weights: Vec<f64>,
    rules: Vec<ScoringRule>,
    grid: Vec<f64>,
    noise: NoiseSource,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let domain = Arc::new(config.forecast_domain()?);
        let strategy = config.strategy()?;
        let grid = config.probability_grid()?;
        let noise = NoiseSource::new(config.noise, config.noise_delta, config.seed)?;
        // Drawn from their own stream so the beliefs match a fixed-rule run.
        let rules = if config.random_rules {
            random_rules(config.n, &mut StdRng::seed_from_u64(noise.seed()))
        } else {
            config.rules()
        };
        Ok(Self {
            weights: config.weights(),
            rules,
            config,
            domain,
            strategy,
            grid,
            noise,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    /// Scoring rule of each player, by index.
    pub fn rules(&self) -> &[ScoringRule] {
        &self.rules
    }

    /// A fresh roster for true probability `q`; one noise draw per player.
    pub fn roster(&mut self, q: f64) -> Vec<Player> {
        (0..self.config.n)
            .map(|i| {
                Player::new(
                    i,
                    self.weights[i],
                    self.rules[i],
                    self.noise.generate(q),
                    self.domain.clone(),
                    self.strategy,
                )
            })
            .collect()
    }

    pub fn run<S: ResultSink + ?Sized>(&mut self, sink: &mut S) -> Result<ExperimentSummary> {
        info!(
            n = self.config.n,
            strategy = %self.strategy,
            delta = self.config.delta,
            delta_q = self.config.delta_q,
            noise = ?self.config.noise,
            noise_delta = self.config.noise_delta,
            rules = ?self.rules,
            seed = self.seed(),
            "executing simulation"
        );
        sink.begin(self.config.n)?;

        let grid = self.grid.clone();
        let mut market_scores = Vec::with_capacity(grid.len());
        let mut outcome_gaps = Vec::with_capacity(grid.len());

        for q in grid {
            let players = self.roster(q);
            let beliefs: Vec<f64> = players.iter().map(|p| p.belief).collect();
            debug!(q, ?beliefs, "simulation step");

            let result = Simulation::new(players)?.run_round(q)?;
            let market_score = result.market_score(MARKET_RULE);
            info!(
                q,
                predictions = ?result.predictions.as_slice(),
                market = result.market_forecast,
                realized = result.realized_outcome,
                "round finished"
            );

            sink.record(q, &result, market_score)?;
            market_scores.push(market_score);
            outcome_gaps.push((result.realized_outcome - q).abs());
        }
        sink.finish()?;

        let summary = ExperimentSummary {
            rounds: market_scores.len(),
            seed: self.seed(),
            mean_market_score: market_scores.iter().mean(),
            market_score_std_dev: market_scores.iter().std_dev(),
            mean_outcome_gap: outcome_gaps.iter().mean(),
        };
        info!(
            rounds = summary.rounds,
            mean_market_score = summary.mean_market_score,
            mean_outcome_gap = summary.mean_outcome_gap,
            "experiment finished"
        );
        Ok(summary)
    }
}
