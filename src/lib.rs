// src/lib.rs

// === 1. Declare all the top-level modules ===
pub mod config;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod noise;
pub mod players;
pub mod results;
pub mod scoring;
pub mod simulation;
pub mod types;

// === 2. Re-export the public-facing components to create a clean API ===

// --- From `players` ---
pub use players::{Player, PlayerType, Strategy};

// --- From the round engine ---
pub use simulation::{RoundResult, Simulation, WEIGHT_TOLERANCE};

// --- From `scoring` ---
pub use scoring::{outcome_blend, ScoringRule, MARKET_IMPACT};

// --- Collaborators around the engine ---
pub use config::ExperimentConfig;
pub use domain::ForecastDomain;
pub use experiment::{Experiment, ExperimentSummary};
pub use noise::{NoiseKind, NoiseSource};
pub use results::{CsvResultSink, JsonLinesSink, OutputFormat, ResultSink};

// --- From `types` ---
pub use types::PredictionVector;

pub use error::{ConfigError, DomainError, Error, Result, SimulationError};
