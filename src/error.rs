// src/error.rs

use thiserror::Error;

/// Problems building a forecast grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("forecast domain is empty")]
    Empty,

    #[error("step {step} does not evenly divide [0, 1]")]
    InvalidStep { step: f64 },

    #[error("forecast domain is not strictly ascending at position {position}")]
    Unsorted { position: usize },

    #[error("forecast domain must start at 0 and end at 1, got [{first}, {last}]")]
    MissingBounds { first: f64, last: f64 },
}

/// Problems detected while setting up or running a round.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("a round needs at least one player")]
    NoPlayers,

    #[error("player at position {position} reports index {index}")]
    IndexMismatch { position: usize, index: usize },

    #[error("player index {index} is out of range for {len} players")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("prediction vector has {actual} entries, expected {expected}")]
    PredictionLength { expected: usize, actual: usize },

    #[error("player {index} has negative weight {weight}")]
    NegativeWeight { index: usize, weight: f64 },

    #[error("weights sum to {sum}, expected 1 within {tolerance}")]
    WeightSum { sum: f64, tolerance: f64 },

    #[error("probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { value: f64 },

    #[error("player {index} has a domain of {actual} points, expected {expected}")]
    DomainMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Experiment configuration errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{field} has {actual} entries, expected {expected}")]
    CountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("result sink failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode round: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
