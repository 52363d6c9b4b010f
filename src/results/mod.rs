// src/results/mod.rs

//! Where finished rounds go. The engine never writes anything itself; the
//! experiment hands each round to a [`ResultSink`].

pub mod csv;
pub mod json;

pub use csv::CsvResultSink;
pub use json::JsonLinesSink;

use crate::error::Result;
use crate::simulation::RoundResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Two files, scores and predictions, one row per round.
    #[default]
    Csv,
    /// One JSON object per round.
    Json,
}

pub trait ResultSink {
    /// Called once before the first round.
    fn begin(&mut self, players: usize) -> Result<()>;

    fn record(&mut self, q: f64, result: &RoundResult, market_score: f64) -> Result<()>;

    /// Flushes whatever is buffered.
    fn finish(&mut self) -> Result<()>;
}

/// Keeps every round in memory. Handy for tests and for callers that want
/// to post-process results themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub players: usize,
    pub rounds: Vec<(f64, RoundResult, f64)>,
    pub finished: bool,
}

impl ResultSink for MemorySink {
    fn begin(&mut self, players: usize) -> Result<()> {
        self.players = players;
        Ok(())
    }

    fn record(&mut self, q: f64, result: &RoundResult, market_score: f64) -> Result<()> {
        self.rounds.push((q, result.clone(), market_score));
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
