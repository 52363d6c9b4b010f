// src/results/json.rs

use super::ResultSink;
use crate::error::Result;
use crate::simulation::RoundResult;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct RoundRecord<'a> {
    q: f64,
    players: usize,
    predictions: &'a [f64],
    market_forecast: f64,
    realized_outcome: f64,
    // -inf log scores come out as null; JSON has no infinity.
    scores: &'a [f64],
    market_score: f64,
}

/// One JSON object per line, one line per round.
pub struct JsonLinesSink<W: Write> {
    out: W,
    players: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(dir: impl AsRef<Path>, label: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let file = File::create(dir.join(format!("{label}.jsonl")))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, players: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn begin(&mut self, players: usize) -> Result<()> {
        self.players = players;
        Ok(())
    }

    fn record(&mut self, q: f64, result: &RoundResult, market_score: f64) -> Result<()> {
        let record = RoundRecord {
            q,
            players: self.players,
            predictions: result.predictions.as_slice(),
            market_forecast: result.market_forecast,
            realized_outcome: result.realized_outcome,
            scores: &result.scores,
            market_score,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
