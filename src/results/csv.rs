// src/results/csv.rs

use super::ResultSink;
use crate::error::Result;
use crate::scoring::round_to;
use crate::simulation::RoundResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes two comma-separated tables per run:
///
/// - scores: `q, p1..pn, market`
/// - predictions: `q, p1..pn, market, final`
///
/// Probabilities are printed with two decimals, scores with four.
pub struct CsvResultSink<W: Write> {
    scores: W,
    predictions: W,
}

impl CsvResultSink<BufWriter<File>> {
    /// Opens `{label}-scores.csv` and `{label}-predictions.csv` in `dir`,
    /// creating the directory if needed.
    pub fn create(dir: impl AsRef<Path>, label: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let scores = File::create(dir.join(format!("{label}-scores.csv")))?;
        let predictions = File::create(dir.join(format!("{label}-predictions.csv")))?;
        Ok(Self::new(BufWriter::new(scores), BufWriter::new(predictions)))
    }
}

impl<W: Write> CsvResultSink<W> {
    pub fn new(scores: W, predictions: W) -> Self {
        Self {
            scores,
            predictions,
        }
    }

    pub fn into_inner(self) -> (W, W) {
        (self.scores, self.predictions)
    }
}

fn player_columns(players: usize) -> String {
    (1..=players).map(|i| format!(",p{i}")).collect()
}

impl<W: Write> ResultSink for CsvResultSink<W> {
    fn begin(&mut self, players: usize) -> Result<()> {
        let columns = player_columns(players);
        writeln!(self.scores, "q{columns},market")?;
        writeln!(self.predictions, "q{columns},market,final")?;
        Ok(())
    }

    fn record(&mut self, q: f64, result: &RoundResult, market_score: f64) -> Result<()> {
        let mut score_row = format!("{q:.2}");
        for score in &result.scores {
            score_row.push_str(&format!(",{:.4}", round_to(*score, 4)));
        }
        score_row.push_str(&format!(",{market_score:.4}"));
        writeln!(self.scores, "{score_row}")?;

        let mut prediction_row = format!("{q:.2}");
        for forecast in result.predictions.as_slice() {
            prediction_row.push_str(&format!(",{:.2}", round_to(*forecast, 2)));
        }
        prediction_row.push_str(&format!(
            ",{:.2},{:.2}",
            round_to(result.market_forecast, 2),
            round_to(result.realized_outcome, 2)
        ));
        writeln!(self.predictions, "{prediction_row}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.scores.flush()?;
        self.predictions.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PredictionVector;

    fn round() -> RoundResult {
        RoundResult {
            predictions: PredictionVector::from(vec![0.5, 0.25]),
            market_forecast: 0.375,
            realized_outcome: 0.49,
            scores: vec![-0.2501, f64::NEG_INFINITY],
        }
    }

    #[test]
    fn writes_score_and_prediction_tables() {
        let mut sink = CsvResultSink::new(Vec::new(), Vec::new());
        sink.begin(2).unwrap();
        sink.record(0.5, &round(), -0.25).unwrap();
        sink.finish().unwrap();

        let (scores, predictions) = sink.into_inner();
        let scores = String::from_utf8(scores).unwrap();
        let predictions = String::from_utf8(predictions).unwrap();
        assert_eq!(scores, "q,p1,p2,market\n0.50,-0.2501,-inf,-0.2500\n");
        assert_eq!(predictions, "q,p1,p2,market,final\n0.50,0.50,0.25,0.38,0.49\n");
    }

    #[test]
    fn header_grows_with_roster() {
        assert_eq!(player_columns(0), "");
        assert_eq!(player_columns(3), ",p1,p2,p3");
    }
}
