// src/bin/simulate.rs

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use prediction_market::{
    CsvResultSink, Experiment, ExperimentConfig, JsonLinesSink, NoiseKind, OutputFormat,
    PlayerType, ScoringRule,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Run the prediction market simulation.
#[derive(Parser, Debug)]
#[command(name = "simulate", version, about, long_about = None)]
struct Cli {
    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of players
    #[arg(long)]
    n: Option<usize>,

    /// Type of player to instantiate
    #[arg(long, alias = "player_type", value_enum)]
    player_type: Option<PlayerType>,

    /// Neighborhood radius for bounded-information players
    #[arg(long)]
    radius: Option<usize>,

    /// Noise function used to derive private beliefs
    #[arg(long, value_enum)]
    noise: Option<NoiseKind>,

    /// Spread of the noise function
    #[arg(long, alias = "noise_delta")]
    noise_delta: Option<f64>,

    /// Step of the forecast grid
    #[arg(long)]
    delta: Option<f64>,

    /// Step of the true-probability grid
    #[arg(long, alias = "delta_q")]
    delta_q: Option<f64>,

    /// Scoring rule for every player
    #[arg(long, value_enum)]
    rule: Option<ScoringRule>,

    /// Draw each player's scoring rule at random from the seed
    #[arg(long, alias = "random_rules")]
    random_rules: bool,

    /// Seed for the noise source
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for result files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

impl Cli {
    fn apply(&self, config: &mut ExperimentConfig) {
        if let Some(n) = self.n {
            config.n = n;
        }
        if let Some(player_type) = self.player_type {
            config.player_type = player_type;
        }
        if self.radius.is_some() {
            config.radius = self.radius;
        }
        if let Some(noise) = self.noise {
            config.noise = noise;
        }
        if let Some(noise_delta) = self.noise_delta {
            config.noise_delta = noise_delta;
        }
        if let Some(delta) = self.delta {
            config.delta = delta;
        }
        if let Some(delta_q) = self.delta_q {
            config.delta_q = delta_q;
        }
        if let Some(rule) = self.rule {
            config.rule = rule;
            config.rules = None;
        }
        if self.random_rules {
            config.random_rules = true;
            config.rules = None;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => fmt().with_env_filter(filter).init(),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    cli.apply(&mut config);

    let label = config.run_label();
    let start = Instant::now();
    let mut experiment = Experiment::new(config.clone()).context("invalid configuration")?;

    let summary = match config.format {
        OutputFormat::Csv => {
            let mut sink = CsvResultSink::create(&config.output_dir, &label)?;
            experiment.run(&mut sink)?
        }
        OutputFormat::Json => {
            let mut sink = JsonLinesSink::create(&config.output_dir, &label)?;
            experiment.run(&mut sink)?
        }
    };

    info!(
        output_dir = %config.output_dir.display(),
        label = %label,
        seed = summary.seed,
        "results written"
    );
    println!("Execution time: {:.2} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    if let Err(e) = run(&cli) {
        error!(error = %e, "simulation failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
