// src/players/player_type.rs

use super::strategy::Strategy;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// The strategy family picked on the command line or in a config file.
/// Unlike [`Strategy`] it carries no parameters; the radius is supplied
/// separately and checked when the two are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerType {
    Perfect,
    #[serde(alias = "relaxed", alias = "moving-range")]
    #[value(alias = "relaxed", alias = "moving-range")]
    Bounded,
    Naive,
}

impl PlayerType {
    pub fn strategy(self, radius: Option<usize>) -> Result<Strategy, ConfigError> {
        match self {
            PlayerType::Perfect => Ok(Strategy::PerfectInformation),
            PlayerType::Bounded => radius
                .map(|radius| Strategy::BoundedInformation { radius })
                .ok_or(ConfigError::MissingField { field: "radius" }),
            PlayerType::Naive => Ok(Strategy::Naive),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlayerType::Perfect => "perfect",
            PlayerType::Bounded => "bounded",
            PlayerType::Naive => "naive",
        }
    }
}
