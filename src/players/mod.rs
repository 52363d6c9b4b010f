// src/players/mod.rs

mod lookahead;
pub mod player;
pub mod player_type;
pub mod strategy;

pub use player::Player;
pub use player_type::PlayerType;
pub use strategy::Strategy;
