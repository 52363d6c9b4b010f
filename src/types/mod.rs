// src/types/mod.rs

pub mod prediction;

pub use prediction::PredictionVector;
