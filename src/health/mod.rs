pub mod calculator;
pub mod engine;
pub mod handler;
pub mod thresholds;
pub mod types;
