pub mod config;
pub mod error;
pub mod health;
pub mod journal;
pub mod metrics;
pub mod web;
