//! Scoring strategy domain
//!
//! The scoring strategy supplies every number the pipelines compare against
//! their thresholds. Each pipeline injects a concrete strategy at construction.

mod strategy;
pub mod text;

pub use strategy::ScoringStrategy;

#[cfg(test)]
pub use strategy::mock::MockScoringStrategy;
