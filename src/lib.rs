//! mrd: partitioned map/reduce engine for mean rate distributions.
//!
//! Context records are split into work units, each unit is turned into
//! per-sub-model (L1, L1, N) arrays by a numeric kernel, and the partials are
//! folded into one array using realization weights.

pub mod bins;
pub mod cli;
pub mod combine;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod imt;
pub mod input;
pub mod kernel;
pub mod logging;
pub mod orchestrator;
pub mod partition;
pub mod store;
pub mod types;
pub mod unit;
pub mod weights;
