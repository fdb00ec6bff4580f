//! Shared types, error model, and configuration for reportpipe.
//!
//! This crate is the foundation depended on by all other reportpipe crates.
//! It provides:
//! - [`ReportPipeError`] — the unified error type
//! - Domain types ([`RunUsage`], [`CostEstimate`], [`Stage`], [`Tier`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, RatesConfig, StageRatesConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_rates,
};
pub use error::{ReportPipeError, Result};
pub use types::{
    CURRENT_SCHEMA_VERSION, CostEstimate, RunId, RunUsage, Stage, StageCost, StageCosts,
    StageUsage, Tier, UsageStages,
};
