//! Cost model for the research-report pipeline.
//!
//! Computes per-stage billable tokens and USD costs from run telemetry,
//! rolls them up into `cost_estimate_json` documents, and extrapolates
//! monthly projections and Sonnet/Opus tier comparisons.

pub mod billing;
pub mod estimate;
pub mod projection;
pub mod rates;

pub use billing::{billable_tokens, round_usd, stage_cost, tokens_to_usd};
pub use estimate::{estimate_run, load_usage, validate_usage};
pub use projection::{MonthlyProjection, TierComparison, compare_tiers, project_monthly};
pub use rates::{RateCard, StageRates};
