//! Monthly cost projections and Sonnet/Opus tier comparison.

use serde::{Deserialize, Serialize};

use reportpipe_shared::{CostEstimate, Result, RunUsage, Tier};

use crate::billing::round_usd;
use crate::estimate::estimate_run;
use crate::rates::RateCard;

/// A run cost extrapolated over a month: `monthly = runs_per_month * run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub tier: Tier,
    pub runs_per_month: u32,
    pub run_token_count: u64,
    pub run_cost_usd: f64,
    pub monthly_token_count: u64,
    pub monthly_cost_usd: f64,
}

/// Extrapolate a single-run estimate to a monthly cost.
pub fn project_monthly(estimate: &CostEstimate, runs_per_month: u32) -> MonthlyProjection {
    MonthlyProjection {
        tier: estimate.tier,
        runs_per_month,
        run_token_count: estimate.total_token_count,
        run_cost_usd: estimate.total_estimated_cost_usd,
        monthly_token_count: estimate.total_token_count * u64::from(runs_per_month),
        monthly_cost_usd: round_usd(
            f64::from(runs_per_month) * estimate.total_estimated_cost_usd,
        ),
    }
}

/// The same usage priced at both tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierComparison {
    pub sonnet: CostEstimate,
    pub opus: CostEstimate,
}

impl TierComparison {
    /// Extra USD per run for choosing Opus over Sonnet.
    pub fn delta_usd(&self) -> f64 {
        round_usd(self.opus.total_estimated_cost_usd - self.sonnet.total_estimated_cost_usd)
    }
}

/// Price one run's usage at both tiers.
pub fn compare_tiers(usage: &RunUsage, rates: &RateCard) -> Result<TierComparison> {
    Ok(TierComparison {
        sonnet: estimate_run(usage, rates, Tier::Sonnet)?,
        opus: estimate_run(usage, rates, Tier::Opus)?,
    })
}
