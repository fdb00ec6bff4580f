//! Billing arithmetic: cache-discounted billable tokens and USD costs.

use reportpipe_shared::{ReportPipeError, Result, StageCost, StageUsage};

use crate::rates::StageRates;

/// Tokens per billing unit (rates are quoted in `$ / 1M tokens`).
const TOKENS_PER_MTOK: f64 = 1_000_000.0;

/// Billable tokens after the cache-hit discount:
/// `billable = raw * (1 - hit_ratio)`.
///
/// Errors unless `hit_ratio` is in `[0, 1]`; out-of-range ratios indicate
/// corrupted telemetry and are never clamped.
pub fn billable_tokens(raw_tokens: u64, hit_ratio: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&hit_ratio) {
        return Err(ReportPipeError::validation(format!(
            "cache_hit_ratio {hit_ratio} out of range [0, 1]"
        )));
    }
    Ok(raw_tokens as f64 * (1.0 - hit_ratio))
}

/// Convert a billable token count to USD at the given rate.
pub fn tokens_to_usd(billable: f64, rate_per_mtok: f64) -> f64 {
    billable / TOKENS_PER_MTOK * rate_per_mtok
}

/// Round a USD amount to micro-dollar precision for reporting.
pub fn round_usd(amount: f64) -> f64 {
    (amount * 1e6).round() / 1e6
}

/// Compute one stage's billable tokens and cost.
///
/// The cache discount applies to input tokens only; output tokens are billed
/// in full. `token_count` is the total billable count rounded to whole tokens.
pub fn stage_cost(usage: &StageUsage, rates: &StageRates) -> Result<StageCost> {
    let billable_in = billable_tokens(usage.input_tokens, usage.cache_hit_ratio)?;
    let billable_out = usage.output_tokens as f64;

    let cost = tokens_to_usd(billable_in, rates.input_per_mtok)
        + tokens_to_usd(billable_out, rates.output_per_mtok);

    Ok(StageCost {
        token_count: (billable_in + billable_out).round() as u64,
        estimated_cost_usd: round_usd(cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn billable_equals_raw_at_zero_hit_ratio() {
        assert_eq!(billable_tokens(0, 0.0).expect("billable"), 0.0);
        assert_eq!(
            billable_tokens(2_000_000, 0.0).expect("billable"),
            2_000_000.0
        );
    }

    #[test]
    fn billable_monotonically_non_increasing_in_hit_ratio() {
        let raw = 1_234_567;
        let mut previous = f64::INFINITY;
        for step in 0..=20 {
            let h = step as f64 / 20.0;
            let billable = billable_tokens(raw, h).expect("billable");
            assert!(billable <= previous, "billable increased at h={h}");
            previous = billable;
        }
        assert!(billable_tokens(raw, 1.0).expect("billable").abs() < EPS);
    }

    #[test]
    fn out_of_range_hit_ratio_rejected() {
        assert!(billable_tokens(100, -0.1).is_err());
        assert!(billable_tokens(100, 1.1).is_err());
        let err = billable_tokens(100, 2.0).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn stage_cost_discounts_input_and_bills_output_in_full() {
        let usage = StageUsage {
            input_tokens: 1_200_000,
            cache_hit_ratio: 0.25,
            output_tokens: 220_000,
        };
        let rates = StageRates {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        };

        let cost = stage_cost(&usage, &rates).expect("stage cost");
        assert_eq!(cost.token_count, 1_120_000);
        assert!((cost.estimated_cost_usd - 6.00).abs() < EPS);
    }

    #[test]
    fn zero_rate_stage_costs_nothing() {
        let usage = StageUsage {
            input_tokens: 3_500_000,
            cache_hit_ratio: 0.2,
            output_tokens: 0,
        };
        let rates = StageRates {
            input_per_mtok: 0.0,
            output_per_mtok: 0.0,
        };

        let cost = stage_cost(&usage, &rates).expect("stage cost");
        assert_eq!(cost.token_count, 2_800_000);
        assert_eq!(cost.estimated_cost_usd, 0.0);
    }

    #[test]
    fn round_usd_micro_dollar_precision() {
        assert_eq!(round_usd(6.000000000000001), 6.0);
        assert_eq!(round_usd(0.0239999999999), 0.024);
        assert_eq!(round_usd(0.0000004), 0.0);
    }
}
