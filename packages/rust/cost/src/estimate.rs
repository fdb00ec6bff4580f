//! Run cost estimation: telemetry in, `cost_estimate_json` out.

use std::path::Path;

use chrono::Utc;
use reportpipe_shared::{
    CURRENT_SCHEMA_VERSION, CostEstimate, ReportPipeError, Result, RunUsage, Stage, StageCosts,
    Tier,
};
use tracing::debug;

use crate::billing::{self, round_usd};
use crate::rates::RateCard;

/// Load and validate run telemetry from a JSON file.
pub fn load_usage(path: &Path) -> Result<RunUsage> {
    let content = std::fs::read_to_string(path).map_err(|e| ReportPipeError::io(path, e))?;

    let usage: RunUsage = serde_json::from_str(&content).map_err(|e| {
        ReportPipeError::validation(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_usage(&usage)?;
    debug!(path = %path.display(), schema_version = usage.schema_version, "loaded run telemetry");
    Ok(usage)
}

/// Validate a telemetry document: schema version gating and per-stage ranges.
pub fn validate_usage(usage: &RunUsage) -> Result<()> {
    if usage.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(ReportPipeError::validation(format!(
            "schema_version {} not supported (current is {CURRENT_SCHEMA_VERSION})",
            usage.schema_version
        )));
    }

    for stage in Stage::ALL {
        let ratio = usage.stages.get(stage).cache_hit_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ReportPipeError::validation(format!(
                "stage {stage}: cache_hit_ratio {ratio} out of range [0, 1]"
            )));
        }
    }

    Ok(())
}

/// Compute the cost estimate for one run at the given tier.
pub fn estimate_run(usage: &RunUsage, rates: &RateCard, tier: Tier) -> Result<CostEstimate> {
    validate_usage(usage)?;

    let mut stages = StageCosts::default();
    let mut total_token_count: u64 = 0;
    let mut total_cost: f64 = 0.0;

    for stage in Stage::ALL {
        let stage_rates = rates.for_stage(stage, tier);
        let cost = billing::stage_cost(usage.stages.get(stage), &stage_rates)?;

        total_token_count += cost.token_count;
        total_cost += cost.estimated_cost_usd;
        *stages.get_mut(stage) = cost;
    }

    debug!(
        %tier,
        total_token_count,
        total_cost_usd = total_cost,
        "computed run estimate"
    );

    Ok(CostEstimate {
        schema_version: CURRENT_SCHEMA_VERSION,
        run_id: usage.run_id.clone(),
        tier,
        generated_at: Utc::now(),
        stages,
        total_token_count,
        total_estimated_cost_usd: round_usd(total_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportpipe_shared::StageUsage;

    const EPS: f64 = 1e-9;

    fn usage_with(stage: Stage, stage_usage: StageUsage) -> RunUsage {
        let mut usage = RunUsage {
            schema_version: CURRENT_SCHEMA_VERSION,
            run_id: None,
            stages: Default::default(),
        };
        *usage.stages.get_mut(stage) = stage_usage;
        usage
    }

    #[test]
    fn embedding_acceptance_numbers() {
        let usage = usage_with(
            Stage::Embedding,
            StageUsage {
                input_tokens: 2_000_000,
                cache_hit_ratio: 0.40,
                output_tokens: 0,
            },
        );

        let estimate =
            estimate_run(&usage, &RateCard::default(), Tier::Sonnet).expect("estimate");
        assert_eq!(estimate.stages.embedding.token_count, 1_200_000);
        assert!((estimate.stages.embedding.estimated_cost_usd - 0.024).abs() < EPS);
        assert!((estimate.total_estimated_cost_usd - 0.024).abs() < EPS);
    }

    #[test]
    fn generation_sonnet_acceptance_numbers() {
        let usage = usage_with(
            Stage::Generation,
            StageUsage {
                input_tokens: 1_200_000,
                cache_hit_ratio: 0.25,
                output_tokens: 220_000,
            },
        );

        let estimate =
            estimate_run(&usage, &RateCard::default(), Tier::Sonnet).expect("estimate");
        assert_eq!(estimate.stages.generation.token_count, 1_120_000);
        assert!((estimate.stages.generation.estimated_cost_usd - 6.00).abs() < EPS);
    }

    #[test]
    fn opus_generation_costs_exactly_five_times_sonnet() {
        let usage = usage_with(
            Stage::Generation,
            StageUsage {
                input_tokens: 1_200_000,
                cache_hit_ratio: 0.25,
                output_tokens: 220_000,
            },
        );
        let rates = RateCard::default();

        let sonnet = estimate_run(&usage, &rates, Tier::Sonnet).expect("sonnet");
        let opus = estimate_run(&usage, &rates, Tier::Opus).expect("opus");

        assert!(
            (opus.stages.generation.estimated_cost_usd
                - sonnet.stages.generation.estimated_cost_usd * 5.0)
                .abs()
                < EPS
        );
        // Billable token counts are tier-independent.
        assert_eq!(
            opus.stages.generation.token_count,
            sonnet.stages.generation.token_count
        );
    }

    #[test]
    fn totals_are_sums_of_stage_values() {
        let mut usage = usage_with(
            Stage::Generation,
            StageUsage {
                input_tokens: 1_200_000,
                cache_hit_ratio: 0.25,
                output_tokens: 220_000,
            },
        );
        usage.stages.ingestion = StageUsage {
            input_tokens: 3_500_000,
            cache_hit_ratio: 0.2,
            output_tokens: 0,
        };
        usage.stages.embedding = StageUsage {
            input_tokens: 2_000_000,
            cache_hit_ratio: 0.40,
            output_tokens: 0,
        };

        let estimate =
            estimate_run(&usage, &RateCard::default(), Tier::Sonnet).expect("estimate");

        let token_sum: u64 = Stage::ALL
            .iter()
            .map(|s| estimate.stages.get(*s).token_count)
            .sum();
        let cost_sum: f64 = Stage::ALL
            .iter()
            .map(|s| estimate.stages.get(*s).estimated_cost_usd)
            .sum();

        assert_eq!(estimate.total_token_count, token_sum);
        assert!((estimate.total_estimated_cost_usd - cost_sum).abs() < EPS);
        // Ingestion tokens are counted but not billed.
        assert_eq!(estimate.stages.ingestion.token_count, 2_800_000);
        assert_eq!(estimate.stages.ingestion.estimated_cost_usd, 0.0);
    }

    #[test]
    fn future_schema_version_rejected() {
        let mut usage = usage_with(Stage::Embedding, StageUsage::default());
        usage.schema_version = 99;

        let err = estimate_run(&usage, &RateCard::default(), Tier::Sonnet).unwrap_err();
        assert!(err.to_string().contains("schema_version 99 not supported"));
    }

    #[test]
    fn usage_fixture_estimates_match_estimate_fixture() {
        let usage = load_usage(Path::new("../../../fixtures/json/usage.fixture.json"))
            .expect("load usage fixture");
        let estimate =
            estimate_run(&usage, &RateCard::default(), Tier::Sonnet).expect("estimate");

        let fixture = std::fs::read_to_string("../../../fixtures/json/cost_estimate.fixture.json")
            .expect("read estimate fixture");
        let expected: CostEstimate =
            serde_json::from_str(&fixture).expect("deserialize estimate fixture");

        assert_eq!(estimate.run_id, expected.run_id);
        assert_eq!(estimate.total_token_count, expected.total_token_count);
        for stage in Stage::ALL {
            let got = estimate.stages.get(stage);
            let want = expected.stages.get(stage);
            assert_eq!(got.token_count, want.token_count, "tokens for {stage}");
            assert!(
                (got.estimated_cost_usd - want.estimated_cost_usd).abs() < EPS,
                "cost for {stage}"
            );
        }
        assert!(
            (estimate.total_estimated_cost_usd - expected.total_estimated_cost_usd).abs() < EPS
        );
    }
}
