//! Rate card: `$ / 1M tokens` per pipeline stage, with tier selection.

use reportpipe_shared::{RatesConfig, Stage, StageRatesConfig, Tier};

/// Input/output rates for one stage, in `$ / 1M tokens`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageRates {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl From<&StageRatesConfig> for StageRates {
    fn from(config: &StageRatesConfig) -> Self {
        Self {
            input_per_mtok: config.input_per_mtok,
            output_per_mtok: config.output_per_mtok,
        }
    }
}

/// Resolved billing rates for all pipeline stages.
///
/// The generation stage is the only tier-sensitive one: on [`Tier::Opus`]
/// its rates are multiplied by `opus_multiplier`. Verification always runs
/// on the small model regardless of tier.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCard {
    pub ingestion: StageRates,
    pub embedding: StageRates,
    pub generation: StageRates,
    pub verification: StageRates,
    pub delivery: StageRates,
    pub opus_multiplier: f64,
}

impl From<&RatesConfig> for RateCard {
    fn from(config: &RatesConfig) -> Self {
        Self {
            ingestion: StageRates::from(&config.ingestion),
            embedding: StageRates::from(&config.embedding),
            generation: StageRates::from(&config.generation),
            verification: StageRates::from(&config.verification),
            delivery: StageRates::from(&config.delivery),
            opus_multiplier: config.opus_multiplier,
        }
    }
}

impl Default for RateCard {
    fn default() -> Self {
        Self::from(&RatesConfig::default())
    }
}

impl RateCard {
    /// Effective rates for a stage at the given tier.
    pub fn for_stage(&self, stage: Stage, tier: Tier) -> StageRates {
        let base = match stage {
            Stage::Ingestion => self.ingestion,
            Stage::Embedding => self.embedding,
            Stage::Generation => self.generation,
            Stage::Verification => self.verification,
            Stage::Delivery => self.delivery,
        };

        match (stage, tier) {
            (Stage::Generation, Tier::Opus) => StageRates {
                input_per_mtok: base.input_per_mtok * self.opus_multiplier,
                output_per_mtok: base.output_per_mtok * self.opus_multiplier,
            },
            _ => base,
        }
    }
}
