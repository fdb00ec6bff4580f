//! Core domain types for reportpipe: pipeline stages, billing tiers, run
//! telemetry, and cost estimate documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for telemetry and cost estimate documents.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The five pipeline stages that incur token usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingestion,
    Embedding,
    Generation,
    Verification,
    Delivery,
}

impl Stage {
    /// All stages, in pipeline execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Ingestion,
        Stage::Embedding,
        Stage::Generation,
        Stage::Verification,
        Stage::Delivery,
    ];

    /// Lowercase stage name as used in telemetry and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingestion => "ingestion",
            Stage::Embedding => "embedding",
            Stage::Generation => "generation",
            Stage::Verification => "verification",
            Stage::Delivery => "delivery",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ingestion" => Ok(Stage::Ingestion),
            "embedding" => Ok(Stage::Embedding),
            "generation" => Ok(Stage::Generation),
            "verification" => Ok(Stage::Verification),
            "delivery" => Ok(Stage::Delivery),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Billing tier for the generation stage: Sonnet baseline or Opus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Sonnet,
    Opus,
}

impl Tier {
    /// Lowercase tier name as used in config, flags, and documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Sonnet => "sonnet",
            Tier::Opus => "opus",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sonnet" => Ok(Tier::Sonnet),
            "opus" => Ok(Tier::Opus),
            other => Err(format!("unknown tier '{other}': expected 'sonnet' or 'opus'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Run telemetry (input)
// ---------------------------------------------------------------------------

/// Token usage for a single stage of one pipeline run.
///
/// The cache hit ratio applies to the input side only; output tokens are
/// never served from cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageUsage {
    /// Raw input tokens before the cache discount.
    #[serde(default)]
    pub input_tokens: u64,

    /// Fraction of input tokens served from cache, in `[0, 1]`.
    #[serde(default)]
    pub cache_hit_ratio: f64,

    /// Raw output tokens (billed in full).
    #[serde(default)]
    pub output_tokens: u64,
}

/// Per-stage usage map with a fixed slot for each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStages {
    #[serde(default)]
    pub ingestion: StageUsage,
    #[serde(default)]
    pub embedding: StageUsage,
    #[serde(default)]
    pub generation: StageUsage,
    #[serde(default)]
    pub verification: StageUsage,
    #[serde(default)]
    pub delivery: StageUsage,
}

impl UsageStages {
    /// Usage for a given stage.
    pub fn get(&self, stage: Stage) -> &StageUsage {
        match stage {
            Stage::Ingestion => &self.ingestion,
            Stage::Embedding => &self.embedding,
            Stage::Generation => &self.generation,
            Stage::Verification => &self.verification,
            Stage::Delivery => &self.delivery,
        }
    }

    /// Mutable usage for a given stage.
    pub fn get_mut(&mut self, stage: Stage) -> &mut StageUsage {
        match stage {
            Stage::Ingestion => &mut self.ingestion,
            Stage::Embedding => &mut self.embedding,
            Stage::Generation => &mut self.generation,
            Stage::Verification => &mut self.verification,
            Stage::Delivery => &mut self.delivery,
        }
    }
}

/// Token telemetry for one pipeline run, written by the pipeline worker and
/// consumed by `reportpipe estimate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunUsage {
    /// Schema version for forward compatibility. Documents written before
    /// versioning are treated as version 1.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Identifier shared across the run's stages, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,

    /// Per-stage token usage.
    #[serde(default)]
    pub stages: UsageStages,
}

fn default_schema_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Cost estimate (output)
// ---------------------------------------------------------------------------

/// Billable token count and USD cost for a single stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageCost {
    /// Billable tokens after the cache-hit discount, rounded to whole tokens.
    pub token_count: u64,
    /// Estimated cost in USD.
    pub estimated_cost_usd: f64,
}

/// Per-stage cost map with a fixed slot for each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageCosts {
    pub ingestion: StageCost,
    pub embedding: StageCost,
    pub generation: StageCost,
    pub verification: StageCost,
    pub delivery: StageCost,
}

impl StageCosts {
    /// Cost entry for a given stage.
    pub fn get(&self, stage: Stage) -> &StageCost {
        match stage {
            Stage::Ingestion => &self.ingestion,
            Stage::Embedding => &self.embedding,
            Stage::Generation => &self.generation,
            Stage::Verification => &self.verification,
            Stage::Delivery => &self.delivery,
        }
    }

    /// Mutable cost entry for a given stage.
    pub fn get_mut(&mut self, stage: Stage) -> &mut StageCost {
        match stage {
            Stage::Ingestion => &mut self.ingestion,
            Stage::Embedding => &mut self.embedding,
            Stage::Generation => &mut self.generation,
            Stage::Verification => &mut self.verification,
            Stage::Delivery => &mut self.delivery,
        }
    }
}

/// The `cost_estimate_json` document emitted for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// The run this estimate was computed for, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    /// Billing tier the generation stage was priced at.
    pub tier: Tier,
    /// When the estimate was computed.
    pub generated_at: DateTime<Utc>,
    /// Per-stage billable tokens and costs.
    pub stages: StageCosts,
    /// Sum of billable tokens across all stages.
    pub total_token_count: u64,
    /// Sum of estimated costs across all stages, in USD.
    pub total_estimated_cost_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn stage_name_roundtrip() {
        for stage in Stage::ALL {
            let parsed: Stage = stage.as_str().parse().expect("parse stage");
            assert_eq!(parsed, stage);
        }
        assert!("rendering".parse::<Stage>().is_err());
    }

    #[test]
    fn tier_parsing() {
        assert_eq!("sonnet".parse::<Tier>().expect("parse"), Tier::Sonnet);
        assert_eq!("Opus".parse::<Tier>().expect("parse"), Tier::Opus);
        assert!("haiku".parse::<Tier>().is_err());
    }

    #[test]
    fn usage_defaults_for_missing_stages() {
        let json = r#"{
            "stages": {
                "generation": {"input_tokens": 1000, "cache_hit_ratio": 0.5, "output_tokens": 200}
            }
        }"#;
        let usage: RunUsage = serde_json::from_str(json).expect("deserialize");

        assert_eq!(usage.schema_version, 1);
        assert!(usage.run_id.is_none());
        assert_eq!(usage.stages.generation.input_tokens, 1000);
        assert_eq!(usage.stages.ingestion, StageUsage::default());
        assert_eq!(usage.stages.delivery.output_tokens, 0);
    }

    #[test]
    fn estimate_serialization_shape() {
        let estimate = CostEstimate {
            schema_version: CURRENT_SCHEMA_VERSION,
            run_id: Some(RunId::new()),
            tier: Tier::Sonnet,
            generated_at: Utc::now(),
            stages: StageCosts::default(),
            total_token_count: 0,
            total_estimated_cost_usd: 0.0,
        };

        let json = serde_json::to_value(&estimate).expect("serialize");
        assert!(json["stages"]["ingestion"]["token_count"].is_u64());
        assert!(json["stages"]["delivery"]["estimated_cost_usd"].is_number());
        assert_eq!(json["tier"], "sonnet");

        let parsed: CostEstimate = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn usage_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/usage.fixture.json")
            .expect("read fixture");
        let parsed: RunUsage = serde_json::from_str(&fixture).expect("deserialize fixture usage");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(parsed.stages.embedding.input_tokens, 2_000_000);
        assert_eq!(parsed.stages.generation.output_tokens, 220_000);
    }

    #[test]
    fn estimate_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/cost_estimate.fixture.json")
            .expect("read fixture");
        let parsed: CostEstimate =
            serde_json::from_str(&fixture).expect("deserialize fixture estimate");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(parsed.tier, Tier::Sonnet);
        assert_eq!(parsed.stages.embedding.token_count, 1_200_000);
        assert_eq!(
            parsed.total_token_count,
            Stage::ALL
                .iter()
                .map(|s| parsed.stages.get(*s).token_count)
                .sum::<u64>()
        );
    }
}
