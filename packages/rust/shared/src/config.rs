//! Application configuration for reportpipe.
//!
//! User config lives at `~/.reportpipe/reportpipe.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReportPipeError, Result};
use crate::types::Tier;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "reportpipe.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".reportpipe";

// ---------------------------------------------------------------------------
// Config structs (matching reportpipe.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Billing rates per pipeline stage.
    #[serde(default)]
    pub rates: RatesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default billing tier for the generation stage.
    #[serde(default)]
    pub tier: Tier,

    /// Default runs per month for projections (weekly cadence).
    #[serde(default = "default_runs_per_month")]
    pub runs_per_month: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tier: Tier::default(),
            runs_per_month: default_runs_per_month(),
        }
    }
}

fn default_runs_per_month() -> u32 {
    4
}

/// `[rates]` section: `$ / 1M tokens` per stage, input and output sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Multiplier applied to generation rates on the Opus tier.
    #[serde(default = "default_opus_multiplier")]
    pub opus_multiplier: f64,

    /// Ingestion (no LLM calls; tokens counted, not billed).
    #[serde(default = "default_ingestion_rates")]
    pub ingestion: StageRatesConfig,

    /// Embedding model rates.
    #[serde(default = "default_embedding_rates")]
    pub embedding: StageRatesConfig,

    /// Generation model rates (Sonnet baseline).
    #[serde(default = "default_generation_rates")]
    pub generation: StageRatesConfig,

    /// Verification small-model rates (tier-independent).
    #[serde(default = "default_verification_rates")]
    pub verification: StageRatesConfig,

    /// Delivery (no LLM calls).
    #[serde(default = "default_delivery_rates")]
    pub delivery: StageRatesConfig,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            opus_multiplier: default_opus_multiplier(),
            ingestion: default_ingestion_rates(),
            embedding: default_embedding_rates(),
            generation: default_generation_rates(),
            verification: default_verification_rates(),
            delivery: default_delivery_rates(),
        }
    }
}

/// Input/output rates for one stage, in `$ / 1M tokens`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRatesConfig {
    #[serde(default)]
    pub input_per_mtok: f64,
    #[serde(default)]
    pub output_per_mtok: f64,
}

fn default_opus_multiplier() -> f64 {
    5.0
}
fn default_ingestion_rates() -> StageRatesConfig {
    StageRatesConfig {
        input_per_mtok: 0.0,
        output_per_mtok: 0.0,
    }
}
fn default_embedding_rates() -> StageRatesConfig {
    StageRatesConfig {
        input_per_mtok: 0.02,
        output_per_mtok: 0.0,
    }
}
fn default_generation_rates() -> StageRatesConfig {
    StageRatesConfig {
        input_per_mtok: 3.0,
        output_per_mtok: 15.0,
    }
}
fn default_verification_rates() -> StageRatesConfig {
    StageRatesConfig {
        input_per_mtok: 0.8,
        output_per_mtok: 4.0,
    }
}
fn default_delivery_rates() -> StageRatesConfig {
    StageRatesConfig {
        input_per_mtok: 0.0,
        output_per_mtok: 0.0,
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.reportpipe/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ReportPipeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.reportpipe/reportpipe.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ReportPipeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ReportPipeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_rates(&config.rates)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ReportPipeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ReportPipeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ReportPipeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that all configured rates are non-negative and the tier multiplier
/// is positive.
pub fn validate_rates(rates: &RatesConfig) -> Result<()> {
    if rates.opus_multiplier <= 0.0 {
        return Err(ReportPipeError::config(format!(
            "opus_multiplier must be positive, got {}",
            rates.opus_multiplier
        )));
    }

    let stages = [
        ("ingestion", &rates.ingestion),
        ("embedding", &rates.embedding),
        ("generation", &rates.generation),
        ("verification", &rates.verification),
        ("delivery", &rates.delivery),
    ];

    for (name, stage) in stages {
        if stage.input_per_mtok < 0.0 || stage.output_per_mtok < 0.0 {
            return Err(ReportPipeError::config(format!(
                "rates.{name} must be non-negative"
            )));
        }
    }

    Ok(())
}
