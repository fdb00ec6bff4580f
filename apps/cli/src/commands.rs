//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use reportpipe_cost::{RateCard, compare_tiers, estimate_run, load_usage, project_monthly};
use reportpipe_setup::{SetupOptions, StepReporter, StepResult, StepStatus, run_setup};
use reportpipe_shared::{
    AppConfig, CostEstimate, Stage, Tier, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// reportpipe — bootstrap the report pipeline and estimate its costs.
#[derive(Parser)]
#[command(
    name = "reportpipe",
    version,
    about = "Bootstrap the research-report pipeline and estimate per-run and monthly costs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Estimate output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Bootstrap the pipeline workspace (.env, dependencies, migrations).
    Setup {
        /// Pipeline project directory (defaults to the working directory).
        #[arg(long)]
        project_dir: Option<String>,

        /// Skip the Python dependency install.
        #[arg(long)]
        skip_pip: bool,

        /// Skip SQL migration application.
        #[arg(long)]
        skip_db: bool,
    },

    /// Estimate the cost of one pipeline run from its token telemetry.
    Estimate {
        /// Path to the run's usage JSON.
        usage: String,

        /// Billing tier: sonnet or opus (defaults to config).
        #[arg(short, long)]
        tier: Option<String>,

        /// Output format: text or json.
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write the estimate JSON to this path.
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Project a run's cost over a month of scheduled runs.
    Project {
        /// Path to the run's usage JSON.
        usage: String,

        /// Runs per month (defaults to config).
        #[arg(short, long)]
        runs: Option<u32>,

        /// Billing tier: sonnet or opus (defaults to config).
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// Price the same run at both tiers, side by side.
    Compare {
        /// Path to the run's usage JSON.
        usage: String,
    },

    /// Print the effective rate card.
    Rates {
        /// Billing tier: sonnet or opus (defaults to config).
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "reportpipe=info,reportpipe_shared=info,reportpipe_cost=info,reportpipe_setup=info",
        1 => "reportpipe=debug,reportpipe_shared=debug,reportpipe_cost=debug,reportpipe_setup=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Setup {
            project_dir,
            skip_pip,
            skip_db,
        } => cmd_setup(project_dir.as_deref(), skip_pip, skip_db),
        Command::Estimate {
            usage,
            tier,
            format,
            out,
        } => cmd_estimate(&usage, tier.as_deref(), &format, out.as_deref()),
        Command::Project { usage, runs, tier } => cmd_project(&usage, runs, tier.as_deref()),
        Command::Compare { usage } => cmd_compare(&usage),
        Command::Rates { tier } => cmd_rates(tier.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Resolve the tier from a CLI flag, falling back to the config default.
fn resolve_tier(flag: Option<&str>, config: &AppConfig) -> Result<Tier> {
    match flag {
        Some(s) => s.parse::<Tier>().map_err(|e| eyre!(e)),
        None => Ok(config.defaults.tier),
    }
}

// ---------------------------------------------------------------------------
// setup
// ---------------------------------------------------------------------------

fn cmd_setup(project_dir: Option<&str>, skip_pip: bool, skip_db: bool) -> Result<()> {
    let project_dir = match project_dir {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };

    info!(
        project_dir = %project_dir.display(),
        skip_pip,
        skip_db,
        "bootstrapping pipeline workspace"
    );

    let options = SetupOptions {
        project_dir,
        skip_pip,
        skip_db,
    };

    let reporter = SetupProgress::new();
    let report = run_setup(&options, &reporter)?;
    reporter.finish();

    println!();
    println!("  Bootstrap complete!");
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Applied => "done",
            StepStatus::Skipped => "skipped",
        };
        println!(
            "  {:<24} {:<8} {}",
            format!("{}:", step.name),
            status,
            step.detail
        );
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Setup progress reporter
// ---------------------------------------------------------------------------

/// Setup progress reporter using an indicatif spinner.
struct SetupProgress {
    spinner: ProgressBar,
}

impl SetupProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl StepReporter for SetupProgress {
    fn step_started(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn step_finished(&self, result: &StepResult) {
        self.spinner
            .set_message(format!("{}: {}", result.name, result.detail));
    }
}

// ---------------------------------------------------------------------------
// estimate / project / compare / rates
// ---------------------------------------------------------------------------

fn cmd_estimate(
    usage_path: &str,
    tier: Option<&str>,
    format: &OutputFormat,
    out: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let tier = resolve_tier(tier, &config)?;
    let rates = RateCard::from(&config.rates);

    let usage = load_usage(Path::new(usage_path))?;
    let estimate = estimate_run(&usage, &rates, tier)?;

    info!(
        usage = usage_path,
        %tier,
        total_cost_usd = estimate.total_estimated_cost_usd,
        "estimate computed"
    );

    match format {
        OutputFormat::Text => print_estimate(&estimate),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
    }

    if let Some(out_path) = out {
        let json = serde_json::to_string_pretty(&estimate)?;
        std::fs::write(out_path, json)
            .map_err(|e| eyre!("cannot write estimate to '{out_path}': {e}"))?;
        println!("  Estimate written to: {out_path}");
        println!();
    }

    Ok(())
}

/// Print the per-stage cost block for one estimate.
fn print_estimate(estimate: &CostEstimate) {
    println!();
    println!("  Cost estimate ({})", estimate.tier);
    if let Some(run_id) = &estimate.run_id {
        println!("  Run:    {run_id}");
    }
    for stage in Stage::ALL {
        let cost = estimate.stages.get(stage);
        println!(
            "  {:<14} {:>12} tokens   ${:.4}",
            format!("{stage}:"),
            cost.token_count,
            cost.estimated_cost_usd
        );
    }
    println!(
        "  {:<14} {:>12} tokens   ${:.4}",
        "total:", estimate.total_token_count, estimate.total_estimated_cost_usd
    );
    println!();
}

fn cmd_project(usage_path: &str, runs: Option<u32>, tier: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let tier = resolve_tier(tier, &config)?;
    let runs = runs.unwrap_or(config.defaults.runs_per_month);
    let rates = RateCard::from(&config.rates);

    let usage = load_usage(Path::new(usage_path))?;
    let estimate = estimate_run(&usage, &rates, tier)?;
    let projection = project_monthly(&estimate, runs);

    info!(usage = usage_path, %tier, runs, "monthly projection computed");

    println!();
    println!("  Monthly projection ({tier})");
    println!("  Runs/month:    {}", projection.runs_per_month);
    println!(
        "  Per run:       {:>12} tokens   ${:.4}",
        projection.run_token_count, projection.run_cost_usd
    );
    println!(
        "  Per month:     {:>12} tokens   ${:.4}",
        projection.monthly_token_count, projection.monthly_cost_usd
    );
    println!();

    Ok(())
}

fn cmd_compare(usage_path: &str) -> Result<()> {
    let config = load_config()?;
    let rates = RateCard::from(&config.rates);

    let usage = load_usage(Path::new(usage_path))?;
    let comparison = compare_tiers(&usage, &rates)?;

    println!();
    println!("  Tier comparison");
    println!(
        "  Sonnet:        ${:.4} per run",
        comparison.sonnet.total_estimated_cost_usd
    );
    println!(
        "  Opus:          ${:.4} per run",
        comparison.opus.total_estimated_cost_usd
    );
    println!("  Opus premium:  ${:.4} per run", comparison.delta_usd());
    println!();

    Ok(())
}

fn cmd_rates(tier: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let tier = resolve_tier(tier, &config)?;
    let rates = RateCard::from(&config.rates);

    println!();
    println!("  Effective rates ({tier}), $ / 1M tokens");
    for stage in Stage::ALL {
        let stage_rates = rates.for_stage(stage, tier);
        println!(
            "  {:<14} in {:>8.2}   out {:>8.2}",
            format!("{stage}:"),
            stage_rates.input_per_mtok,
            stage_rates.output_per_mtok
        );
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
