//! Bootstrap flow for the pipeline workspace: `.env` seeding, Python
//! dependency installation, SQL migration application, and an environment
//! report.
//!
//! Each step yields a [`StepResult`]. Recoverable problems (missing template,
//! missing DB client, nothing to apply) degrade to skipped steps with logged
//! messages; a missing interpreter or a failing subprocess is a hard error.

pub mod envcheck;
pub mod envfile;
pub mod migrate;
pub mod pydeps;
pub mod tools;

use std::path::PathBuf;

use reportpipe_shared::Result;
use tracing::info;

// ---------------------------------------------------------------------------
// Options, step results, report
// ---------------------------------------------------------------------------

/// Configuration for one bootstrap run.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Pipeline project directory (holds `.env.example`, `requirements.txt`,
    /// `sql/`).
    pub project_dir: PathBuf,
    /// Skip the Python dependency install.
    pub skip_pip: bool,
    /// Skip SQL migration application.
    pub skip_db: bool,
}

/// Whether a step ran or was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Applied,
    Skipped,
}

/// Outcome of a single bootstrap step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: &'static str,
    pub status: StepStatus,
    pub detail: String,
}

impl StepResult {
    pub fn applied(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: StepStatus::Applied,
            detail: detail.into(),
        }
    }

    pub fn skipped(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            status: StepStatus::Skipped,
            detail: reason.into(),
        }
    }
}

/// Collected outcomes of a bootstrap run.
#[derive(Debug, Default)]
pub struct SetupReport {
    pub steps: Vec<StepResult>,
}

impl SetupReport {
    pub fn applied_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Applied)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting bootstrap status.
pub trait StepReporter: Send + Sync {
    /// Called when a step begins.
    fn step_started(&self, name: &str);
    /// Called when a step finishes (applied or skipped).
    fn step_finished(&self, result: &StepResult);
}

/// No-op reporter for headless/test usage.
pub struct SilentSteps;

impl StepReporter for SilentSteps {
    fn step_started(&self, _name: &str) {}
    fn step_finished(&self, _result: &StepResult) {}
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Run the full bootstrap flow in order: env file, Python dependencies,
/// database migrations, environment report.
pub fn run_setup(options: &SetupOptions, reporter: &dyn StepReporter) -> Result<SetupReport> {
    info!(project_dir = %options.project_dir.display(), "starting bootstrap");
    let mut report = SetupReport::default();

    reporter.step_started(envfile::STEP_NAME);
    let result = envfile::seed_env_file(&options.project_dir)?;
    reporter.step_finished(&result);
    report.steps.push(result);

    reporter.step_started(pydeps::STEP_NAME);
    let result = if options.skip_pip {
        StepResult::skipped(pydeps::STEP_NAME, "--skip-pip")
    } else {
        pydeps::install_python_deps(&options.project_dir)?
    };
    reporter.step_finished(&result);
    report.steps.push(result);

    reporter.step_started(migrate::STEP_NAME);
    let result = if options.skip_db {
        StepResult::skipped(migrate::STEP_NAME, "--skip-db")
    } else {
        migrate::apply_migrations(&options.project_dir)?
    };
    reporter.step_finished(&result);
    report.steps.push(result);

    reporter.step_started(envcheck::STEP_NAME);
    let result = envcheck::report_env();
    reporter.step_finished(&result);
    report.steps.push(result);

    info!(
        applied = report.applied_count(),
        skipped = report.skipped_count(),
        "bootstrap complete"
    );

    Ok(report)
}
