//! Report on the environment variables the pipeline requires at runtime.

use tracing::warn;

use crate::StepResult;

/// Variables the pipeline's settings loader treats as required.
pub const REQUIRED_ENV: [&str; 9] = [
    "POSTGRES_DSN",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
    "ANTHROPIC_API_KEY",
    "OPENAI_API_KEY",
    "TRANSCRIPT_API_KEY",
    "GITHUB_TOKEN",
    "GITHUB_OWNER",
    "GITHUB_REPO",
];

pub(crate) const STEP_NAME: &str = "environment report";

/// Check the process environment for the required variables and log which
/// are unset. Informational only; never fails setup.
pub fn report_env() -> StepResult {
    let missing = missing_required(|name| std::env::var(name).ok());

    if missing.is_empty() {
        return StepResult::applied(STEP_NAME, "all required variables set");
    }

    for name in &missing {
        warn!(var = %name, "required environment variable not set");
    }

    StepResult::applied(
        STEP_NAME,
        format!(
            "{} of {} required variables unset: {}",
            missing.len(),
            REQUIRED_ENV.len(),
            missing.join(", ")
        ),
    )
}

/// The required variables `lookup` reports as unset or empty.
fn missing_required(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
    REQUIRED_ENV
        .iter()
        .filter(|name| lookup(name).map(|v| v.is_empty()).unwrap_or(true))
        .copied()
        .collect()
}
