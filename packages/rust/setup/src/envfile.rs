//! `.env` seeding from the checked-in `.env.example` template.

use std::path::Path;

use reportpipe_shared::{ReportPipeError, Result};
use tracing::{info, warn};

use crate::StepResult;

/// Environment file consumed by the pipeline at runtime.
const ENV_FILE: &str = ".env";

/// Template shipped with the pipeline project.
const ENV_EXAMPLE: &str = ".env.example";

pub(crate) const STEP_NAME: &str = "env file";

/// Seed `.env` from `.env.example` when `.env` does not exist yet.
///
/// An existing `.env` is never overwritten, and a missing template degrades
/// to a skipped step.
pub fn seed_env_file(project_dir: &Path) -> Result<StepResult> {
    let env_path = project_dir.join(ENV_FILE);
    let example_path = project_dir.join(ENV_EXAMPLE);

    if env_path.exists() {
        return Ok(StepResult::skipped(
            STEP_NAME,
            ".env already exists, left untouched",
        ));
    }

    if !example_path.exists() {
        warn!(path = %example_path.display(), "no .env.example template found");
        return Ok(StepResult::skipped(STEP_NAME, "no .env.example found"));
    }

    std::fs::copy(&example_path, &env_path).map_err(|e| ReportPipeError::io(&env_path, e))?;
    info!(path = %env_path.display(), "seeded .env from .env.example");

    Ok(StepResult::applied(STEP_NAME, "seeded from .env.example"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StepStatus;

    #[test]
    fn seeds_env_from_example() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(ENV_EXAMPLE), "POSTGRES_DSN=\n").expect("write template");

        let result = seed_env_file(dir.path()).expect("seed");
        assert_eq!(result.status, StepStatus::Applied);

        let seeded = std::fs::read_to_string(dir.path().join(ENV_FILE)).expect("read .env");
        assert_eq!(seeded, "POSTGRES_DSN=\n");
    }

    #[test]
    fn never_overwrites_existing_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(ENV_EXAMPLE), "POSTGRES_DSN=\n").expect("write template");
        std::fs::write(dir.path().join(ENV_FILE), "POSTGRES_DSN=postgres://real\n")
            .expect("write .env");

        let result = seed_env_file(dir.path()).expect("seed");
        assert_eq!(result.status, StepStatus::Skipped);

        let kept = std::fs::read_to_string(dir.path().join(ENV_FILE)).expect("read .env");
        assert_eq!(kept, "POSTGRES_DSN=postgres://real\n");
    }

    #[test]
    fn skips_without_template() {
        let dir = tempfile::tempdir().expect("tempdir");

        let result = seed_env_file(dir.path()).expect("seed");
        assert_eq!(result.status, StepStatus::Skipped);
        assert!(result.detail.contains(".env.example"));
        assert!(!dir.path().join(ENV_FILE).exists());
    }
}
