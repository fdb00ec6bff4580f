//! Python dependency installation for the pipeline worker.
//!
//! The pipeline itself runs on Python; bootstrap installs its requirements
//! through `python3 -m pip` with inherited stdio so install output stays
//! visible.

use std::path::Path;
use std::process::Command;

use reportpipe_shared::{ReportPipeError, Result};
use tracing::info;

use crate::{StepResult, tools};

const PYTHON: &str = "python3";
const REQUIREMENTS: &str = "requirements.txt";

pub(crate) const STEP_NAME: &str = "python dependencies";

/// Run `python3 -m pip install -r requirements.txt` in the project directory.
///
/// A missing `requirements.txt` degrades to a skip; a missing `python3`
/// interpreter or a failing install is a hard error.
pub fn install_python_deps(project_dir: &Path) -> Result<StepResult> {
    let requirements = project_dir.join(REQUIREMENTS);
    if !requirements.exists() {
        return Ok(StepResult::skipped(STEP_NAME, "no requirements.txt found"));
    }

    let Some(version) = tools::probe(PYTHON) else {
        return Err(ReportPipeError::setup("python3 interpreter not found"));
    };
    info!(python = %version, "installing pipeline dependencies");

    let status = Command::new(PYTHON)
        .args(["-m", "pip", "install", "-r"])
        .arg(&requirements)
        .current_dir(project_dir)
        .status()
        .map_err(|e| ReportPipeError::setup(format!("failed to run pip: {e}")))?;

    if !status.success() {
        return Err(ReportPipeError::setup(format!(
            "pip install exited with status {}",
            status.code().unwrap_or(-1)
        )));
    }

    Ok(StepResult::applied(
        STEP_NAME,
        "installed from requirements.txt",
    ))
}
