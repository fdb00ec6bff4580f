//! SQL migration application through the external `psql` client.
//!
//! The pipeline project ships its migrations as `sql/*.sql`; bootstrap
//! applies whatever files are present, in ascending filename order, against
//! the database named by `POSTGRES_DSN`.

use std::path::{Path, PathBuf};
use std::process::Command;

use reportpipe_shared::{ReportPipeError, Result};
use tracing::{info, warn};

use crate::{StepResult, tools};

const SQL_DIR: &str = "sql";
const PSQL: &str = "psql";
const DSN_VAR: &str = "POSTGRES_DSN";

pub(crate) const STEP_NAME: &str = "database migrations";

/// Apply pending SQL files using `POSTGRES_DSN` from the environment.
pub fn apply_migrations(project_dir: &Path) -> Result<StepResult> {
    let dsn = std::env::var(DSN_VAR).ok().filter(|v| !v.is_empty());
    apply_migrations_with(project_dir, dsn.as_deref())
}

/// Apply pending SQL files against `dsn`.
///
/// Degrades to a skipped step when the DSN, the `sql/` directory, or the
/// `psql` client is missing. A failing `psql` run is a hard error.
pub fn apply_migrations_with(project_dir: &Path, dsn: Option<&str>) -> Result<StepResult> {
    let Some(dsn) = dsn else {
        warn!("POSTGRES_DSN not set, skipping migrations");
        return Ok(StepResult::skipped(STEP_NAME, "POSTGRES_DSN not set"));
    };

    let sql_dir = project_dir.join(SQL_DIR);
    if !sql_dir.is_dir() {
        return Ok(StepResult::skipped(STEP_NAME, "no sql/ directory found"));
    }

    let files = discover_sql_files(&sql_dir)?;
    if files.is_empty() {
        return Ok(StepResult::skipped(STEP_NAME, "no .sql files to apply"));
    }

    let Some(version) = tools::probe(PSQL) else {
        warn!("psql client not found, skipping migrations");
        return Ok(StepResult::skipped(STEP_NAME, "psql client not found"));
    };
    info!(psql = %version, count = files.len(), "applying SQL migrations");

    for file in &files {
        info!(file = %file.display(), "applying migration");

        let status = Command::new(PSQL)
            .arg(dsn)
            .args(["-v", "ON_ERROR_STOP=1", "-f"])
            .arg(file)
            .status()
            .map_err(|e| ReportPipeError::setup(format!("failed to run psql: {e}")))?;

        if !status.success() {
            return Err(ReportPipeError::setup(format!(
                "migration {} failed with status {}",
                file.display(),
                status.code().unwrap_or(-1)
            )));
        }
    }

    Ok(StepResult::applied(
        STEP_NAME,
        format!("applied {} migration file(s)", files.len()),
    ))
}

/// List `*.sql` files in `dir`, sorted by filename so numbered migrations
/// apply in order.
pub fn discover_sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReportPipeError::io(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map(|ext| ext == "sql").unwrap_or(false)
        })
        .collect();

    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(files)
}
