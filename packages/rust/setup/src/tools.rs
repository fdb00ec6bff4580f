//! External tool probes for the bootstrap flow.

use std::process::Command;

/// Check whether `command` is runnable by asking it for its version.
/// Returns the first version line on success, `None` otherwise.
pub fn probe(command: &str) -> Option<String> {
    let output = Command::new(command).arg("--version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    // Some tools report their version on stderr.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    Some(text.lines().next().unwrap_or("").trim().to_string())
}
