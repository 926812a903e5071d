use crate::services::utils::normalize_project_name;
use anyhow::{Context, bail};
use std::process::Command;

/// Runs the criterion benches of a project, optionally saving a named baseline.
///
/// # Errors
/// Returns an error if the bench build or run fails.
pub fn run_bench(project: &str, baseline: Option<&str>) -> anyhow::Result<()> {
    let project = normalize_project_name(project);
    println!("🏁 Running benches of '{project}'...");

    let mut cmd = Command::new("cargo");
    cmd.args(["bench", "-p", &project]);
    if let Some(baseline) = baseline {
        cmd.args(["--", "--save-baseline", baseline]);
    }

    let status = cmd.status().context("Failed to execute cargo bench")?;
    if !status.success() {
        bail!("Bench exited with non-zero status: {}", status.code().unwrap_or(-1));
    }

    Ok(())
}
