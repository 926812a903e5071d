use crate::services::utils::normalize_project_name;
use anyhow::bail;
use std::process::Command;

/// Runs tests in the workspace or a specific crate.
///
/// Uses `cargo nextest` when it is installed and `cargo test` otherwise.
///
/// # Errors
/// Returns an error if the test runner cannot be started or tests fail.
pub fn run_tests(project: Option<&str>) -> anyhow::Result<()> {
    let has_nextest = Command::new("cargo-nextest").arg("--version").output().is_ok();

    let mut args: Vec<String> = if has_nextest {
        vec!["nextest".into(), "run".into()]
    } else {
        vec!["test".into()]
    };
    args.extend(target_args(project));
    args.push("--all-features".into());

    if has_nextest {
        args.extend(
            [
                "--failure-output",
                "immediate-final",
                "--success-output",
                "never",
                "--status-level",
                "skip",
            ]
            .map(String::from),
        );
    } else {
        args.extend(["--tests", "--lib", "--bins", "--", "-q"].map(String::from));
    }

    println!(
        "🧪 Running {} tests via '{}'...",
        target_label(project),
        if has_nextest { "nextest" } else { "cargo test" }
    );
    let status = Command::new("cargo").args(args).status()?;

    if !status.success() {
        bail!("Tests failed!");
    }
    Ok(())
}

/// Runs doc tests in the workspace or a specific crate.
///
/// # Errors
/// Returns an error if `cargo test --doc` cannot be started or fails.
pub fn run_doctests(project: Option<&str>) -> anyhow::Result<()> {
    let mut args: Vec<String> = vec!["test".into(), "--doc".into()];
    args.extend(target_args(project));
    args.push("--all-features".into());

    println!("📚 Running {} doc tests via 'cargo test --doc'...", target_label(project));
    let status = Command::new("cargo").args(args).status()?;

    if !status.success() {
        bail!("Doc tests failed!");
    }
    Ok(())
}

fn is_workspace(project: Option<&str>) -> bool {
    project.is_none_or(|value| value == "all")
}

fn target_label(project: Option<&str>) -> &'static str {
    if is_workspace(project) { "workspace" } else { "crate" }
}

fn target_args(project: Option<&str>) -> Vec<String> {
    match project {
        Some(project) if !is_workspace(Some(project)) => {
            vec!["-p".into(), normalize_project_name(project)]
        },
        _ => vec!["--workspace".into()],
    }
}
