use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the root directory of the project.
///
/// # Result
/// Returns the workspace root path as `PathBuf`.
///
/// # Errors
/// Returns an error if the manifest directory does not have a parent.
pub fn get_project_root() -> Result<PathBuf> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(Path::to_path_buf)
        .context("Could not find project root from xtask manifest")
}

#[derive(Debug, Deserialize)]
pub struct CrateInfo {
    #[serde(skip)]
    pub path: PathBuf,
    pub package: PackageInfo,
}

#[derive(Debug, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    /// A string, or a `{ workspace = true }` table inherited from the root manifest.
    #[serde(default)]
    description: Option<toml::Value>,
}

impl PackageInfo {
    #[must_use]
    pub fn description(&self) -> &str {
        self.description
            .as_ref()
            .and_then(toml::Value::as_str)
            .unwrap_or("Inherits the workspace description")
    }
}

/// Discovers crates in a workspace subdirectory (e.g., "crates/shared", "apps", "infra").
///
/// # Result
/// Returns a list of discovered crates, each with parsed package metadata.
///
/// # Errors
/// Returns an error if the directory cannot be read, a `Cargo.toml` cannot be read,
/// or the metadata cannot be parsed.
pub fn get_workspace_crates(sub_dir: &str) -> Result<Vec<CrateInfo>> {
    let project_root = get_project_root()?;
    let target_dir = project_root.join(sub_dir);

    let mut crates = Vec::new();

    if !target_dir.exists() {
        return Ok(crates);
    }

    for entry in fs::read_dir(target_dir)? {
        let entry = entry?;
        let path = entry.path();
        let cargo_path = path.join("Cargo.toml");

        if path.is_dir() && cargo_path.exists() {
            let content = fs::read_to_string(&cargo_path)?;
            let mut info: CrateInfo = toml::from_str(&content)?;
            info.path = path;
            crates.push(info);
        }
    }

    crates.sort_by(|a, b| {
        let a_name = a.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let b_name = b.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        a_name.cmp(b_name)
    });

    Ok(crates)
}

/// Prints a formatted table of crates with their folder, name, and description.
pub fn render_crate_table(title: &str, crates: &[CrateInfo]) {
    println!("\n{title}:\n");
    println!("{:<15} {:<20} {:<45}", "Folder", "Crate Name", "Description");
    println!("{:-<80}", "");

    for info in crates {
        let folder = info.path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown");

        println!("{:<15} {:<20} {:<45}", folder, info.package.name, info.package.description());
    }
    println!();
}

/// Normalizes a project crate name to the workspace naming convention.
///
/// `stager` (the facade) and `xtask` are kept as they are.
#[must_use]
pub fn normalize_project_name(project: &str) -> String {
    if project.starts_with("stager-") || matches!(project, "stager" | "xtask") {
        project.to_owned()
    } else {
        format!("stager-{project}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_project_name() {
        assert_eq!(normalize_project_name("loader"), "stager-loader");
        assert_eq!(normalize_project_name("stager-fetch"), "stager-fetch");
        assert_eq!(normalize_project_name("stager"), "stager");
        assert_eq!(normalize_project_name("xtask"), "xtask");
    }

    #[test]
    fn test_workspace_crates_are_discovered() -> Result<()> {
        let infra = get_workspace_crates("infra")?;
        assert!(infra.iter().any(|info| info.package.name == "stager-fetch"));
        assert!(get_workspace_crates("does/not/exist")?.is_empty());
        Ok(())
    }
}
