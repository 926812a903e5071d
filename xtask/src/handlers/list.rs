use crate::models::args::CrateGroup;
use crate::services::utils::{get_workspace_crates, render_crate_table};
use anyhow::Result;

/// Lists the crates of one group, or of every group.
///
/// # Errors
/// Returns an error if a directory cannot be read or crate metadata cannot be parsed.
pub fn list_crates(group: Option<CrateGroup>) -> Result<()> {
    let groups = group.map_or_else(|| CrateGroup::ALL.to_vec(), |group| vec![group]);

    for group in groups {
        let crates = get_workspace_crates(group.dir())?;
        if crates.is_empty() {
            println!("ℹ️ No crates found in '{}/' directory.", group.dir());
            continue;
        }
        render_crate_table(group.title(), &crates);
    }

    Ok(())
}
