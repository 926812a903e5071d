use anyhow::Context;
use stager::{HeadlessDocument, PipelineReport};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub(crate) const PAGE_FILE: &str = "index.html";
pub(crate) const SURFACE_FILE: &str = "surface.json";
pub(crate) const REPORT_FILE: &str = "report.json";

/// Writes the assembled page, the surface snapshot and the run report into `dir`.
pub(crate) fn dump(
    dir: &Path,
    document: &HeadlessDocument,
    report: &PipelineReport,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Creating {}", dir.display()))?;

    write(&dir.join(PAGE_FILE), document.render_page())?;
    write(&dir.join(SURFACE_FILE), serde_json::to_string_pretty(&document.snapshot())?)?;
    write(&dir.join(REPORT_FILE), serde_json::to_string_pretty(report)?)?;
    Ok(())
}

pub(crate) fn print_report(report: &PipelineReport) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn print_summary(report: &PipelineReport) -> anyhow::Result<()> {
    writeln!(io::stdout().lock(), "{}", summary(report))?;
    Ok(())
}

fn summary(report: &PipelineReport) -> String {
    report.elapsed().map_or_else(
        || format!("Failed after {} run(s): {}", report.run, report.error().unwrap_or_default()),
        |elapsed| {
            format!(
                "Ready in {:.2}s: {}/{} blocks, {} scripts ({} failed)",
                elapsed.as_secs_f64(),
                report.loaded_blocks,
                report.total_blocks,
                report.scripts.len(),
                report.failed_scripts().count(),
            )
        },
    )
}

fn write(path: &Path, contents: String) -> anyhow::Result<()> {
    fs::write(path, contents).with_context(|| format!("Writing {}", path.display()))
}
