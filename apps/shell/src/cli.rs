use clap::Parser;
use std::path::PathBuf;

/// Loads a site the way its loader page would, without a browser.
///
/// Settings come from the optional file layered with `STAGER__*` environment variables;
/// flags given here win over both.
#[derive(Debug, Parser)]
#[command(name = "stager", version, about)]
pub(crate) struct Cli {
    /// Settings file (toml, yaml or json).
    #[arg(short, long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// URL of the configuration document.
    #[arg(short, long, value_name = "URL")]
    pub(crate) url: Option<String>,

    /// Declares a block container; repeat for each block the page provides.
    #[arg(long = "container", value_name = "BLOCK")]
    pub(crate) containers: Vec<String>,

    /// Reloads a failed run up to N times.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub(crate) reloads: u32,

    /// Writes `index.html`, `surface.json` and `report.json` into DIR.
    #[arg(long, value_name = "DIR")]
    pub(crate) dump: Option<PathBuf>,

    /// Prints the run report as JSON instead of a summary line.
    #[arg(long)]
    pub(crate) report: bool,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`, `off`).
    #[arg(long, value_name = "LEVEL")]
    pub(crate) log_level: Option<String>,

    /// Writes console logs as JSON lines.
    #[arg(long)]
    pub(crate) json: bool,

    /// Also writes rolling log files into DIR.
    #[arg(long, value_name = "DIR")]
    pub(crate) log_dir: Option<PathBuf>,

    /// Disables console logging.
    #[arg(short, long)]
    pub(crate) quiet: bool,
}

impl Cli {
    /// Folds the flags into loaded settings.
    pub(crate) fn apply(&self, settings: &mut stager::domain::config::LoaderSettings) {
        if let Some(url) = &self.url {
            settings.config_url.clone_from(url);
        }
        if !self.containers.is_empty() {
            settings.surface.containers.clone_from(&self.containers);
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json {
            settings.logging.json = true;
        }
        if let Some(dir) = &self.log_dir {
            settings.logging.directory = Some(dir.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stager::domain::config::LoaderSettings;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::parse_from([
            "stager",
            "--url",
            "https://cdn.test/config.json",
            "--container",
            "header",
            "--container",
            "footer",
            "--log-level",
            "debug",
        ]);
        let mut settings = LoaderSettings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.config_url, "https://cdn.test/config.json");
        assert_eq!(settings.surface.containers, ["header", "footer"]);
        assert_eq!(settings.logging.level, "debug");
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_defaults_leave_settings_alone() {
        let cli = Cli::parse_from(["stager"]);
        let mut settings = LoaderSettings::default();
        cli.apply(&mut settings);

        assert_eq!(settings.config_url, LoaderSettings::default().config_url);
        assert_eq!(cli.reloads, 0);
        assert!(cli.dump.is_none());
    }
}
