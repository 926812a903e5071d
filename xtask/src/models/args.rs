//! # CLI Argument Definitions
//!
//! Subcommands, arguments and flags of `cargo xtask`.

use clap::{Parser, Subcommand, ValueEnum};

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "cargo xtask")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Developer toolkit for the stager workspace")]
pub struct Cli {
    /// The main subcommand to execute.
    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// List workspace crates with their descriptions
    List {
        /// Only list one group of crates
        #[arg(value_enum)]
        group: Option<CrateGroup>,
    },
    /// Run tests (workspace by default)
    Test {
        /// Run tests for a specific crate (auto-prefixes with 'stager-' if missing)
        project: Option<String>,
    },
    /// Run doc tests (workspace by default)
    Doctest {
        /// Run doc tests for a specific crate (auto-prefixes with 'stager-' if missing)
        project: Option<String>,
    },
    /// Run a project
    Run {
        /// Run a specific crate (auto-prefixes with 'stager-' if missing)
        #[arg(default_value = "shell")]
        project: String,
        /// Arguments passed to the binary after `--`
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run benches for a project
    Bench {
        /// Run benches for a specific crate (auto-prefixes with 'stager-' if missing)
        #[arg(default_value = "loader")]
        project: String,
        /// Save the results as a named criterion baseline
        #[arg(long)]
        baseline: Option<String>,
    },
}

/// Workspace directories that hold crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CrateGroup {
    Apps,
    Features,
    Shared,
    Infra,
}

impl CrateGroup {
    pub const ALL: [Self; 4] = [Self::Apps, Self::Features, Self::Shared, Self::Infra];

    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Features => "crates/features",
            Self::Shared => "crates/shared",
            Self::Infra => "infra",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Apps => "Applications",
            Self::Features => "Features",
            Self::Shared => "Shared",
            Self::Infra => "Infrastructure",
        }
    }
}
