use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `skill-loader` application.
#[derive(Debug, Parser)]
#[command(
    name = "skill-loader",
    about = "Discover, search, and load SKILL.md knowledge files"
)]
pub struct Cli {
    /// Skill source directories, highest priority first (repeatable).
    /// Overrides `SKILL_LOADER_DIRS` and the default directories.
    #[arg(long = "skill-dir", value_name = "DIR", global = true)]
    pub skill_dirs: Vec<PathBuf>,
    /// Enables debug logging unless `RUST_LOG` is set.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
    /// Prints structured JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `skill-loader` commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Lists every discovered skill.
    List,
    /// Lists skills whose name or description contains a term (case-insensitive).
    Search {
        /// Term to look for.
        term: String,
    },
    /// Shows metadata for a skill without loading its content.
    Info {
        /// Exact skill name.
        name: String,
    },
    /// Prints the full content of a skill.
    Load {
        /// Exact skill name.
        name: String,
    },
}
