//! Entry point wiring for the `skill-loader` binary.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{LoadedSkill, SkillCatalog, SkillInfo};
use crate::cli::{Cli, Commands};
use crate::config::{resolve_dirs, ToolConfig};
use crate::events::TracingSink;
use crate::tool::SkillsTool;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The main entry point for the `skill-loader` application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dirs = if cli.skill_dirs.is_empty() {
        resolve_dirs(&ToolConfig::default(), &Value::Null)?
    } else {
        cli.skill_dirs.clone()
    };
    let tool = SkillsTool::discover(&dirs, Arc::new(TracingSink));
    let output = render_command(&tool.catalog(), &cli.command, cli.json)?;
    println!("{output}");
    Ok(())
}

/// Runs `command` against `catalog` and renders its output.
///
/// Not-found and extraction failures become errors so the process exits
/// non-zero.
pub fn render_command(catalog: &SkillCatalog, command: &Commands, json: bool) -> Result<String> {
    match command {
        Commands::List => {
            let list = catalog.list();
            if json {
                to_json(&list)
            } else {
                Ok(list.message)
            }
        }
        Commands::Search { term } => {
            let results = catalog.search(term);
            if json {
                to_json(&results)
            } else {
                Ok(results.message)
            }
        }
        Commands::Info { name } => {
            let info = catalog.info(name)?;
            if json {
                to_json(&info)
            } else {
                Ok(render_info(&info))
            }
        }
        Commands::Load { name } => {
            let loaded = catalog.load(name)?;
            if json {
                to_json(&loaded)
            } else {
                Ok(render_loaded(&loaded))
            }
        }
    }
}

fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn render_info(info: &SkillInfo) -> String {
    let mut lines = vec![
        format!("name: {}", info.name),
        format!("description: {}", info.description),
    ];
    if let Some(version) = &info.version {
        lines.push(format!("version: {version}"));
    }
    if let Some(license) = &info.license {
        lines.push(format!("license: {license}"));
    }
    lines.push(format!("path: {}", info.path.display()));
    lines.push(format!("source: {}", info.source));
    for (key, value) in &info.metadata {
        lines.push(format!("{key}: {value}"));
    }
    lines.join("\n")
}

fn render_loaded(loaded: &LoadedSkill) -> String {
    format!(
        "{}\n\n---\ncompanion directory: {}\nsource: {}",
        loaded.content.trim_end(),
        loaded.companion_directory.display(),
        loaded.source
    )
}
