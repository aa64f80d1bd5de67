//! Command-line interface for the `skill-loader` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `skill-loader` library crate.

fn main() -> anyhow::Result<()> {
    skill_loader::run()
}
