//! Skill discovery exposed as a queryable catalog and a `load_skill` tool.
//!
//! This crate builds on `skill-loader-discovery` with:
//! - [`SkillCatalog`]: list, search, info, and load over a resolved index.
//! - [`SkillsTool`] and [`mount`]: the tool surface a host mounts, including
//!   reuse of an index shared by another consumer.
//! - [`EventSink`]: where `skills:discovered` and `skill:loaded` go.
//! - [`config`]: how the ordered source list is chosen.
//!
//! The `run` function is the entry point for the `skill-loader` binary.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod events;
pub mod tool;

pub use app::{render_command, run};
pub use catalog::{
    LoadedSkill, QueryError, SearchResults, SkillCatalog, SkillInfo, SkillList, SkillSummary,
};
pub use config::{resolve_dirs, ConfigError, ToolConfig, ENV_SKILL_DIRS};
pub use events::{
    EventSink, MemoryEventSink, NoopSink, SkillEvent, TracingSink, SKILLS_DISCOVERED, SKILL_LOADED,
};
pub use tool::{mount, HostContext, SkillsTool, ToolInput, ToolResult, TOOL_NAME};
