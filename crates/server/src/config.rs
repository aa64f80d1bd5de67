//! Resolution of the ordered skill source list.
//!
//! Directories are taken from the first of these that is set:
//!
//! 1. Tool config `skills_dirs` (string or list of strings)
//! 2. Tool config `skills_dir` (single string)
//! 3. Host settings `skills.dirs` (string or list of strings)
//! 4. `SKILL_LOADER_DIRS` environment variable (colon-separated)
//! 5. Defaults: `<cwd>/.agent/skills`, then `~/.agent/skills`
//!
//! ```json
//! { "skills_dirs": ["./.agent/skills", "~/shared/skills"] }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

/// Environment variable holding a colon-separated source list.
pub const ENV_SKILL_DIRS: &str = "SKILL_LOADER_DIRS";

/// Directory name, relative to the workspace or home, holding skills by default.
pub const DEFAULT_SKILLS_SUBDIR: &str = ".agent/skills";

/// A config value that may be a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DirList {
    One(String),
    Many(Vec<String>),
}

impl DirList {
    fn into_vec(self) -> Vec<String> {
        match self {
            DirList::One(dir) => vec![dir],
            DirList::Many(dirs) => dirs,
        }
    }
}

/// Per-mount tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolConfig {
    /// Ordered source directories, highest priority first.
    #[serde(default)]
    pub skills_dirs: Option<DirList>,
    /// Single source directory.
    #[serde(default)]
    pub skills_dir: Option<String>,
}

/// Host-level settings shape; only `skills.dirs` is read.
#[derive(Debug, Default, Deserialize)]
struct HostSettings {
    #[serde(default)]
    skills: SkillsSettings,
}

#[derive(Debug, Default, Deserialize)]
struct SkillsSettings {
    #[serde(default)]
    dirs: Option<DirList>,
}

/// Configuration that cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid skills tool config: {0}")]
    Tool(#[source] serde_json::Error),
    #[error("invalid skills settings: {0}")]
    Settings(#[source] serde_json::Error),
}

impl ToolConfig {
    /// Parses tool config. `None` and `null` both give the default config.
    pub fn from_value(value: Option<&Value>) -> Result<Self, ConfigError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(v) => ToolConfig::deserialize(v).map_err(ConfigError::Tool),
        }
    }

    /// Directories named directly in this config, if any.
    pub fn configured_dirs(&self) -> Option<Vec<PathBuf>> {
        if let Some(dirs) = &self.skills_dirs {
            return Some(expand_all(dirs.clone().into_vec()));
        }
        self.skills_dir
            .as_ref()
            .map(|dir| expand_all(vec![dir.clone()]))
    }
}

/// Reads `skills.dirs` out of host settings.
pub fn settings_dirs(settings: &Value) -> Result<Option<Vec<PathBuf>>, ConfigError> {
    if settings.is_null() {
        return Ok(None);
    }
    let parsed = HostSettings::deserialize(settings).map_err(ConfigError::Settings)?;
    Ok(parsed.skills.dirs.map(|d| expand_all(d.into_vec())))
}

/// Returns directories from `SKILL_LOADER_DIRS`, if set and non-empty.
pub fn env_dirs() -> Option<Vec<PathBuf>> {
    let raw = std::env::var(ENV_SKILL_DIRS).ok()?;
    let dirs: Vec<String> = raw
        .split(':')
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .collect();
    (!dirs.is_empty()).then(|| expand_all(dirs))
}

/// Returns the user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir()
}

/// Default sources: the workspace directory before the user directory.
pub fn default_dirs(workspace: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = vec![workspace.join(DEFAULT_SKILLS_SUBDIR)];
    if let Some(home) = home {
        dirs.push(home.join(DEFAULT_SKILLS_SUBDIR));
    }
    dirs
}

/// Resolves the ordered source list for a mount.
pub fn resolve_dirs(config: &ToolConfig, settings: &Value) -> Result<Vec<PathBuf>, ConfigError> {
    if let Some(dirs) = config.configured_dirs() {
        tracing::debug!(?dirs, "using skill directories from tool config");
        return Ok(dirs);
    }
    if let Some(dirs) = settings_dirs(settings)? {
        tracing::info!(?dirs, "using skill directories from settings");
        return Ok(dirs);
    }
    if let Some(dirs) = env_dirs() {
        tracing::debug!(?dirs, "using skill directories from SKILL_LOADER_DIRS");
        return Ok(dirs);
    }
    let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Ok(default_dirs(&workspace, home_dir().as_deref()))
}

fn expand_all(dirs: Vec<String>) -> Vec<PathBuf> {
    dirs.iter().map(|d| expand_tilde(d)).collect()
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
