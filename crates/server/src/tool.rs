//! The `load_skill` tool and its mounting into a host.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use skill_loader_discovery::{resolve_sources, SkillIndex};

use crate::catalog::SkillCatalog;
use crate::config::{resolve_dirs, ConfigError, ToolConfig};
use crate::events::{EventSink, SkillEvent, TracingSink, SKILLS_DISCOVERED, SKILL_LOADED};

/// Name the tool is mounted under.
pub const TOOL_NAME: &str = "load_skill";

const TOOL_DESCRIPTION: &str = "\
Load domain knowledge from an available skill. Skills provide specialized knowledge, workflows,
best practices, and standards.

Operations:
  load_skill(list=true)            List all available skills with descriptions.
  load_skill(search=\"pattern\")     Filter skills by name or description.
  load_skill(info=\"skill-name\")    Metadata (name, description, version, license, path) without content.
  load_skill(skill_name=\"name\")    Load the full skill content. Returns companion_directory for
                                   reading companion files referenced by the skill.

Skills are discovered from the configured directories, highest priority first. When the same
skill exists in several directories the first one wins, so workspace skills override user skills.";

const MISSING_OPERATION: &str =
    "Must provide skill_name, list=true, search='term', or info='name'";

/// Arguments accepted by [`SkillsTool::execute`].
#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub skill_name: Option<String>,
    /// `null` and `false` both mean "not a list call".
    #[serde(default)]
    pub list: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// Outcome of one tool call. Failures are values, never panics or errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ToolResult {
    fn ok(output: impl Serialize) -> Self {
        match serde_json::to_value(output) {
            Ok(output) => Self {
                success: true,
                output: Some(output),
                error: None,
            },
            Err(e) => Self::failure(format!("failed to encode result: {e}")),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(json!({ "message": message.into() })),
        }
    }

    /// The `message` of a failure, if this is one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref()?.get("message")?.as_str()
    }
}

/// Skill discovery and loading exposed as a single tool.
///
/// Holds one fully resolved index at a time. [`SkillsTool::reload`] builds a
/// replacement off to the side and swaps it in whole.
pub struct SkillsTool {
    index: RwLock<Arc<SkillIndex>>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SkillsTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillsTool")
            .field("skills", &self.index.read().len())
            .finish()
    }
}

impl SkillsTool {
    /// Wraps an already resolved index.
    pub fn from_index(index: Arc<SkillIndex>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            index: RwLock::new(index),
            sink,
        }
    }

    /// Resolves `dirs` (highest priority first) and wraps the result.
    pub fn discover(dirs: &[PathBuf], sink: Arc<dyn EventSink>) -> Self {
        Self::from_index(Arc::new(resolve_sources(dirs)), sink)
    }

    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// JSON schema for [`ToolInput`].
    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "skill_name": {
                    "type": "string",
                    "description": "Name of skill to load (e.g., 'design-patterns', 'python-standards')"
                },
                "list": {
                    "type": "boolean",
                    "description": "If true, return list of all available skills"
                },
                "search": {
                    "type": "string",
                    "description": "Search term to filter skills by name or description"
                },
                "info": {
                    "type": "string",
                    "description": "Get metadata for a specific skill without loading full content"
                }
            }
        })
    }

    /// Snapshot of the current index.
    pub fn index(&self) -> Arc<SkillIndex> {
        self.index.read().clone()
    }

    /// Query surface over the current index snapshot.
    pub fn catalog(&self) -> SkillCatalog {
        SkillCatalog::new(self.index(), self.sink.clone())
    }

    /// Rebuilds the index from `dirs` and swaps it in, then announces it.
    pub fn reload(&self, dirs: &[PathBuf]) {
        let fresh = Arc::new(resolve_sources(dirs));
        *self.index.write() = fresh.clone();
        announce(&fresh, self.sink.as_ref());
    }

    /// Runs one tool call.
    ///
    /// Operation precedence: `list`, then `search`, then `info`, then
    /// `skill_name`. Empty strings count as absent.
    pub fn execute(&self, input: &Value) -> ToolResult {
        let input = match ToolInput::deserialize(input) {
            Ok(input) => input,
            Err(e) => return ToolResult::failure(format!("invalid input: {e}")),
        };
        let catalog = self.catalog();

        if input.list.unwrap_or(false) {
            return ToolResult::ok(catalog.list());
        }
        if let Some(term) = non_empty(input.search.as_deref()) {
            return ToolResult::ok(catalog.search(term));
        }
        if let Some(name) = non_empty(input.info.as_deref()) {
            return match catalog.info(name) {
                Ok(info) => ToolResult::ok(info),
                Err(e) => ToolResult::failure(e.to_string()),
            };
        }
        let Some(name) = non_empty(input.skill_name.as_deref()) else {
            return ToolResult::failure(MISSING_OPERATION);
        };
        match catalog.load(name) {
            Ok(loaded) => ToolResult::ok(loaded),
            Err(e) => {
                tracing::debug!(skill = name, error = %e, "skill load failed");
                ToolResult::failure(e.to_string())
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn announce(index: &SkillIndex, sink: &dyn EventSink) {
    sink.emit(&SkillEvent::Discovered {
        skill_count: index.len(),
        skill_names: index.names(),
        sources: index.sources().to_vec(),
    });
}

/// What a host offers the tool at mount time.
pub struct HostContext {
    /// Global or project settings; `skills.dirs` is consulted.
    pub settings: Value,
    /// Names of events the host's observers may subscribe to.
    pub observable_events: Vec<String>,
    /// Index already resolved by another consumer in this process.
    pub shared_index: Option<Arc<SkillIndex>>,
    /// Destination for notifications.
    pub sink: Arc<dyn EventSink>,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            settings: Value::Null,
            observable_events: Vec::new(),
            shared_index: None,
            sink: Arc::new(TracingSink),
        }
    }
}

impl HostContext {
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            ..Self::default()
        }
    }

    /// Adds `names` to the observable events, keeping existing entries.
    pub fn declare_events(&mut self, names: &[&str]) {
        for name in names {
            if !self.observable_events.iter().any(|e| e == name) {
                self.observable_events.push((*name).to_string());
            }
        }
    }
}

/// Mounts the skills tool into `host`.
///
/// Declares the tool's events, adopts the host's shared index when present
/// (no scan happens), otherwise resolves sources from `config`, and announces
/// the resulting index.
pub fn mount(host: &mut HostContext, config: Option<&Value>) -> Result<SkillsTool, ConfigError> {
    host.declare_events(&[SKILLS_DISCOVERED, SKILL_LOADED]);

    let tool = match &host.shared_index {
        Some(shared) => {
            tracing::debug!(skills = shared.len(), "reusing shared skill index");
            SkillsTool::from_index(shared.clone(), host.sink.clone())
        }
        None => {
            let config = ToolConfig::from_value(config)?;
            let dirs = resolve_dirs(&config, &host.settings)?;
            SkillsTool::discover(&dirs, host.sink.clone())
        }
    };

    let index = tool.index();
    tracing::info!(
        skills = index.len(),
        sources = index.sources().len(),
        "mounted load_skill tool"
    );
    announce(&index, host.sink.as_ref());
    Ok(tool)
}
