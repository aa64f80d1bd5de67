//! Read operations over a resolved skill index.
//!
//! A [`SkillCatalog`] never rescans. `list`, `search`, and `info` work purely
//! from in-memory metadata; only `load` touches the defining file.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use skill_loader_discovery::{
    extract_body, ExtraFields, ExtractError, SkillIndex, SkillMetadata, SkillSource,
};

use crate::events::{EventSink, SkillEvent};

/// Name and description pair returned by listing and searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub description: String,
}

impl From<&SkillMetadata> for SkillSummary {
    fn from(meta: &SkillMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            description: meta.description.clone(),
        }
    }
}

/// Result of [`SkillCatalog::list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillList {
    /// Human-oriented rendering.
    pub message: String,
    /// Every skill, sorted by name.
    pub skills: Vec<SkillSummary>,
}

/// Result of [`SkillCatalog::search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Human-oriented rendering.
    pub message: String,
    /// Matching skills, sorted by name. May be empty.
    pub matches: Vec<SkillSummary>,
}

/// Full metadata for one skill, without its body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInfo {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub license: Option<String>,
    pub path: PathBuf,
    pub source: SkillSource,
    /// Additional header fields; omitted when there are none.
    #[serde(skip_serializing_if = "ExtraFields::is_empty")]
    pub metadata: ExtraFields,
}

impl From<&SkillMetadata> for SkillInfo {
    fn from(meta: &SkillMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            description: meta.description.clone(),
            version: meta.version.clone(),
            license: meta.license.clone(),
            path: meta.path.clone(),
            source: meta.source.clone(),
            metadata: meta.metadata.clone(),
        }
    }
}

/// A fully loaded skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedSkill {
    /// Body prefixed with a `# <name>` title.
    pub content: String,
    pub name: String,
    /// Directory holding the defining file and its companion files.
    pub companion_directory: PathBuf,
    /// Where the skill was resolved from.
    pub source: SkillSource,
}

/// Failures surfaced by lookups.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No skill with that name is indexed.
    #[error("Skill '{name}' not found. Available: {}", available.join(", "))]
    NotFound {
        name: String,
        /// Every indexed name, sorted.
        available: Vec<String>,
    },
    /// The skill is indexed but its body cannot be read now.
    #[error("Failed to load content from {}", path.display())]
    Extraction {
        name: String,
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
}

/// Query surface over one immutable [`SkillIndex`].
#[derive(Clone)]
pub struct SkillCatalog {
    index: Arc<SkillIndex>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SkillCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillCatalog")
            .field("skills", &self.index.len())
            .field("sources", &self.index.sources())
            .finish()
    }
}

impl SkillCatalog {
    pub fn new(index: Arc<SkillIndex>, sink: Arc<dyn EventSink>) -> Self {
        Self { index, sink }
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<SkillIndex> {
        &self.index
    }

    /// All skills sorted by name. An empty index is a normal result whose
    /// message names the configured sources.
    pub fn list(&self) -> SkillList {
        if self.index.is_empty() {
            return SkillList {
                message: no_skills_message(self.index.sources()),
                skills: Vec::new(),
            };
        }
        let skills: Vec<SkillSummary> = self.index.iter().map(SkillSummary::from).collect();
        let mut lines = vec!["Available Skills:".to_string(), String::new()];
        lines.extend(render_summaries(&skills));
        SkillList {
            message: lines.join("\n"),
            skills,
        }
    }

    /// Case-insensitive substring match against name or description.
    pub fn search(&self, term: &str) -> SearchResults {
        let needle = term.to_lowercase();
        let matches: Vec<SkillSummary> = self
            .index
            .iter()
            .filter(|meta| {
                meta.name.to_lowercase().contains(&needle)
                    || meta.description.to_lowercase().contains(&needle)
            })
            .map(SkillSummary::from)
            .collect();

        if matches.is_empty() {
            return SearchResults {
                message: format!("No skills matching '{term}'"),
                matches,
            };
        }
        let mut lines = vec![format!("Skills matching '{term}':"), String::new()];
        lines.extend(render_summaries(&matches));
        SearchResults {
            message: lines.join("\n"),
            matches,
        }
    }

    /// Metadata for `name`. Never reads the defining file.
    pub fn info(&self, name: &str) -> Result<SkillInfo, QueryError> {
        self.lookup(name).map(SkillInfo::from)
    }

    /// Reads the body of `name` from disk and emits a `skill:loaded` event.
    pub fn load(&self, name: &str) -> Result<LoadedSkill, QueryError> {
        let meta = self.lookup(name)?;
        let body = extract_body(&meta.path).map_err(|source| QueryError::Extraction {
            name: meta.name.clone(),
            path: meta.path.clone(),
            source,
        })?;

        tracing::info!(skill = %meta.name, source = %meta.source, bytes = body.len(), "loaded skill");
        self.sink.emit(&SkillEvent::Loaded {
            skill_name: meta.name.clone(),
            source: meta.source.label(),
            content_length: body.chars().count(),
            version: meta.version.clone(),
        });

        Ok(LoadedSkill {
            content: format!("# {}\n\n{}", meta.name, body),
            name: meta.name.clone(),
            companion_directory: meta.companion_directory().to_path_buf(),
            source: meta.source.clone(),
        })
    }

    fn lookup(&self, name: &str) -> Result<&SkillMetadata, QueryError> {
        self.index.get(name).ok_or_else(|| QueryError::NotFound {
            name: name.to_string(),
            available: self.index.names(),
        })
    }
}

fn render_summaries(skills: &[SkillSummary]) -> impl Iterator<Item = String> + '_ {
    skills
        .iter()
        .map(|s| format!("**{}**: {}", s.name, s.description))
}

fn no_skills_message(sources: &[PathBuf]) -> String {
    if sources.is_empty() {
        return "No skills found (no skill directories configured)".to_string();
    }
    let joined = sources
        .iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("No skills found in {joined}")
}
