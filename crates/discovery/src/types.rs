use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Open bag of header fields that have no dedicated slot on [`SkillMetadata`].
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

/// Represents the origin of a resolved skill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SkillSource {
    /// A source directory that was scanned.
    Directory(PathBuf),
    /// A synthetic label for metadata supplied from outside a scan
    /// (for example a shared registry).
    Injected(String),
}

impl SkillSource {
    /// Returns a stable label for this source.
    pub fn label(&self) -> String {
        match self {
            SkillSource::Directory(dir) => dir.display().to_string(),
            SkillSource::Injected(label) => label.clone(),
        }
    }
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillSource::Directory(dir) => write!(f, "{}", dir.display()),
            SkillSource::Injected(label) => f.write_str(label),
        }
    }
}

/// How a skill is laid out inside its source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLayout {
    /// A folder holding a `SKILL.md` and any companion files.
    Folder,
    /// A single markdown file directly in the source directory.
    Flat,
}

/// Header fields read from the top of a skill file.
///
/// Produced by the parser without touching the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillHeader {
    /// The `name` key, if present.
    pub name: Option<String>,
    /// The `description` key; absent and `null` both become empty.
    pub description: String,
    /// The `version` key, free-form.
    pub version: Option<String>,
    /// The `license` key.
    pub license: Option<String>,
    /// Every other key in the header.
    pub extra: ExtraFields,
}

/// Metadata for a discovered skill.
///
/// Records are created during a scan and never mutated once they are part of
/// a [`SkillIndex`]. The body is never cached here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMetadata {
    /// The skill name (from the header, or derived from the path).
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// Optional free-form version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional license identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Path to the defining file.
    pub path: PathBuf,
    /// Where this skill was resolved from.
    pub source: SkillSource,
    /// Additional header fields, preserved as-is.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ExtraFields,
}

impl SkillMetadata {
    /// Builds a record from a parsed header. `fallback_name` is used when the
    /// header does not carry a `name` key.
    pub fn from_header(
        header: SkillHeader,
        fallback_name: String,
        path: PathBuf,
        source: SkillSource,
    ) -> Self {
        Self {
            name: header.name.unwrap_or(fallback_name),
            description: header.description,
            version: header.version,
            license: header.license,
            path,
            source,
            metadata: header.extra,
        }
    }

    /// Directory holding the defining file and any companion files.
    pub fn companion_directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Reasons an externally supplied index is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// A record had an empty `name`.
    #[error("skill at {} has an empty name", path.display())]
    EmptyName {
        /// The offending record's path.
        path: PathBuf,
    },
    /// Two records shared a `name`.
    #[error("duplicate skill name '{0}'")]
    DuplicateName(String),
}

/// The merged, name-keyed set of skills plus the directories considered.
///
/// Names are unique by construction. Iteration is ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillIndex {
    skills: BTreeMap<String, SkillMetadata>,
    sources: Vec<PathBuf>,
}

impl SkillIndex {
    pub(crate) fn from_resolved(
        skills: BTreeMap<String, SkillMetadata>,
        sources: Vec<PathBuf>,
    ) -> Self {
        Self { skills, sources }
    }

    /// Builds an index from pre-resolved records, such as ones shared by
    /// another consumer in the same process.
    ///
    /// Records must have non-empty, unique names.
    pub fn from_records(
        records: impl IntoIterator<Item = SkillMetadata>,
        sources: Vec<PathBuf>,
    ) -> Result<Self, IndexError> {
        let mut skills = BTreeMap::new();
        for record in records {
            if record.name.trim().is_empty() {
                return Err(IndexError::EmptyName { path: record.path });
            }
            if skills.contains_key(&record.name) {
                return Err(IndexError::DuplicateName(record.name));
            }
            skills.insert(record.name.clone(), record);
        }
        Ok(Self { skills, sources })
    }

    /// Looks up a skill by exact name.
    pub fn get(&self, name: &str) -> Option<&SkillMetadata> {
        self.skills.get(name)
    }

    /// All skills, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &SkillMetadata> {
        self.skills.values()
    }

    /// All skill names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.skills.keys().cloned().collect()
    }

    /// Directories that were considered, highest priority first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Number of skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the index holds no skills.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
