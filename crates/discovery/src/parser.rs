//! Metadata header parsing for skill files.
//!
//! A skill file starts with a YAML front matter block:
//!
//! ```text
//! ---
//! name: design-patterns
//! description: Common architectural patterns
//! version: 1.2.0
//! ---
//!
//! # Body starts here
//! ```
//!
//! Only the lines up to the closing `---` are read, so listing and searching a
//! large collection never pays for the bodies.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_yaml::Value;

use crate::types::{SkillHeader, SkillLayout, SkillMetadata, SkillSource};

/// File name that defines a skill organized as a folder.
pub const DEFINING_FILE: &str = "SKILL.md";

const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

/// Reasons a candidate file does not yield metadata.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// The file does not open with a header block. Not a failure, the file is
    /// simply not a skill.
    #[error("no metadata header")]
    NotASkill,
    /// An opening delimiter was found but the block was never closed.
    #[error("metadata header opened with '---' but never closed")]
    Unterminated,
    /// The header block is not valid YAML.
    #[error("invalid YAML in metadata header: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    /// The header block is valid YAML but not a key-value mapping.
    #[error("metadata header is not a key-value mapping")]
    NotAMapping,
    /// A recognized field holds a value of the wrong shape.
    #[error("metadata field '{key}' has an unsupported value")]
    InvalidField {
        /// The offending key.
        key: String,
    },
    /// No `name` key and no usable file or directory name to derive one from.
    #[error("skill has no name and none can be derived from its path")]
    Unnamed,
    /// The header could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HeaderError {
    /// True when the file is merely not a skill, as opposed to a broken one.
    pub fn is_not_a_skill(&self) -> bool {
        matches!(self, HeaderError::NotASkill)
    }
}

/// Classification of one line while looking for the header block.
enum Step {
    /// Leading blank line or the opening delimiter.
    Skip,
    /// A line inside the block.
    Header,
    /// The closing delimiter.
    Closed,
    /// Content before any opening delimiter.
    NotHeader,
}

/// Tracks delimiters line by line. Shared by the parser and the body
/// extractor so both agree on exactly where the header ends.
#[derive(Default)]
struct Delimiters {
    opened: bool,
}

impl Delimiters {
    fn step(&mut self, line: &str) -> Step {
        if self.opened {
            return if line.trim_end() == DELIMITER {
                Step::Closed
            } else {
                Step::Header
            };
        }
        let trimmed = line.trim_start_matches(BOM).trim();
        if trimmed.is_empty() {
            Step::Skip
        } else if trimmed == DELIMITER {
            self.opened = true;
            Step::Skip
        } else {
            Step::NotHeader
        }
    }
}

/// Reads the raw YAML between the delimiters, stopping at the closing one.
///
/// Lines are decoded one at a time. A line that is not UTF-8 before the
/// opening delimiter means the file is not a skill.
fn read_header_block<R: BufRead>(mut reader: R) -> Result<String, HeaderError> {
    let mut delimiters = Delimiters::default();
    let mut yaml = String::new();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            return Err(if delimiters.opened {
                HeaderError::Unterminated
            } else {
                HeaderError::NotASkill
            });
        }
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line,
            Err(_) if !delimiters.opened => return Err(HeaderError::NotASkill),
            Err(e) => return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e).into()),
        };
        match delimiters.step(line) {
            Step::Skip => {}
            Step::Header => yaml.push_str(line),
            Step::Closed => return Ok(yaml),
            Step::NotHeader => return Err(HeaderError::NotASkill),
        }
    }
}

/// Byte offset just past the closing delimiter, or `None` when the content has
/// no header block.
pub(crate) fn header_end(content: &str) -> Result<Option<usize>, HeaderError> {
    let mut delimiters = Delimiters::default();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        match delimiters.step(line) {
            Step::Closed => return Ok(Some(offset)),
            Step::NotHeader => return Ok(None),
            Step::Skip | Step::Header => {}
        }
    }
    if delimiters.opened {
        Err(HeaderError::Unterminated)
    } else {
        Ok(None)
    }
}

fn scalar_field(key: &str, value: Value) -> Result<Option<String>, HeaderError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(HeaderError::InvalidField {
            key: key.to_string(),
        }),
    }
}

fn map_key(key: Value) -> Result<String, HeaderError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(HeaderError::NotAMapping),
    }
}

/// Turns header YAML into a [`SkillHeader`], routing unknown keys into the
/// open `extra` map.
fn header_from_yaml(yaml: &str) -> Result<SkillHeader, HeaderError> {
    let value: Value = if yaml.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(yaml)?
    };
    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => serde_yaml::Mapping::new(),
        _ => return Err(HeaderError::NotAMapping),
    };

    let mut header = SkillHeader::default();
    for (key, value) in mapping {
        let key = map_key(key)?;
        match key.as_str() {
            "name" => {
                header.name = scalar_field(&key, value)?
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty());
            }
            "description" => header.description = scalar_field(&key, value)?.unwrap_or_default(),
            "version" => header.version = scalar_field(&key, value)?,
            "license" => header.license = scalar_field(&key, value)?,
            _ => {
                let json = serde_json::to_value(&value)
                    .map_err(|_| HeaderError::InvalidField { key: key.clone() })?;
                header.extra.insert(key, json);
            }
        }
    }
    Ok(header)
}

/// Parses the header at the top of in-memory content.
pub fn parse_header(content: &str) -> Result<SkillHeader, HeaderError> {
    let yaml = read_header_block(content.as_bytes())?;
    header_from_yaml(&yaml)
}

/// Reads only the header block of the file at `path` and parses it.
pub fn read_header(path: &Path) -> Result<SkillHeader, HeaderError> {
    let file = File::open(path)?;
    let yaml = read_header_block(BufReader::new(file))?;
    header_from_yaml(&yaml)
}

/// Derives a skill name from its defining file.
///
/// A folder skill `alpha/SKILL.md` yields `alpha`; a flat `beta.md` yields
/// `beta`, including a flat `SKILL.md` which yields `SKILL`.
pub fn derive_name(path: &Path, layout: SkillLayout) -> Option<String> {
    let stem = match layout {
        SkillLayout::Folder => path.parent().and_then(|p| p.file_name()),
        SkillLayout::Flat => path.file_stem(),
    };
    stem.and_then(|s| s.to_str())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

/// Reads the header of `path` and builds its metadata record, tagged with
/// `source`. `layout` decides how a missing name is derived.
pub fn parse_skill_file(
    path: &Path,
    layout: SkillLayout,
    source: SkillSource,
) -> Result<SkillMetadata, HeaderError> {
    let header = read_header(path)?;
    let fallback = match derive_name(path, layout) {
        Some(derived) => derived,
        None if header.name.is_some() => String::new(),
        None => return Err(HeaderError::Unnamed),
    };
    Ok(SkillMetadata::from_header(
        header,
        fallback,
        path.to_path_buf(),
        source,
    ))
}
