//! Discovery, indexing, and lazy loading of skill documents.
//!
//! This crate provides mechanisms for:
//! - Reading a skill's metadata header without touching its body.
//! - Scanning a source directory for skills.
//! - Merging ranked sources with first-match-wins semantics.
//! - Extracting a skill body on demand.
//!
//! # Examples
//!
//! ```
//! use skill_loader_discovery::{extract_body, resolve_sources};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let skill_dir = temp.path().join("alpha");
//! std::fs::create_dir_all(&skill_dir).unwrap();
//! std::fs::write(
//!     skill_dir.join("SKILL.md"),
//!     "---\nname: alpha\ndescription: First letter\n---\n\n# Alpha\n",
//! )
//! .unwrap();
//!
//! let index = resolve_sources(&[temp.path().to_path_buf()]);
//! assert_eq!(index.len(), 1);
//!
//! let alpha = index.get("alpha").unwrap();
//! assert_eq!(alpha.description, "First letter");
//! assert_eq!(extract_body(&alpha.path).unwrap(), "# Alpha\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Lazy body extraction.
pub mod body;
/// Metadata header parsing.
pub mod parser;
/// Multi-source resolution.
pub mod resolver;
/// Single-directory scanning.
pub mod scanner;
/// Skill metadata and index types.
pub mod types;

pub use body::{extract_body, strip_header, ExtractError};
pub use parser::{
    derive_name, parse_header, parse_skill_file, read_header, HeaderError, DEFINING_FILE,
};
pub use resolver::{resolve_sources, resolve_sources_with_log, ShadowedSkill};
pub use scanner::scan_source;
pub use types::{
    ExtraFields, IndexError, SkillHeader, SkillIndex, SkillLayout, SkillMetadata, SkillSource,
};
