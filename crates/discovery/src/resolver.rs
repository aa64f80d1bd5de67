use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::scan_source;
use crate::types::{SkillIndex, SkillSource};

/// A skill that lost to a same-named skill from a higher-priority source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShadowedSkill {
    /// The contested name.
    pub name: String,
    /// Source of the record that was kept.
    pub kept_source: SkillSource,
    /// Source of the record that was dropped.
    pub skipped_source: SkillSource,
    /// Defining file of the dropped record.
    pub skipped_path: PathBuf,
}

/// Resolves skills across `dirs`, highest priority first.
///
/// Each directory is scanned in full before the next. A name is owned by the
/// first directory that defines it; later definitions are dropped whole, with
/// no field merging. Missing directories contribute nothing.
pub fn resolve_sources(dirs: &[PathBuf]) -> SkillIndex {
    resolve_sources_with_log(dirs, None)
}

/// Same as [`resolve_sources`], additionally recording every shadowed skill
/// into `shadowed` when provided.
pub fn resolve_sources_with_log(
    dirs: &[PathBuf],
    mut shadowed: Option<&mut Vec<ShadowedSkill>>,
) -> SkillIndex {
    let mut merged = BTreeMap::new();
    for dir in dirs {
        let found = scan_source(dir);
        let total = found.len();
        let mut added = 0usize;
        for (name, meta) in found {
            match merged.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(meta);
                    added += 1;
                }
                Entry::Occupied(kept) => {
                    tracing::debug!(
                        name = %kept.key(),
                        kept = %kept.get().source,
                        skipped = %meta.source,
                        "skill shadowed by higher-priority source"
                    );
                    if let Some(log) = shadowed.as_mut() {
                        log.push(ShadowedSkill {
                            name: kept.key().clone(),
                            kept_source: kept.get().source.clone(),
                            skipped_source: meta.source,
                            skipped_path: meta.path,
                        });
                    }
                }
            }
        }
        tracing::debug!(source = %dir.display(), found = total, added, "scanned skill source");
    }
    tracing::info!(
        skills = merged.len(),
        sources = dirs.len(),
        "resolved skill index"
    );
    SkillIndex::from_resolved(merged, dirs.to_vec())
}
