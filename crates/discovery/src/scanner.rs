use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::parser::{parse_skill_file, HeaderError, DEFINING_FILE};
use crate::types::{SkillLayout, SkillMetadata, SkillSource};

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Returns the defining file and layout for an entry directly under a source
/// root: `<dir>/SKILL.md` for a folder, the file itself for a bare `*.md`.
fn candidate_file(entry: &DirEntry) -> Option<(PathBuf, SkillLayout)> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        let defining = entry.path().join(DEFINING_FILE);
        defining
            .is_file()
            .then_some((defining, SkillLayout::Folder))
    } else if file_type.is_file() && is_markdown(entry.path()) {
        Some((entry.path().to_path_buf(), SkillLayout::Flat))
    } else {
        None
    }
}

/// Scans one source directory for skills.
///
/// Both layouts are recognized directly under `root`: a folder holding a
/// `SKILL.md`, and a bare `*.md` file. Entries are visited in lexicographic
/// file-name order; when two entries derive the same name the first one
/// visited is kept, so `alpha/` shadows `alpha.md`.
///
/// A missing or unreadable `root` yields an empty map. Files without a header
/// are skipped quietly; files with a broken header are skipped with a warning.
pub fn scan_source(root: &Path) -> BTreeMap<String, SkillMetadata> {
    let mut found = BTreeMap::new();
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "skill source not found; skipping");
        return found;
    }
    let source = SkillSource::Directory(root.to_path_buf());

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let Some((candidate, layout)) = candidate_file(&entry) else {
            continue;
        };

        let meta = match parse_skill_file(&candidate, layout, source.clone()) {
            Ok(meta) => meta,
            Err(HeaderError::NotASkill) => {
                tracing::debug!(path = %candidate.display(), "no metadata header; not a skill");
                continue;
            }
            Err(e) => {
                tracing::warn!(path = %candidate.display(), error = %e, "skipping skill with malformed header");
                continue;
            }
        };

        match found.entry(meta.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(meta);
            }
            Entry::Occupied(kept) => {
                tracing::debug!(
                    name = %meta.name,
                    kept = %kept.get().path.display(),
                    skipped = %meta.path.display(),
                    "duplicate skill name within source; keeping first"
                );
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use skill_loader_test_utils::SkillFixture;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = tempdir().unwrap();
        assert!(scan_source(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn root_that_is_a_file_is_empty() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("file.md");
        write(&file, "---\nname: x\n---\n");
        assert!(scan_source(&file).is_empty());
    }

    #[test]
    fn finds_folder_and_flat_layouts() {
        let tmp = tempdir().unwrap();
        write(
            &tmp.path().join("alpha/SKILL.md"),
            "---\ndescription: folder\n---\nA",
        );
        write(&tmp.path().join("beta.md"), "---\ndescription: flat\n---\nB");

        let found = scan_source(tmp.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found["alpha"].description, "folder");
        assert_eq!(found["beta"].description, "flat");
        assert_eq!(
            found["alpha"].source,
            SkillSource::Directory(tmp.path().to_path_buf())
        );
    }

    #[test]
    fn skips_non_skill_and_malformed_files() {
        let tmp = tempdir().unwrap();
        write(&tmp.path().join("README.md"), "# Not a skill");
        write(&tmp.path().join("notes.txt"), "---\nname: txt\n---\n");
        write(&tmp.path().join("broken/SKILL.md"), "---\nname: [oops\n---\n");
        write(&tmp.path().join("empty-dir/other.md"), "---\nname: nested\n---\n");
        write(&tmp.path().join("good/SKILL.md"), "---\nname: good\n---\nbody");

        let found = scan_source(tmp.path());
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["good"]);
    }

    #[test]
    fn folder_wins_over_flat_file_with_same_name() {
        let tmp = tempdir().unwrap();
        write(
            &tmp.path().join("alpha/SKILL.md"),
            "---\ndescription: from folder\n---\n",
        );
        write(
            &tmp.path().join("alpha.md"),
            "---\ndescription: from file\n---\n",
        );

        let found = scan_source(tmp.path());
        assert_eq!(found.len(), 1);
        assert_eq!(found["alpha"].description, "from folder");
    }

    #[test]
    fn explicit_name_collision_keeps_lexicographically_first() {
        let tmp = tempdir().unwrap();
        write(&tmp.path().join("b.md"), "---\nname: shared\ndescription: b\n---\n");
        write(&tmp.path().join("a.md"), "---\nname: shared\ndescription: a\n---\n");

        let found = scan_source(tmp.path());
        assert_eq!(found["shared"].description, "a");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_does_not_abort_scan() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let secret = tmp.path().join("secret.md");
        write(&secret, "---\nname: secret\n---\n");
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
        write(&tmp.path().join("open.md"), "---\nname: open\n---\n");

        let found = scan_source(tmp.path());
        assert!(found.contains_key("open"));
        // Root ignores permission bits, so only assert on the readable skill.
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn flat_defining_file_in_root_is_named_after_the_file() {
        let fixture = SkillFixture::new().unwrap();
        let root = fixture.source("my-source").unwrap();
        fixture
            .create_flat_skill(&root, "SKILL.md", "---\ndescription: flat in root\n---\nbody")
            .unwrap();
        fixture
            .create_flat_skill(&root, "gamma.md", "---\ndescription: flat gamma\n---\nbody")
            .unwrap();

        let found = scan_source(&root);
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["SKILL", "gamma"]);
        assert!(!found.contains_key("my-source"));
        assert_eq!(found["SKILL"].description, "flat in root");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_root_is_empty() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let root = tmp.path().join("locked");
        write(&root.join("alpha/SKILL.md"), "---\nname: alpha\n---\n");
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not bind root; nothing to check there.
        let readable = fs::read_dir(&root).is_ok();
        let found = scan_source(&root);
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }
        assert!(found.is_empty());
    }
}
