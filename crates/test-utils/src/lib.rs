//! Shared test utilities for skill-loader crates.
//!
//! Provides temporary skill source directories and a guard for tests that
//! touch process-global environment variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = skill_loader_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Renders a skill file with a front matter header and a body.
///
/// `fields` are written in order as `key: value` lines.
pub fn skill_document(fields: &[(&str, &str)], body: &str) -> String {
    let mut doc = String::from("---\n");
    for (key, value) in fields {
        doc.push_str(key);
        doc.push_str(": ");
        doc.push_str(value);
        doc.push('\n');
    }
    doc.push_str("---\n\n");
    doc.push_str(body);
    doc
}

/// Temporary directory holding any number of skill sources.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct SkillFixture {
    pub tempdir: tempfile::TempDir,
}

impl SkillFixture {
    /// Create an empty fixture.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            tempdir: tempfile::tempdir()?,
        })
    }

    /// Create (if needed) and return the source directory `name`.
    pub fn source(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.tempdir.path().join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path of a source directory that is never created.
    pub fn missing_source(&self, name: &str) -> PathBuf {
        self.tempdir.path().join("missing").join(name)
    }

    /// Write `<source>/<name>/SKILL.md` with a `name` and `description` header.
    ///
    /// Returns the path to the defining file.
    pub fn create_skill(
        &self,
        source: &Path,
        name: &str,
        description: &str,
        body: &str,
    ) -> io::Result<PathBuf> {
        self.create_skill_with(
            source,
            name,
            &skill_document(&[("name", name), ("description", description)], body),
        )
    }

    /// Write `<source>/<folder>/SKILL.md` with raw `content`.
    pub fn create_skill_with(
        &self,
        source: &Path,
        folder: &str,
        content: &str,
    ) -> io::Result<PathBuf> {
        let skill_dir = source.join(folder);
        fs::create_dir_all(&skill_dir)?;
        let path = skill_dir.join("SKILL.md");
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a flat `<source>/<file_name>` with raw `content`.
    pub fn create_flat_skill(
        &self,
        source: &Path,
        file_name: &str,
        content: &str,
    ) -> io::Result<PathBuf> {
        fs::create_dir_all(source)?;
        let path = source.join(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }
}
