//! Fire-and-forget notifications about discovery and loading.
//!
//! The catalog and the tool only depend on [`EventSink`]; nothing they do
//! changes based on whether an event is observed.

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::Serialize;

/// Event name emitted once an index has been resolved.
pub const SKILLS_DISCOVERED: &str = "skills:discovered";
/// Event name emitted after a successful full load.
pub const SKILL_LOADED: &str = "skill:loaded";

/// Notifications published by this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SkillEvent {
    /// An index was resolved or adopted.
    Discovered {
        /// Number of skills in the index.
        skill_count: usize,
        /// Skill names, sorted.
        skill_names: Vec<String>,
        /// Source directories considered, highest priority first.
        sources: Vec<PathBuf>,
    },
    /// A skill body was loaded.
    Loaded {
        /// Name of the loaded skill.
        skill_name: String,
        /// Provenance label of the skill.
        source: String,
        /// Length of the returned body in characters.
        content_length: usize,
        /// Skill version, if declared.
        version: Option<String>,
    },
}

impl SkillEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            SkillEvent::Discovered { .. } => SKILLS_DISCOVERED,
            SkillEvent::Loaded { .. } => SKILL_LOADED,
        }
    }

    /// Event payload as JSON.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Receiver of [`SkillEvent`]s.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Must not fail the caller.
    fn emit(&self, event: &SkillEvent);
}

impl<F> EventSink for F
where
    F: Fn(&SkillEvent) + Send + Sync,
{
    fn emit(&self, event: &SkillEvent) {
        self(event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &SkillEvent) {}
}

/// Logs every event at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &SkillEvent) {
        tracing::info!(event = event.name(), payload = %event.payload(), "skill event");
    }
}

/// In-memory sink for tests and embedding hosts that poll.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<SkillEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event received so far.
    pub fn events(&self) -> Vec<SkillEvent> {
        self.events.lock().clone()
    }

    /// Events received so far with the given name.
    pub fn named(&self, name: &str) -> Vec<SkillEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &SkillEvent) {
        self.events.lock().push(event.clone());
    }
}
