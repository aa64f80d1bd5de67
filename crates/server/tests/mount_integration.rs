use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use skill_loader::{
    mount, HostContext, MemoryEventSink, SkillEvent, SKILLS_DISCOVERED, SKILL_LOADED,
};
use skill_loader_discovery::{ExtraFields, SkillIndex, SkillMetadata, SkillSource};
use skill_loader_test_utils::{skill_document, SkillFixture};

fn host() -> (HostContext, Arc<MemoryEventSink>) {
    let sink = Arc::new(MemoryEventSink::new());
    (HostContext::with_sink(sink.clone()), sink)
}

fn skills_dir(fixture: &SkillFixture) -> PathBuf {
    fixture.source("skills").unwrap()
}

#[test]
fn mount_declares_observable_events() {
    let fixture = SkillFixture::new().unwrap();
    let (mut host, _) = host();
    let dir = skills_dir(&fixture);

    mount(&mut host, Some(&json!({ "skills_dir": dir }))).unwrap();

    assert!(host.observable_events.iter().any(|e| e == SKILLS_DISCOVERED));
    assert!(host.observable_events.iter().any(|e| e == SKILL_LOADED));
}

#[test]
fn mount_keeps_previously_declared_events() {
    let fixture = SkillFixture::new().unwrap();
    let (mut host, _) = host();
    host.observable_events.push("existing:event".into());

    mount(&mut host, Some(&json!({ "skills_dir": skills_dir(&fixture) }))).unwrap();
    mount(&mut host, Some(&json!({ "skills_dir": skills_dir(&fixture) }))).unwrap();

    assert_eq!(
        host.observable_events,
        vec!["existing:event", SKILLS_DISCOVERED, SKILL_LOADED]
    );
}

#[test]
fn mount_emits_discovery_event() {
    let fixture = SkillFixture::new().unwrap();
    let dir = skills_dir(&fixture);
    for i in 0..3 {
        fixture
            .create_skill(&dir, &format!("skill-{i}"), &format!("Test skill {i}"), "# Test")
            .unwrap();
    }
    let (mut host, sink) = host();

    let tool = mount(&mut host, Some(&json!({ "skills_dirs": [dir.clone()] }))).unwrap();
    assert_eq!(tool.index().len(), 3);

    let events = sink.named(SKILLS_DISCOVERED);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0],
        SkillEvent::Discovered {
            skill_count: 3,
            skill_names: vec!["skill-0".into(), "skill-1".into(), "skill-2".into()],
            sources: vec![dir],
        }
    );
    assert_eq!(
        events[0].payload()["skill_names"],
        json!(["skill-0", "skill-1", "skill-2"])
    );
}

#[test]
fn loading_emits_loaded_event_with_version() {
    let fixture = SkillFixture::new().unwrap();
    let dir = skills_dir(&fixture);
    fixture
        .create_skill_with(
            &dir,
            "test-skill",
            &skill_document(
                &[
                    ("name", "test-skill"),
                    ("description", "Test skill"),
                    ("version", "2.1.0"),
                    ("license", "MIT"),
                ],
                "# Test Content Here",
            ),
        )
        .unwrap();
    let (mut host, sink) = host();
    let tool = mount(&mut host, Some(&json!({ "skills_dir": dir }))).unwrap();

    let result = tool.execute(&json!({ "skill_name": "test-skill" }));
    assert!(result.success);

    let loaded = sink.named(SKILL_LOADED);
    assert_eq!(loaded.len(), 1);
    let payload = loaded[0].payload();
    assert_eq!(payload["skill_name"], "test-skill");
    assert_eq!(payload["version"], "2.1.0");
    assert_eq!(payload["source"], dir.display().to_string());
    assert!(payload["content_length"].as_u64().unwrap() > 0);
}

#[test]
fn mount_reuses_shared_index_without_scanning() {
    let fixture = SkillFixture::new().unwrap();
    let dir = skills_dir(&fixture);
    fixture
        .create_skill(&dir, "on-disk", "Would be found by a scan", "# Disk")
        .unwrap();

    let shared = SkillIndex::from_records(
        vec![SkillMetadata {
            name: "cached-skill".into(),
            description: "From capability".into(),
            version: None,
            license: None,
            path: PathBuf::from("/fake/path/SKILL.md"),
            source: SkillSource::Injected("capability".into()),
            metadata: ExtraFields::new(),
        }],
        vec![dir.clone()],
    )
    .unwrap();
    let shared = Arc::new(shared);
    let (mut host, sink) = host();
    host.shared_index = Some(shared.clone());

    let tool = mount(&mut host, Some(&json!({ "skills_dir": dir }))).unwrap();

    assert!(Arc::ptr_eq(&tool.index(), &shared));
    let list = tool.execute(&json!({ "list": true }));
    assert_eq!(list.output.unwrap()["skills"], json!([{"name": "cached-skill", "description": "From capability"}]));
    assert_eq!(sink.named(SKILLS_DISCOVERED).len(), 1);

    let info = tool.execute(&json!({ "info": "cached-skill" }));
    assert!(info.success);
    assert_eq!(info.output.unwrap()["source"], "capability");

    let load = tool.execute(&json!({ "skill_name": "cached-skill" }));
    assert!(!load.success);
    assert!(load
        .error_message()
        .unwrap()
        .starts_with("Failed to load content from"));
}

#[test]
fn mount_uses_settings_when_config_absent() {
    let fixture = SkillFixture::new().unwrap();
    let dir = skills_dir(&fixture);
    fixture
        .create_skill(&dir, "from-settings", "Configured globally", "# Body")
        .unwrap();
    let (mut host, _) = host();
    host.settings = json!({ "skills": { "dirs": [dir] } });

    let tool = mount(&mut host, None).unwrap();
    assert_eq!(tool.index().names(), vec!["from-settings"]);
}

#[test]
fn mount_rejects_malformed_config() {
    let (mut host, sink) = host();
    assert!(mount(&mut host, Some(&json!({ "skills_dirs": 7 }))).is_err());
    assert!(sink.events().is_empty());
}
