use skill_loader_discovery::{
    extract_body, read_header, resolve_sources, scan_source, SkillSource,
};
use skill_loader_test_utils::{skill_document, SkillFixture};
use std::fs;

#[test]
fn round_trip_header_and_body() {
    let fixture = SkillFixture::new().unwrap();
    let source = fixture.source("skills").unwrap();
    let path = fixture
        .create_skill_with(
            &source,
            "a",
            &skill_document(
                &[("name", "A"), ("description", "D"), ("version", "V")],
                "Body text here.\n",
            ),
        )
        .unwrap();

    let index = resolve_sources(&[source.clone()]);
    let meta = index.get("A").unwrap();
    assert_eq!(meta.name, "A");
    assert_eq!(meta.description, "D");
    assert_eq!(meta.version.as_deref(), Some("V"));
    assert_eq!(meta.path, path);
    assert_eq!(meta.source, SkillSource::Directory(source));

    let body = extract_body(&meta.path).unwrap();
    assert!(body.contains("Body text here."));
    assert!(!body.contains("description: D"));
    assert!(!body.starts_with("---"));
}

#[test]
fn malformed_file_does_not_abort_scan() {
    let fixture = SkillFixture::new().unwrap();
    let source = fixture.source("skills").unwrap();
    fixture
        .create_skill_with(&source, "broken", "---\nname: broken\ndescription: [unclosed\n---\n")
        .unwrap();
    fixture
        .create_skill(&source, "healthy", "Works", "# Healthy")
        .unwrap();

    let index = resolve_sources(&[source]);
    assert_eq!(index.names(), vec!["healthy"]);
}

#[test]
fn no_existing_sources_yield_empty_index() {
    let fixture = SkillFixture::new().unwrap();
    let dirs = vec![
        fixture.missing_source("workspace"),
        fixture.missing_source("user"),
    ];
    let index = resolve_sources(&dirs);
    assert!(index.is_empty());
    assert_eq!(index.sources().len(), 2);
}

#[test]
fn metadata_survives_body_removal() {
    let fixture = SkillFixture::new().unwrap();
    let source = fixture.source("skills").unwrap();
    let path = fixture
        .create_skill(&source, "ephemeral", "Will vanish", "# Body")
        .unwrap();

    let index = resolve_sources(&[source]);
    fs::remove_file(&path).unwrap();

    let meta = index.get("ephemeral").unwrap();
    assert_eq!(meta.description, "Will vanish");
    assert!(extract_body(&meta.path).is_err());
}

#[test]
fn header_read_stops_before_large_body() {
    let fixture = SkillFixture::new().unwrap();
    let source = fixture.source("skills").unwrap();
    let mut bytes = b"---\nname: big\ndescription: Large body\n---\n\n".to_vec();
    // Invalid UTF-8 in the body: any attempt to read it as text would fail.
    bytes.extend(std::iter::repeat(0xffu8).take(64 * 1024));
    let path = source.join("big.md");
    fs::write(&path, bytes).unwrap();

    let header = read_header(&path).unwrap();
    assert_eq!(header.description, "Large body");
    assert!(scan_source(&source).contains_key("big"));
    assert!(extract_body(&path).is_err());
}
