use comet_core::{RunProvenance, SchemaVersion};

#[test]
fn schema_versions_render_and_compare_by_major() {
    assert_eq!(SchemaVersion::CURRENT.to_string(), "1.0.0");
    assert!(SchemaVersion::CURRENT.is_compatible_with(SchemaVersion::new(1, 4, 2)));
    assert!(!SchemaVersion::CURRENT.is_compatible_with(SchemaVersion::new(2, 0, 0)));
}

#[test]
fn provenance_collects_tool_versions() {
    let provenance = RunProvenance::new("abc123", 42, "2024-01-01T00:00:00+00:00")
        .with_tool("comet-mcmc", "0.1.0");
    assert_eq!(provenance.seed, 42);
    assert_eq!(provenance.tool_versions["comet-mcmc"], "0.1.0");

    let json = serde_json::to_string(&provenance).unwrap();
    let restored: RunProvenance = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, provenance);
}
