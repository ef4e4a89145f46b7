use super::*;

#[test]
fn orchestrator_exposes_both_sub_agents() {
    let spec = AgentSpec::orchestrator();
    assert_eq!(spec.tools, vec!["script_sequencer_agent", "video_agent"]);
    assert!(spec.has_tool(VIDEO_TOOL));
    assert!(!spec.has_tool("merge_agent"));
    assert!(spec.instruction.contains("MERGE SCRIPT"));
}

#[test]
fn display_url_rewrites_only_gs_prefix() {
    assert_eq!(
        display_url("gs://bucket/views/nova_1.png"),
        "https://storage.mtls.cloud.google.com/bucket/views/nova_1.png"
    );
    assert_eq!(display_url("https://example.com/gs://x"), "https://example.com/gs://x");
    assert_eq!(display_url("gs:/bucket"), "gs:/bucket");
    assert!(matches!(display_url("s3://b/k"), Cow::Borrowed(_)));
}
