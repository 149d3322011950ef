use flamegraph_chart::{ChartConfig, ChartSession, JsonRenderer, SessionError, TextRenderer};
use span_tree::{DatasetError, DuplicatePolicy, IndexError, SpanId};
use std::path::PathBuf;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

const FRONTEND: &str = r#"{"items": [
    {"id": 1, "name": "GET /checkout", "duration": 120},
    {"id": 3, "parentId": 1, "name": "render", "duration": 30}
]}"#;

const BACKEND: &str = r#"{"items": [
    {"id": 2, "parentId": 1, "name": "POST /payments", "duration": 80,
     "destination": {"service": {"label": "payments"}, "endpoint": {"label": "/payments", "type": "http"}}}
]}"#;

#[test]
fn test_selection_renders_merged_tree() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write(&dir, "frontend.json", FRONTEND), write(&dir, "backend.json", BACKEND)];

    let mut session = ChartSession::new(ChartConfig::default(), JsonRenderer::new(Vec::new(), false));
    let dataset = session.on_files_selected(paths).unwrap();
    assert_eq!(dataset.tree.node_count(), 3);

    let checkout = dataset.tree.find(&SpanId::from(1)).unwrap();
    let children: Vec<_> = checkout.children.iter().map(|c| c.id.clone()).collect();
    assert_eq!(children, vec![SpanId::from(2), SpanId::from(3)]);

    let details = session.details(&SpanId::from(2)).unwrap();
    assert_eq!(details.value("service label"), Some("payments"));
    assert_eq!(details.value("endpoint type"), Some("http"));

    let output = String::from_utf8(session.into_renderer().into_inner()).unwrap();
    let document: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(document["tree"]["children"][0]["name"], "GET /checkout");
}

#[test]
fn test_bad_file_aborts_selection() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write(&dir, "frontend.json", FRONTEND), write(&dir, "broken.json", "{\"items\": [")];

    let mut session = ChartSession::new(ChartConfig::default(), TextRenderer::new(Vec::new()));
    let err = session.on_files_selected(paths).unwrap_err();
    assert!(matches!(err, SessionError::Load(DatasetError::Load(_))));
    assert!(session.dataset().is_none());
}

#[test]
fn test_reject_policy_surfaces_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write(&dir, "a.json", FRONTEND), write(&dir, "b.json", FRONTEND)];

    let config = ChartConfig {
        duplicate_policy: DuplicatePolicy::Reject,
        ..ChartConfig::default()
    };
    let mut session = ChartSession::new(config, TextRenderer::new(Vec::new()));
    let err = session.on_files_selected(paths).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Load(DatasetError::Index(IndexError::DuplicateId(ref id))) if *id == SpanId::from(1)
    ));
}

#[test]
fn test_background_load_superseded_by_new_selection() {
    let dir = tempfile::tempdir().unwrap();
    let first_paths = vec![write(&dir, "frontend.json", FRONTEND)];
    let second_paths = vec![write(&dir, "backend.json", BACKEND)];

    let mut session =
        ChartSession::new(ChartConfig::default(), TextRenderer::new(Vec::new())).with_auto_draw(false);

    let slow = session.begin_load(first_paths);
    let worker = {
        let ticket = slow.clone();
        std::thread::spawn(move || ticket.run())
    };

    let current = session.begin_load(second_paths);
    let current_result = current.run();
    session.finish_load(&current, current_result).unwrap();

    let stale = session.finish_load(&slow, worker.join().unwrap()).unwrap_err();
    assert!(matches!(stale, SessionError::StaleLoad { .. }));

    // the newer selection is still the one on display
    let dataset = session.dataset().unwrap();
    assert_eq!(dataset.tree.node_count(), 1);
    assert!(dataset.tree.find(&SpanId::from(2)).is_some());
}
