//! Snapshot sequencing against a scripted page session

mod common;

use common::{FakeSession, PNG_1X1, started};
use kodegen_tools_rendersnap::capture_engine::CaptureError;
use kodegen_tools_rendersnap::network_idle::IdleConfig;
use kodegen_tools_rendersnap::page_session::js_scripts::SNAPSHOT_SCRIPT;
use kodegen_tools_rendersnap::snapshot::{SnapshotOptions, capture};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const URL: &str = "https://shop.example.com/";

fn options() -> SnapshotOptions {
    SnapshotOptions {
        idle: IdleConfig {
            idle_window: Duration::from_millis(20),
            hard_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(5),
        },
        navigation_timeout: Duration::from_secs(5),
        selector_timeout: Duration::from_secs(5),
        ..SnapshotOptions::default()
    }
}

fn rendered_page() -> serde_json::Value {
    json!({
        "doctype": "<!DOCTYPE html>",
        "outerHTML": format!(
            r#"<html><head><title>Shop</title></head><body><div id="app"><img src="data:image/png;base64,{PNG_1X1}"><p>Loaded</p></div></body></html>"#
        ),
    })
}

#[tokio::test]
async fn test_steps_run_in_order_and_file_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new().with_response(SNAPSHOT_SCRIPT, rendered_page());

    let summary = capture(&session, URL, &out_file, &options(), &CancellationToken::new())
        .await
        .expect("capture succeeds");

    assert_eq!(
        session.calls(),
        vec![
            "subscribe".to_string(),
            format!("navigate {URL}"),
            "wait body Ready".to_string(),
            "wait #app Visible".to_string(),
            "evaluate".to_string(),
        ]
    );

    assert_eq!(summary.assets_saved, 1);
    assert_eq!(summary.html_path, out_file);
    assert_eq!(summary.asset_dir, dir.path().join("assets"));

    let html = std::fs::read_to_string(&out_file).expect("rendered html");
    assert!(html.starts_with("<!DOCTYPE html>\n<html>\n"));
    assert!(html.contains("<title>Shop</title>"));
    assert!(html.contains(r#"<img src="assets/b64_"#));
    assert!(!html.contains("base64"));
    assert_eq!(summary.html_bytes, html.len());
}

#[tokio::test]
async fn test_navigation_failure_aborts_before_anything_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new()
        .with_response(SNAPSHOT_SCRIPT, rendered_page())
        .failing_navigation();

    let err = capture(&session, URL, &out_file, &options(), &CancellationToken::new())
        .await
        .expect_err("navigation fails");

    assert!(matches!(err, CaptureError::Navigation { .. }));
    assert!(!err.is_idle_timeout());
    assert!(!out_file.exists());
    assert!(!session.calls().iter().any(|c| c == "evaluate"));
}

#[tokio::test]
async fn test_missing_root_marker_aborts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new()
        .with_response(SNAPSHOT_SCRIPT, rendered_page())
        .with_missing_selector("#app");

    let err = capture(&session, URL, &out_file, &options(), &CancellationToken::new())
        .await
        .expect_err("root never mounts");

    match err {
        CaptureError::Selector { selector, .. } => assert_eq!(selector, "#app"),
        other => panic!("expected selector error, got {other:?}"),
    }
    assert!(!out_file.exists());
}

#[tokio::test]
async fn test_required_selector_must_match_elements() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new()
        .with_response(SNAPSHOT_SCRIPT, rendered_page())
        .with_count(".category-tab-item", 0);
    let options = SnapshotOptions {
        required_selectors: vec![".category-tab-item".to_string()],
        ..options()
    };

    let err = capture(&session, URL, &out_file, &options, &CancellationToken::new())
        .await
        .expect_err("no tabs rendered");

    match err {
        CaptureError::Selector { selector, message } => {
            assert_eq!(selector, ".category-tab-item");
            assert_eq!(message, "no matching elements");
        }
        other => panic!("expected selector error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_required_selector_with_matches_passes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new()
        .with_response(SNAPSHOT_SCRIPT, rendered_page())
        .with_count(".category-tab-item", 4);
    let options = SnapshotOptions {
        required_selectors: vec![".category-tab-item".to_string()],
        ..options()
    };

    capture(&session, URL, &out_file, &options, &CancellationToken::new())
        .await
        .expect("capture succeeds");

    let calls = session.calls();
    let wait = calls
        .iter()
        .position(|c| c == "wait .category-tab-item Visible")
        .expect("waited for required selector");
    assert_eq!(calls[wait + 1], "count");
}

#[tokio::test(start_paused = true)]
async fn test_busy_network_surfaces_idle_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new()
        .with_subscription(vec![(Duration::from_millis(5), started("poll"))])
        .with_response(SNAPSHOT_SCRIPT, rendered_page());

    let err = capture(&session, URL, &out_file, &options(), &CancellationToken::new())
        .await
        .expect_err("request never finishes");

    assert!(err.is_idle_timeout());
    assert!(!session.calls().iter().any(|c| c.starts_with("wait #app")));
    assert!(!out_file.exists());
}

#[tokio::test]
async fn test_cancelled_token_stops_capture() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_file = dir.path().join("rendered_after_js.html");
    let session = FakeSession::new().with_response(SNAPSHOT_SCRIPT, rendered_page());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = capture(&session, URL, &out_file, &options(), &cancel)
        .await
        .expect_err("cancelled");

    assert!(err.is_cancelled());
    assert!(session.calls().is_empty() || session.calls() == vec!["subscribe".to_string()]);
}
