//! Follow a watch endpoint served by a local axum server.
#![cfg(feature = "http-server")]

use axum::Router;
use axum::routing::get;
use linkwatch::diff::{DiffError, follow_watch};

const WATCH_BODY: &str = concat!(
    r#"{"type":"ADDED","object":{"metadata":{"name":"web"},"spec":{"port":80}}}"#,
    "\n",
    r#"{"type":"MODIFIED","object":{"metadata":{"name":"web"},"spec":{"port":8080}}}"#,
    "\n",
);

async fn spawn_server() -> String {
    let app = Router::new().route("/watch", get(|| async { WATCH_BODY }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_follow_watch_diffs_each_object() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let mut out = Vec::new();

    follow_watch(&client, &format!("{base}/watch"), false, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("ADDED\n--- old (none)\n"));
    assert!(text.contains("\n\nMODIFIED\n--- old "));
    assert!(text.contains("-    \"port\": 80\n+    \"port\": 8080\n"));
    assert_eq!(text.matches("@@ 0,").count(), 2);
}

#[tokio::test]
async fn test_follow_watch_rejects_error_status() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();
    let mut out = Vec::new();

    let err = follow_watch(&client, &format!("{base}/missing"), true, &mut out)
        .await
        .unwrap_err();

    match err {
        DiffError::Status { status, .. } => assert_eq!(status, reqwest::StatusCode::NOT_FOUND),
        other => panic!("unexpected error: {other}"),
    }
    assert!(out.is_empty());
}
