use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;
use triage_core::persist::{save_snapshot, IndexPaths, MetaFile};
use triage_core::{QueryParams, TicketIndex};
use server::{build_app, IndexSource};

const DATASET: &str = "ticket_id,description,category,priority,resolution
1,VPN connection fails after password reset,VPN,High,Reset VPN credentials
2,Printer not responding on network,Printer,Low,Restart print spooler
3,Outlook crashing when opening shared mailbox,Email,Medium,Rebuild Outlook profile
";

fn write_dataset(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("tickets.csv");
    fs::write(&path, DATASET).unwrap();
    path
}

fn app(dir: &std::path::Path) -> Router {
    let source = IndexSource::Dataset(write_dataset(dir));
    build_app(&source, QueryParams::default()).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn suggest_returns_ranked_resolutions() {
    let dir = tempdir().unwrap();
    let body = json!({ "description": "VPN login not working, password reset needed", "top_k": 1, "threshold": 0.05 });
    let (status, json) = send(app(dir.path()), post_json("/suggest", body)).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["ticket_id"], 1);
    assert_eq!(results[0]["resolution"], "Reset VPN credentials");
    assert!(results[0]["similarity_score"].as_f64().unwrap() > 0.0);
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn suggest_with_only_stop_words_is_empty() {
    let dir = tempdir().unwrap();
    let (status, json) = send(app(dir.path()), post_json("/suggest", json!({ "description": "is a it of to" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn out_of_range_threshold_is_rejected() {
    let dir = tempdir().unwrap();
    let body = json!({ "description": "printer offline", "threshold": 1.5 });
    let (status, _) = send(app(dir.path()), post_json("/suggest", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_top_k_is_rejected() {
    let dir = tempdir().unwrap();
    let body = json!({ "description": "printer offline", "top_k": -1 });
    let (status, _) = send(app(dir.path()), post_json("/suggest", body)).await;
    assert!(status.is_client_error());

    let req = Request::get("/search?q=printer&k=-1").body(Body::empty()).unwrap();
    let (status, _) = send(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_uses_query_string() {
    let dir = tempdir().unwrap();
    let req = Request::get("/search?q=printer%20not%20responding&k=2").body(Body::empty()).unwrap();
    let (status, json) = send(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert!(!results.is_empty() && results.len() <= 2);
    assert_eq!(results[0]["ticket_id"], 2);
}

#[tokio::test]
async fn ticket_lookup_and_not_found() {
    let dir = tempdir().unwrap();
    let req = Request::get("/tickets/3").body(Body::empty()).unwrap();
    let (status, json) = send(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "Email");

    let req = Request::get("/tickets/99").body(Body::empty()).unwrap();
    let (status, _) = send(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_report_index_size() {
    let dir = tempdir().unwrap();
    let req = Request::get("/stats").body(Body::empty()).unwrap();
    let (status, json) = send(app(dir.path()), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["num_docs"], 3);
    assert_eq!(json["default_top_k"], 3);
}

#[tokio::test]
async fn snapshot_source_serves_same_results() {
    let dir = tempdir().unwrap();
    let index = TicketIndex::build(write_dataset(dir.path())).unwrap();
    let snap = dir.path().join("snapshot");
    let paths = IndexPaths::new(&snap);
    save_snapshot(&paths, &index, &MetaFile::for_index(&index, String::new(), None)).unwrap();

    let from_snapshot = build_app(&IndexSource::Snapshot(snap), QueryParams::default()).unwrap();
    let body = json!({ "description": "outlook mailbox crash" });
    let (_, a) = send(from_snapshot, post_json("/suggest", body.clone())).await;
    let (_, b) = send(app(dir.path()), post_json("/suggest", body)).await;
    assert_eq!(a["results"], b["results"]);
}

#[test]
fn missing_dataset_fails_startup() {
    let dir = tempdir().unwrap();
    let source = IndexSource::Dataset(dir.path().join("absent.csv"));
    assert!(build_app(&source, QueryParams::default()).is_err());
}
