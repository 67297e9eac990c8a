//! End-to-end tests for the analysis API
//!
//! Each test spawns its own server with an empty result store.

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use stroke_analysis::store::{ResultStore, StoreBackend, CSV_HEADER};

#[tokio::test]
async fn test_home_reports_uptime_and_hash() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["uptime"].as_str().unwrap().starts_with("0d "));
    assert!(body.get("hash").is_some());
}

#[tokio::test]
async fn test_analysis_is_stored_and_looked_up() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_analysis(TEST_SUBJECT, "race.MP4", TEST_FPS, &stroke_session())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let report: Value = response.json().await.unwrap();
    assert_eq!(report["frames_total"], STROKE_SESSION_FRAMES);
    assert_eq!(report["frames_detected"], STROKE_SESSION_FRAMES);
    assert_eq!(report["cycle_durations"], json!([1.0, 1.0]));

    let summary = &report["summary"];
    assert_eq!(summary["subject_label"], TEST_SUBJECT);
    assert!((summary["stroke_cycle_time"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert!((summary["knee_angle"].as_f64().unwrap() - TEST_KNEE_ANGLE).abs() < 1e-6);

    let input_id = summary["input_id"].as_str().unwrap();
    assert!(input_id.ends_with(".mp4"));
    let output_id = summary["output_id"].as_str().unwrap().to_string();
    assert!(output_id.ends_with("_annotated.avi"));

    let response = client.get_analysis(&output_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored: Value = response.json().await.unwrap();
    assert_eq!(&stored, summary);

    assert_eq!(server.store.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sqlite_backend_serves_the_same_api() {
    let server = TestServer::spawn_with_backend(StoreBackend::Sqlite).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mov", TEST_FPS, &stroke_session())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let report: Value = response.json().await.unwrap();
    let output_id = report["summary"]["output_id"].as_str().unwrap();

    let response = client.get_analysis(output_id).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_output_id_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_analysis("missing_annotated.avi").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_blank_subject_label_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_analysis("   ", "race.mp4", TEST_FPS, &stroke_session())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Player name is required");
    assert!(server.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_filename_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_raw(json!({
            "subject_label": TEST_SUBJECT,
            "fps": TEST_FPS,
            "frames": stroke_session(),
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No selected file");
}

#[tokio::test]
async fn test_unsupported_extension_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for filename in ["notes.txt", "race", "race.mkv"] {
        let response = client
            .submit_analysis(TEST_SUBJECT, filename, TEST_FPS, &stroke_session())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{filename}");
    }
    assert!(server.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_stream_without_detections_returns_422() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let frames = vec![Value::Null; 5];
    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mp4", TEST_FPS, &frames)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(server.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_frame_rate_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mp4", 0.0, &stroke_session())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_truncated_frame_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let mut frames = stroke_session();
    frames[3] = json!([{ "x": 0.5, "y": 0.5 }]);
    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mp4", TEST_FPS, &frames)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_too_many_frames_returns_413() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let frames = vec![Value::Null; TEST_MAX_FRAMES_PER_REQUEST + 1];
    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mp4", TEST_FPS, &frames)
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_download_is_404_until_a_run_is_stored() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.download_results().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for subject in ["Ana", "Ben"] {
        let response = client
            .submit_analysis(subject, "race.avi", TEST_FPS, &stroke_session())
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client.download_results().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv"
    );
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("results.csv"));

    let body = response.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert!(lines[1].contains(",Ana,"));
    assert!(lines[2].contains(",Ben,"));
}

#[tokio::test]
async fn test_metrics_count_analysis_runs() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .submit_analysis(TEST_SUBJECT, "race.mp4", TEST_FPS, &stroke_session())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client.metrics().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await.unwrap();
    assert!(body.contains("stroke_analysis_analyses_total"));
    assert!(body.contains("stroke_analysis_frames_processed_total"));
}
