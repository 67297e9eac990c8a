//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// POST /v1/analyses
    pub async fn submit_analysis(
        &self,
        subject_label: &str,
        input_filename: &str,
        fps: f64,
        frames: &[Value],
    ) -> Response {
        self.submit_raw(json!({
            "subject_label": subject_label,
            "input_filename": input_filename,
            "fps": fps,
            "frames": frames,
        }))
        .await
    }

    /// POST /v1/analyses with an arbitrary body
    pub async fn submit_raw(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/analyses", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Analysis request failed")
    }

    /// GET /v1/analyses/{output_id}
    pub async fn get_analysis(&self, output_id: &str) -> Response {
        self.client
            .get(format!("{}/v1/analyses/{}", self.base_url, output_id))
            .send()
            .await
            .expect("Lookup request failed")
    }

    /// GET /v1/results/download
    pub async fn download_results(&self) -> Response {
        self.client
            .get(format!("{}/v1/results/download", self.base_url))
            .send()
            .await
            .expect("Download request failed")
    }

    /// GET /metrics
    pub async fn metrics(&self) -> Response {
        self.client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await
            .expect("Metrics request failed")
    }
}
