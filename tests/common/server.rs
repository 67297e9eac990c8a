//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own data directory.

use super::constants::*;
use std::sync::Arc;
use std::time::Duration;
use stroke_analysis::analysis::{AnalysisPipeline, AnalysisSettings};
use stroke_analysis::server::{make_app, metrics, RequestsLoggingLevel, ServerConfig};
use stroke_analysis::store::{open_store, ResultStore, StoreBackend};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated result store
///
/// When dropped, the server shuts down and the data directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Result store for direct access in tests
    pub store: Arc<dyn ResultStore>,

    // Private fields - keep resources alive until drop
    _data_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a CSV-backed test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with_backend(StoreBackend::Csv).await
    }

    /// Spawns a test server on a random port using `backend`
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be opened, the port cannot be bound or the
    /// server doesn't become ready within timeout.
    pub async fn spawn_with_backend(backend: StoreBackend) -> Self {
        metrics::init_metrics();

        let data_dir = TempDir::new().expect("Failed to create data dir");
        let store = open_store(backend, data_dir.path()).expect("Failed to open result store");
        let pipeline = Arc::new(AnalysisPipeline::new(
            store.clone(),
            AnalysisSettings::default(),
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            max_frames_per_request: TEST_MAX_FRAMES_PER_REQUEST,
        };
        let app = make_app(config, pipeline).expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            _data_dir: data_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
