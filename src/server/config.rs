use super::RequestsLoggingLevel;
use crate::config::{DEFAULT_MAX_FRAMES_PER_REQUEST, DEFAULT_PORT};

/// Serialized size budget per landmark frame when sizing the request body limit.
const BYTES_PER_FRAME: usize = 4096;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub max_frames_per_request: usize,
}

impl ServerConfig {
    pub fn max_request_body_bytes(&self) -> usize {
        self.max_frames_per_request.saturating_mul(BYTES_PER_FRAME)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            max_frames_per_request: DEFAULT_MAX_FRAMES_PER_REQUEST,
        }
    }
}
