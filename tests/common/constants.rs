//! Shared constants for end-to-end tests

// ============================================================================
// Test Data
// ============================================================================

/// Athlete name used by most tests
pub const TEST_SUBJECT: &str = "Test Rower";

/// Frame rate of the synthetic stroke session
pub const TEST_FPS: f64 = 10.0;

/// Frames in the synthetic stroke session
pub const STROKE_SESSION_FRAMES: usize = 40;

/// Wrist minima of the synthetic stroke session, one every second at TEST_FPS
pub const STROKE_CATCH_FRAMES: [usize; 3] = [10, 20, 30];

/// Knee angle of every synthetic pose, in degrees
pub const TEST_KNEE_ANGLE: f64 = 90.0;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Frame limit configured on test servers
pub const TEST_MAX_FRAMES_PER_REQUEST: usize = 500;
