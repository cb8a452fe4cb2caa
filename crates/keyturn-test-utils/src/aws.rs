//! AWS test utilities
//!
//! Region detection, the disposable principal live rotation tests act on,
//! and unique run ids.

use chrono::Utc;

/// Environment variable naming an IAM user that live tests may rotate
pub const TEST_PRINCIPAL_VAR: &str = "KEYTURN_TEST_USER";

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
///
/// # Example
///
/// ```
/// use keyturn_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// Disposable IAM user named by `KEYTURN_TEST_USER`, if set.
///
/// Live tests that mutate credentials only run against this user.
pub fn test_principal() -> Option<String> {
    std::env::var(TEST_PRINCIPAL_VAR)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Generate a unique run ID.
///
/// Format: `test-{timestamp_ms}-{counter}`.
///
/// # Example
///
/// ```
/// use keyturn_test_utils::aws::test_run_id;
///
/// let run_id = test_run_id();
/// assert!(run_id.starts_with("test-"));
/// ```
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{ts}-{counter}")
}
