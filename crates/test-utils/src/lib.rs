pub mod fake_toolchain;
pub mod fixture;
pub mod recording_runner;

use std::sync::Once;

use mpbuild::logging::{build_filter, LOG_ENV};

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness.
///
/// The filter follows the binary's rules, so `MPBUILD_LOG=debug cargo test`
/// shows debug logs for failing tests (or all tests with `--nocapture`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let env = std::env::var(LOG_ENV).ok();
        let Ok(filter) = build_filter(None, env.as_deref()) else {
            return;
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Poll `check` every 50ms until it returns true or 5 seconds pass.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    check()
}
