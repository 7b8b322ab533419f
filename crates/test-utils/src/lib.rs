pub mod builders;
pub mod fake_executor;

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing once for the whole test binary.
///
/// Uses `with_test_writer()` so log lines are captured per-test and only
/// printed for failing tests (unless run with `-- --nocapture`). Filter
/// levels come from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout, so a scheduling deadlock fails the
/// test instead of hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("test timed out after 5 seconds")
}
