//! Shared helpers for the `taskdag` integration tests.

pub mod builders;
pub mod fake_executor;
pub mod fake_tools;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Upper bound for any single async test step.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Route tracing into the test harness's captured output.
///
/// Honours `TASKDAG_LOG` like the binary does (e.g.
/// `TASKDAG_LOG=taskdag::dag=trace cargo test -- --nocapture`); defaults to
/// `taskdag=info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env(taskdag::logging::LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("taskdag=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
