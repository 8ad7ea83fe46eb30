//! Common test utilities shared across integration tests.

use std::time::Duration;

use carillon::testing::RecordingObserver;

/// Wait until the observer has seen at least `expected` triggers.
///
/// This is more reliable than fixed sleeps since the driver's cadence and
/// the test host's load both vary. Polls every 10ms and times out after the
/// specified duration.
///
/// # Panics
///
/// Panics if the timeout is reached first.
pub async fn wait_for_triggers(observer: &RecordingObserver, expected: usize, timeout: Duration) {
    let start = tokio::time::Instant::now();
    loop {
        if observer.count() >= expected {
            return;
        }
        if start.elapsed() > timeout {
            panic!(
                "Timeout waiting for {} triggers, saw {}",
                expected,
                observer.count()
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
