use std::future::Future;
use std::time::Duration;

/// Runs `fut` and logs a warning if it took longer than `max`. Used to
/// flag slow external calls (cloud API, subprocess, status store)
/// without turning them into hard timeouts.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
