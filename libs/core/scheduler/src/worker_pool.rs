use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Spawns `worker_count` copies of `make_worker(worker_index)` and waits for
/// all of them, summing their `usize` results (§5 "parallel worker pool per
/// pipeline, bounded concurrency"). A worker panicking is logged and counted
/// as zero rather than poisoning the whole pool.
pub async fn run_pool<F, Fut>(worker_count: usize, make_worker: F) -> usize
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = usize> + Send + 'static,
{
    let handles: Vec<_> = (0..worker_count).map(|i| tokio::spawn(make_worker(i))).collect();

    let mut total = 0;
    for handle in handles {
        match handle.await {
            Ok(count) => total += count,
            Err(join_error) => warn!(%join_error, "worker pool task panicked"),
        }
    }
    total
}

/// Default bounded concurrency per fetch pipeline (§5 recommends 4-8).
pub const DEFAULT_WORKER_COUNT: usize = 6;

pub fn worker_id(prefix: &str, index: usize) -> Arc<str> {
    Arc::from(format!("{prefix}-{index}"))
}
