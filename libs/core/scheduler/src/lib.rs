pub mod cancellation;
pub mod discovery;
pub mod errors;
pub mod fetch;
pub mod seed;
pub mod verifier;
mod worker_pool;

pub use cancellation::{cancellation_pair, CancellationSource, CancellationToken};
pub use errors::SchedulerError;
pub use fetch::{fetch_cubes, fetch_metadata, fetch_spine};
pub use seed::seed_status;
pub use verifier::{verify_family, VerifyReport};
pub use worker_pool::{worker_id, DEFAULT_WORKER_COUNT};
