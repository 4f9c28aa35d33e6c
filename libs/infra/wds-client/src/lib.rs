pub mod client;
pub mod errors;
mod wire;

pub use client::{ChangedCubeEntry, PolitenessPolicy, WdsClient};
pub use errors::ClientError;
