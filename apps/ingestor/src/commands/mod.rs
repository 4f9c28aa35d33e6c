mod discover;
mod fetch;
mod load;
mod registry;
mod verify;

use crate::context::AppContext;
use anyhow::Result;
use clap::Subcommand;

/// One pipeline stage per variant (§6, "CLI surface"). Every subcommand
/// resumes pending work idempotently; composing them in sequence drives the
/// pipeline end to end.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the spine snapshot if a new one is pending.
    FetchSpine,
    /// Load the active spine artifact into the spine tables.
    LoadSpine,
    /// Seed cube/metadata status rows for every productid in the spine.
    SeedStatus,
    /// Discover changed cubes since the last recorded change date.
    DiscoverChanges,
    /// Drain the cube fetch pipeline.
    FetchCubes,
    /// Drain the metadata fetch pipeline.
    FetchMetadata,
    /// Verify every active artifact's file against its recorded hash.
    VerifyFiles,
    /// Load raw dimensions/members for every product with unconsumed metadata.
    LoadRawDimensions,
    /// Rebuild the canonical dimension/member registry from raw tables.
    BuildRegistry,
    /// Recompute canonical members' `baseName` against the current normalizer.
    NormalizeLabels,
}

pub async fn run(context: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::FetchSpine => fetch::fetch_spine(context).await,
        Command::LoadSpine => load::load_spine(context).await,
        Command::SeedStatus => discover::seed_status(context).await,
        Command::DiscoverChanges => discover::discover_changes(context).await,
        Command::FetchCubes => fetch::fetch_cubes(context).await,
        Command::FetchMetadata => fetch::fetch_metadata(context).await,
        Command::VerifyFiles => verify::verify_files(context).await,
        Command::LoadRawDimensions => load::load_raw_dimensions(context).await,
        Command::BuildRegistry => registry::build_registry(context).await,
        Command::NormalizeLabels => registry::normalize_labels(context).await,
    }
}
