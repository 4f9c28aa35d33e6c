use crate::errors::SchedulerError;
use tracing::{info, instrument};
use wds_db::{SpineRepository, StatusRepository};
use wds_domain_models::{ArtifactKey, ProductId};

/// Brings every productid present in the spine into the cube/metadata status
/// tables, so newly-published cubes enter the fetch pipeline (`seed-status`,
/// §4.D). Idempotent: `StatusRepository::seed` is insert-or-ignore.
#[instrument(skip(spine, cube_status, metadata_status))]
pub async fn seed_status(
    spine: &SpineRepository,
    cube_status: &StatusRepository,
    metadata_status: &StatusRepository,
) -> Result<usize, SchedulerError> {
    let productids = spine.all_productids().await?;
    let mut newly_seeded = 0;

    for raw_id in productids {
        let productid = ProductId(raw_id);
        if !cube_status.exists(ArtifactKey::Cube(productid)).await? {
            cube_status.seed(ArtifactKey::Cube(productid)).await?;
            newly_seeded += 1;
        }
        if !metadata_status.exists(ArtifactKey::Metadata(productid)).await? {
            metadata_status.seed(ArtifactKey::Metadata(productid)).await?;
        }
    }

    info!(newly_seeded, "status seeding complete");
    Ok(newly_seeded)
}
