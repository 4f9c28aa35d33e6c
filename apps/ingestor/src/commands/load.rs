use crate::context::AppContext;
use anyhow::{Context, Result};
use tracing::{info, warn};
use wds_db::{ArtifactRepository, RawDimensionRepository, SpineRepository, StatusRepository};
use wds_domain_models::{ArtifactFamily, ArtifactKey};

pub async fn load_spine(context: &AppContext) -> Result<()> {
    let artifacts = ArtifactRepository::new(
        context.db.connection().context("opening spine artifact connection")?,
        ArtifactFamily::Spine,
    );
    let spine = SpineRepository::new(context.db.connection().context("opening spine connection")?);
    let status = StatusRepository::new(
        context.db.connection().context("opening spine status connection")?,
        ArtifactFamily::Spine,
    );

    let Some(record) = artifacts.active(ArtifactKey::Spine).await.context("reading active spine artifact")?
    else {
        info!("no active spine artifact to load");
        return Ok(());
    };

    let bytes = tokio::fs::read(&record.storage_location)
        .await
        .with_context(|| format!("reading spine artifact at {}", record.storage_location))?;
    let count = wds_loaders::load_spine(&bytes, &spine)
        .await
        .context("parsing and loading spine")?;

    let load_date = wds_scheduler::discovery::release_cutoff(chrono::Utc::now(), context.config.release_tz());
    status
        .mark_spine_loaded(load_date)
        .await
        .context("recording spine load date")?;

    info!(count, "spine loaded");
    Ok(())
}

/// Loads raw dimensions/members for every product whose active metadata
/// artifact hash has advanced since the last load (§4.F). A single product's
/// parse failure is logged and skipped, never aborting the pass.
pub async fn load_raw_dimensions(context: &AppContext) -> Result<()> {
    let artifacts = ArtifactRepository::new(
        context.db.connection().context("opening metadata artifact connection")?,
        ArtifactFamily::Metadata,
    );
    let status = StatusRepository::new(
        context.db.connection().context("opening metadata status connection")?,
        ArtifactFamily::Metadata,
    );
    let raw_dimensions =
        RawDimensionRepository::new(context.db.connection().context("opening raw dimension connection")?);

    let mut loaded = 0;
    let mut skipped = 0;

    for record in artifacts.all_active().await.context("listing active metadata artifacts")? {
        let ArtifactKey::Metadata(productid) = record.key else {
            continue;
        };

        let last_loaded = status
            .last_loaded_hash(productid)
            .await
            .context("reading last loaded hash")?;
        if last_loaded.as_ref() == Some(&record.file_hash) {
            continue;
        }

        let result = async {
            let bytes = tokio::fs::read(&record.storage_location).await?;
            wds_loaders::load_metadata(productid, &bytes, &raw_dimensions).await?;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                status
                    .mark_loaded(productid, &record.file_hash)
                    .await
                    .context("recording loaded hash")?;
                loaded += 1;
            }
            Err(error) => {
                warn!(%productid, %error, "raw dimension load failed, skipping product");
                skipped += 1;
            }
        }
    }

    info!(loaded, skipped, "raw dimension load pass complete");
    Ok(())
}
