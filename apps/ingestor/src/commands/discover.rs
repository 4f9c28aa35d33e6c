use crate::context::AppContext;
use anyhow::{Context, Result};
use chrono::Duration;
use tracing::info;
use wds_db::{ChangeLogRepository, SpineRepository, StatusRepository};
use wds_domain_models::ArtifactFamily;
use wds_scheduler::discovery::{discover_changes as run_discovery, release_cutoff};

pub async fn seed_status(context: &AppContext) -> Result<()> {
    let spine = SpineRepository::new(context.db.connection().context("opening spine connection")?);
    let cube_status = StatusRepository::new(
        context.db.connection().context("opening cube status connection")?,
        ArtifactFamily::Cube,
    );
    let metadata_status = StatusRepository::new(
        context.db.connection().context("opening metadata status connection")?,
        ArtifactFamily::Metadata,
    );

    let newly_seeded = wds_scheduler::seed_status(&spine, &cube_status, &metadata_status)
        .await
        .context("seeding cube/metadata status")?;
    info!(newly_seeded, "status seeding complete");
    Ok(())
}

pub async fn discover_changes(context: &AppContext) -> Result<()> {
    let change_log =
        ChangeLogRepository::new(context.db.connection().context("opening change log connection")?);
    let cube_status = StatusRepository::new(
        context.db.connection().context("opening cube status connection")?,
        ArtifactFamily::Cube,
    );
    let spine_status = StatusRepository::new(
        context.db.connection().context("opening spine status connection")?,
        ArtifactFamily::Spine,
    );

    let until = release_cutoff(chrono::Utc::now(), context.config.release_tz());

    let latest_change = change_log.latest_change_date().await.context("reading latest change date")?;
    let last_spine_load = spine_status
        .spine_last_loaded_date()
        .await
        .context("reading last spine load date")?;

    // §4.D: since = max(last recorded change, last spine load). With neither
    // on record, look back a week so the first run on a fresh database still
    // discovers recent activity.
    let since = match (latest_change, last_spine_load) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => until - Duration::days(7),
    };

    let discovered = run_discovery(&context.client, since, until, &change_log, &cube_status)
        .await
        .context("discovering changed cubes")?;
    info!(discovered, %since, %until, "change discovery complete");
    Ok(())
}
