use crate::context::AppContext;
use anyhow::{Context, Result};
use tracing::info;
use wds_db::{ArtifactRepository, StatusRepository};
use wds_domain_models::ArtifactFamily;
use wds_scheduler::cancellation_pair;

pub async fn fetch_spine(context: &AppContext) -> Result<()> {
    let artifacts = ArtifactRepository::new(
        context.db.connection().context("opening spine artifact connection")?,
        ArtifactFamily::Spine,
    );
    let status = StatusRepository::new(
        context.db.connection().context("opening spine status connection")?,
        ArtifactFamily::Spine,
    );

    let record = wds_scheduler::fetch_spine(&context.client, &context.content_store, &artifacts, &status)
        .await
        .context("fetching spine snapshot")?;

    match record {
        Some(record) => info!(hash = %record.file_hash, "spine snapshot fetched"),
        None => info!("spine snapshot up to date, nothing to fetch"),
    }
    Ok(())
}

pub async fn fetch_cubes(context: &AppContext) -> Result<()> {
    let (source, token) = cancellation_pair();
    let ctrl_c_source = source;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_source.cancel();
        }
    });

    let processed = wds_scheduler::fetch_cubes(
        context.client.clone(),
        context.content_store.clone(),
        context.db.clone(),
        context.config.cube_workers,
        token,
    )
    .await;

    info!(processed, "cube fetch pipeline drained");
    Ok(())
}

pub async fn fetch_metadata(context: &AppContext) -> Result<()> {
    let (source, token) = cancellation_pair();
    let ctrl_c_source = source;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_source.cancel();
        }
    });

    let processed = wds_scheduler::fetch_metadata(
        context.client.clone(),
        context.content_store.clone(),
        context.db.clone(),
        context.config.metadata_workers,
        token,
    )
    .await;

    info!(processed, "metadata fetch pipeline drained");
    Ok(())
}
