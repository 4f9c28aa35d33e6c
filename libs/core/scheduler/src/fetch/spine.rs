use crate::errors::SchedulerError;
use chrono::Utc;
use tracing::instrument;
use wds_client::WdsClient;
use wds_content_store::ContentStore;
use wds_db::{ArtifactRepository, StatusRepository};
use wds_domain_models::{ArtifactKey, ArtifactRecord};

/// Fetches the spine snapshot unconditionally if its status row is pending
/// (§4.A/§4.C). There is exactly one spine key, so this has no worker pool —
/// `fetch-spine` either has work to do or it doesn't.
#[instrument(skip(client, content_store, artifacts, status))]
pub async fn fetch_spine(
    client: &WdsClient,
    content_store: &ContentStore,
    artifacts: &ArtifactRepository,
    status: &StatusRepository,
) -> Result<Option<ArtifactRecord>, SchedulerError> {
    let pending = status.pending_keys().await?.contains(&ArtifactKey::Spine);
    if !pending {
        return Ok(None);
    }

    let bytes = client.list_all_cubes().await?;
    let outcome = content_store.put(ArtifactKey::Spine.family(), "json", &bytes)?;

    let record = artifacts
        .insert(
            ArtifactKey::Spine,
            &outcome.hash,
            &outcome.path.to_string_lossy(),
        )
        .await?;
    status
        .mark_fetched(ArtifactKey::Spine, &outcome.hash, Utc::now())
        .await?;

    Ok(Some(record))
}
