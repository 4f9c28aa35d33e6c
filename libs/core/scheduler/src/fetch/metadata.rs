use crate::cancellation::CancellationToken;
use crate::worker_pool::{run_pool, worker_id};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use wds_client::WdsClient;
use wds_content_store::ContentStore;
use wds_db::{ArtifactRepository, DbClient, StatusRepository};
use wds_domain_models::{ArtifactFamily, ArtifactKey, ProductId};

/// Drains the metadata fetch pipeline (§5), same claim-fetch-store shape as
/// [`crate::fetch::fetch_cubes`].
#[instrument(skip(client, content_store, db, cancellation))]
pub async fn fetch_metadata(
    client: Arc<WdsClient>,
    content_store: Arc<ContentStore>,
    db: Arc<DbClient>,
    worker_count: usize,
    cancellation: CancellationToken,
) -> usize {
    run_pool(worker_count, move |index| {
        let client = client.clone();
        let content_store = content_store.clone();
        let db = db.clone();
        let cancellation = cancellation.clone();
        async move { worker_loop(index, client, content_store, db, cancellation).await }
    })
    .await
}

async fn worker_loop(
    index: usize,
    client: Arc<WdsClient>,
    content_store: Arc<ContentStore>,
    db: Arc<DbClient>,
    cancellation: CancellationToken,
) -> usize {
    let id = worker_id("metadata", index);
    let (Ok(status_connection), Ok(artifact_connection)) = (db.connection(), db.connection()) else {
        warn!(worker = %id, "failed to open worker connection");
        return 0;
    };
    let status = StatusRepository::new(status_connection, ArtifactFamily::Metadata);
    let artifacts = ArtifactRepository::new(artifact_connection, ArtifactFamily::Metadata);

    let mut processed = 0;
    loop {
        if cancellation.is_cancelled() {
            break;
        }

        let claimed = match status.claim_next(&id).await {
            Ok(Some(ArtifactKey::Metadata(productid))) => productid,
            Ok(Some(_)) | Ok(None) => break,
            Err(error) => {
                warn!(worker = %id, %error, "failed to claim next metadata key");
                break;
            }
        };

        match fetch_one(&client, &content_store, &artifacts, &status, claimed).await {
            Ok(()) => processed += 1,
            Err(error) => {
                warn!(worker = %id, productid = %claimed, %error, "metadata fetch failed, releasing claim");
                let key = ArtifactKey::Metadata(claimed);
                if let Err(release_error) = status.release_claim(key).await {
                    warn!(worker = %id, productid = %claimed, %release_error, "failed to release claim after fetch error");
                }
            }
        }
    }

    info!(worker = %id, processed, "metadata worker drained");
    processed
}

async fn fetch_one(
    client: &WdsClient,
    content_store: &ContentStore,
    artifacts: &ArtifactRepository,
    status: &StatusRepository,
    productid: ProductId,
) -> Result<(), crate::errors::SchedulerError> {
    let bytes = client.cube_metadata(productid).await?;
    let outcome = content_store.put(ArtifactFamily::Metadata, "json", &bytes)?;
    artifacts
        .insert(ArtifactKey::Metadata(productid), &outcome.hash, &outcome.path.to_string_lossy())
        .await?;
    status
        .mark_fetched(ArtifactKey::Metadata(productid), &outcome.hash, Utc::now())
        .await?;
    Ok(())
}
