use crate::cancellation::CancellationToken;
use crate::worker_pool::{run_pool, worker_id};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use wds_client::WdsClient;
use wds_content_store::ContentStore;
use wds_db::{ArtifactRepository, DbClient, StatusRepository};
use wds_domain_models::{ArtifactFamily, ArtifactKey};

/// Drains the cube fetch pipeline with `worker_count` concurrent claimers
/// (§5). Every claimed productid is fetched, content-hashed, and stored
/// independently; a single product's failure releases its claim (leaving
/// `download_pending=true` for the next pass) without blocking its peers
/// (§7 "per-artifact errors are recovered locally").
#[instrument(skip(client, content_store, db, cancellation))]
pub async fn fetch_cubes(
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
    let id = worker_id("cube", index);
    let (Ok(status_connection), Ok(artifact_connection)) = (db.connection(), db.connection()) else {
        warn!(worker = %id, "failed to open worker connection");
        return 0;
    };
    let status = StatusRepository::new(status_connection, ArtifactFamily::Cube);
    let artifacts = ArtifactRepository::new(artifact_connection, ArtifactFamily::Cube);

    let mut processed = 0;
    loop {
        if cancellation.is_cancelled() {
            break;
        }

        let claimed = match status.claim_next(&id).await {
            Ok(Some(ArtifactKey::Cube(productid))) => productid,
            Ok(Some(_)) | Ok(None) => break,
            Err(error) => {
                warn!(worker = %id, %error, "failed to claim next cube");
                break;
            }
        };

        let key = ArtifactKey::Cube(claimed);
        match fetch_one(&client, &content_store, &artifacts, &status, claimed).await {
            Ok(()) => processed += 1,
            Err(error) => {
                warn!(worker = %id, productid = %claimed, %error, "cube fetch failed, releasing claim");
                if let Err(release_error) = status.release_claim(key).await {
                    warn!(worker = %id, productid = %claimed, %release_error, "failed to release claim after fetch error");
                }
            }
        }
    }

    info!(worker = %id, processed, "cube worker drained");
    processed
}

async fn fetch_one(
    client: &WdsClient,
    content_store: &ContentStore,
    artifacts: &ArtifactRepository,
    status: &StatusRepository,
    productid: wds_domain_models::ProductId,
) -> Result<(), crate::errors::SchedulerError> {
    let bytes = client.download_cube_csv(productid).await?;
    let outcome = content_store.put(ArtifactFamily::Cube, "zip", &bytes)?;
    artifacts
        .insert(ArtifactKey::Cube(productid), &outcome.hash, &outcome.path.to_string_lossy())
        .await?;
    status
        .mark_fetched(ArtifactKey::Cube(productid), &outcome.hash, Utc::now())
        .await?;
    Ok(())
}
