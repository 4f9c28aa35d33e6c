use crate::errors::SchedulerError;
use std::path::Path;
use tracing::{instrument, warn};
use wds_content_store::ContentStore;
use wds_db::{ArtifactRepository, StatusRepository};

/// Outcome of one family's reconciliation pass (§4.I, §8 S6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: usize,
    pub ok: usize,
    pub repaired: usize,
}

/// Walks every active artifact row in a family and confirms its file still
/// exists on disk with matching content. A missing or corrupted file is
/// evicted: the artifact row is removed and the corresponding status row is
/// reset to `download_pending`, so the next fetch pass re-downloads it.
#[instrument(skip(content_store, artifacts, status))]
pub async fn verify_family(
    content_store: &ContentStore,
    artifacts: &ArtifactRepository,
    status: &StatusRepository,
) -> Result<VerifyReport, SchedulerError> {
    let mut report = VerifyReport::default();

    for record in artifacts.all_active().await? {
        report.checked += 1;
        let path = Path::new(&record.storage_location);
        let healthy = content_store.verify(path, &record.file_hash).await.unwrap_or(false);

        if healthy {
            report.ok += 1;
            continue;
        }

        warn!(key = ?record.key, path = %path.display(), "artifact failed verification, repairing");
        content_store.delete(path).await;
        match artifacts.remove(record.key, record.id).await {
            Ok(()) | Err(wds_db::DbError::NoActiveArtifact) => {}
            Err(error) => return Err(error.into()),
        }
        status.mark_pending(record.key).await?;
        report.repaired += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wds_db::DbClient;
    use wds_domain_models::{ArtifactFamily, ArtifactKey, ProductId};

    async fn setup() -> (ContentStore, DbClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = DbClient::connect(":memory:", None).await.unwrap();
        let store = ContentStore::new(dir.path());
        (store, db, dir)
    }

    #[tokio::test]
    async fn healthy_file_is_left_untouched() {
        let (store, db, _dir) = setup().await;
        let artifacts = ArtifactRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let status = StatusRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let key = ArtifactKey::Cube(ProductId(13100001));
        status.seed(key).await.unwrap();

        let outcome = store.put(ArtifactFamily::Cube, "zip", b"csv-bytes").await.unwrap();
        artifacts
            .insert(key, &outcome.hash, &outcome.path.to_string_lossy())
            .await
            .unwrap();
        status
            .mark_fetched(key, &outcome.hash, chrono::Utc::now())
            .await
            .unwrap();

        let report = verify_family(&store, &artifacts, &status).await.unwrap();
        assert_eq!(report, VerifyReport { checked: 1, ok: 1, repaired: 0 });
        assert!(artifacts.active(key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupted_file_is_evicted_and_requeued() {
        let (store, db, _dir) = setup().await;
        let artifacts = ArtifactRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let status = StatusRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let key = ArtifactKey::Cube(ProductId(13100002));
        status.seed(key).await.unwrap();

        let outcome = store.put(ArtifactFamily::Cube, "zip", b"csv-bytes").await.unwrap();
        artifacts
            .insert(key, &outcome.hash, &outcome.path.to_string_lossy())
            .await
            .unwrap();
        status
            .mark_fetched(key, &outcome.hash, chrono::Utc::now())
            .await
            .unwrap();

        tokio::fs::write(&outcome.path, b"truncated").await.unwrap();

        let report = verify_family(&store, &artifacts, &status).await.unwrap();
        assert_eq!(report, VerifyReport { checked: 1, ok: 0, repaired: 1 });
        assert!(artifacts.active(key).await.unwrap().is_none());
        assert!(status.pending_keys().await.unwrap().contains(&key));
    }

    #[tokio::test]
    async fn missing_file_is_evicted_and_requeued() {
        let (store, db, _dir) = setup().await;
        let artifacts = ArtifactRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let status = StatusRepository::new(db.connection().unwrap(), ArtifactFamily::Cube);
        let key = ArtifactKey::Cube(ProductId(13100003));
        status.seed(key).await.unwrap();

        let outcome = store.put(ArtifactFamily::Cube, "zip", b"csv-bytes").await.unwrap();
        artifacts
            .insert(key, &outcome.hash, &outcome.path.to_string_lossy())
            .await
            .unwrap();
        status
            .mark_fetched(key, &outcome.hash, chrono::Utc::now())
            .await
            .unwrap();

        tokio::fs::remove_file(&outcome.path).await.unwrap();

        let report = verify_family(&store, &artifacts, &status).await.unwrap();
        assert_eq!(report, VerifyReport { checked: 1, ok: 0, repaired: 1 });
    }
}
