use crate::errors::RegistryError;
use std::collections::HashSet;
use tracing::instrument;
use wds_db::{CanonicalRepository, ProcessedRepository};

/// Deletes canonical dimension/member rows for any hash Stage 3 no longer
/// produced this run — the shape stopped being contributed by any
/// `(productid, dimensionPosition)` group in the processed tables (§4.G).
#[instrument(skip(processed, canonical))]
pub async fn prune_stale_dimensions(
    processed: &ProcessedRepository,
    canonical: &CanonicalRepository,
) -> Result<usize, RegistryError> {
    let live: HashSet<_> = processed
        .all_processed_dimensions()
        .await?
        .into_iter()
        .map(|d| d.dimension_hash)
        .collect();

    let mut pruned = 0;
    for hash in canonical.all_dimension_hashes().await? {
        if !live.contains(&hash) {
            canonical.delete_dimension(&hash).await?;
            pruned += 1;
        }
    }
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wds_db::DbClient;
    use wds_domain_models::{CanonicalDimension, Hash12, ProcessedDimension, ProductId};

    fn dimension(hash: &str) -> CanonicalDimension {
        CanonicalDimension {
            dimension_hash: Hash12::from_full_hex(&hash.repeat(12)),
            name_en: "Geography".to_string(),
            name_fr: "Géographie".to_string(),
            usage_count: 1,
            has_uom: false,
            is_tree: false,
            is_hetero: false,
            has_total: false,
        }
    }

    #[tokio::test]
    async fn stale_dimension_is_deleted_live_one_is_kept() {
        let db = DbClient::connect(":memory:", None).await.unwrap();
        let processed = ProcessedRepository::new(db.connection().unwrap());
        let canonical = CanonicalRepository::new(db.connection().unwrap());

        let live_hash = Hash12::from_full_hex(&"a".repeat(12));
        processed
            .upsert_dimension(&ProcessedDimension {
                productid: ProductId(1),
                dimension_position: 1,
                dimension_hash: live_hash.clone(),
                name_en: "Geography".to_string(),
                name_fr: "Géographie".to_string(),
                has_uom: false,
            })
            .await
            .unwrap();

        canonical.upsert_dimension(&dimension("a")).await.unwrap();
        canonical.upsert_dimension(&dimension("b")).await.unwrap();

        let pruned = prune_stale_dimensions(&processed, &canonical).await.unwrap();
        assert_eq!(pruned, 1);

        let remaining = canonical.all_dimension_hashes().await.unwrap();
        assert_eq!(remaining, vec![live_hash]);
    }

    #[tokio::test]
    async fn nothing_to_prune_when_every_canonical_hash_is_still_live() {
        let db = DbClient::connect(":memory:", None).await.unwrap();
        let processed = ProcessedRepository::new(db.connection().unwrap());
        let canonical = CanonicalRepository::new(db.connection().unwrap());

        let live_hash = Hash12::from_full_hex(&"c".repeat(12));
        processed
            .upsert_dimension(&ProcessedDimension {
                productid: ProductId(2),
                dimension_position: 1,
                dimension_hash: live_hash.clone(),
                name_en: "Sex".to_string(),
                name_fr: "Sexe".to_string(),
                has_uom: false,
            })
            .await
            .unwrap();
        canonical.upsert_dimension(&dimension("c")).await.unwrap();

        let pruned = prune_stale_dimensions(&processed, &canonical).await.unwrap();
        assert_eq!(pruned, 0);
    }
}
