use crate::errors::RegistryError;
use tracing::instrument;
use wds_db::CanonicalRepository;
use wds_normalizer::LabelNormalizer;

/// Recomputes `baseName` for every canonical member against the current
/// `LabelNormalizer`, without touching consensus fields. Useful when the
/// normalizer's stopword/tokenizing rules change but the raw catalog hasn't,
/// so a full `build_canonical_registry` rerun would be wasted work.
#[instrument(skip(canonical, normalizer))]
pub async fn renormalize_labels(
    canonical: &CanonicalRepository,
    normalizer: &dyn LabelNormalizer,
) -> Result<usize, RegistryError> {
    let mut count = 0;
    for dimension_hash in canonical.all_dimension_hashes().await? {
        for mut member in canonical.members(&dimension_hash).await? {
            member.base_name = normalizer.normalize(&member.name_en);
            canonical.upsert_member(&member).await?;
            count += 1;
        }
    }
    Ok(count)
}
