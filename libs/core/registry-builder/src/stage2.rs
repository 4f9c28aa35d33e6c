use crate::errors::RegistryError;
use crate::hashing::h12;
use tracing::instrument;
use wds_db::{ProcessedRepository, RawDimensionRepository};
use wds_domain_models::{ProcessedDimension, ProductId};

/// Stage 2 (§4.G): group processed members by `(productid, dimensionPosition)`,
/// sort by `memberId` ascending, hash the joined member hashes, and backfill
/// `dimension_hash` onto each member row.
#[instrument(skip(raw_dimensions, processed))]
pub async fn run(
    productid: ProductId,
    raw_dimensions: &RawDimensionRepository,
    processed: &ProcessedRepository,
) -> Result<usize, RegistryError> {
    let dimensions = raw_dimensions.dimensions_for_product(productid).await?;
    let mut count = 0;

    for dimension in &dimensions {
        let mut members = processed
            .members_for_dimension(productid, dimension.dimension_position)
            .await?;
        members.sort_by_key(|m| m.member_id);

        let has_uom = members.iter().any(|m| m.uom_code.is_some());
        let joined = members
            .iter()
            .map(|m| m.member_hash.as_str())
            .collect::<Vec<_>>()
            .join("|");
        let dimension_hash = h12(&joined);

        processed
            .backfill_dimension_hash(productid, dimension.dimension_position, &dimension_hash)
            .await?;

        processed
            .upsert_dimension(&ProcessedDimension {
                productid,
                dimension_position: dimension.dimension_position,
                dimension_hash,
                name_en: dimension.name_en.clone(),
                name_fr: dimension.name_fr.clone(),
                has_uom,
            })
            .await?;

        count += 1;
    }

    Ok(count)
}
