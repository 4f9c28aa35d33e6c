use crate::errors::RegistryError;
use crate::hashing::{h12, pipe_join};
use tracing::instrument;
use unicode_normalization::UnicodeNormalization;
use wds_db::{ProcessedRepository, RawDimensionRepository};
use wds_domain_models::{ProcessedMember, ProductId, RawMember};

/// Stage 1 (§4.G): raw members → processed members. `memberLabelNorm` is
/// NFC-normalized, lowercased, trimmed `nameEn` — plain normalization, not
/// the tokenizing Label Normalizer (that's reserved for Stage 4's
/// `baseName`). `memberHash` folds in `memberId`, the normalized label,
/// parent id, and UoM code.
#[instrument(skip(raw_dimensions, processed))]
pub async fn run(
    productid: ProductId,
    raw_dimensions: &RawDimensionRepository,
    processed: &ProcessedRepository,
) -> Result<usize, RegistryError> {
    let dimensions = raw_dimensions.dimensions_for_product(productid).await?;

    let mut all_members = Vec::new();
    for dimension in &dimensions {
        let raw_members = raw_dimensions
            .members_for_dimension(productid, dimension.dimension_position)
            .await?;
        all_members.extend(raw_members.iter().map(process_member));
    }

    processed.replace_members_for_product(productid, &all_members).await?;
    Ok(all_members.len())
}

fn process_member(member: &RawMember) -> ProcessedMember {
    let member_label_norm = member_label_norm(&member.name_en);
    let member_hash = h12(&pipe_join(&[
        Some(member.member_id.to_string()).as_deref(),
        Some(member_label_norm.as_str()),
        member.parent_member_id.map(|p| p.to_string()).as_deref(),
        member.uom_code.as_deref(),
    ]));

    ProcessedMember {
        productid: member.productid,
        dimension_position: member.dimension_position,
        member_id: member.member_id,
        parent_member_id: member.parent_member_id,
        uom_code: member.uom_code.clone(),
        name_en: member.name_en.clone(),
        name_fr: member.name_fr.clone(),
        member_label_norm,
        member_hash,
        dimension_hash: None,
    }
}

fn member_label_norm(name_en: &str) -> String {
    let nfc: String = name_en.nfc().collect();
    nfc.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wds_domain_models::ProductId;

    fn sample_member(member_id: i64, name_en: &str) -> RawMember {
        RawMember {
            productid: ProductId(1),
            dimension_position: 1,
            member_id,
            parent_member_id: None,
            classification_code: None,
            name_en: name_en.to_string(),
            name_fr: name_en.to_string(),
            uom_code: None,
            geo_level: None,
            vintage: None,
            terminated: None,
        }
    }

    #[test]
    fn identical_labels_under_different_casing_hash_equal() {
        let a = process_member(&sample_member(1, "Canada"));
        let b = process_member(&sample_member(2, "canada"));
        assert_eq!(a.member_label_norm, b.member_label_norm);
        // member_id differs, so the hashes differ despite equal labels.
        assert_ne!(a.member_hash, b.member_hash);
    }

    #[test]
    fn same_member_id_and_label_hash_equal_regardless_of_source_product() {
        let mut a = sample_member(1, "Canada");
        let mut b = sample_member(1, "canada");
        a.productid = ProductId(10);
        b.productid = ProductId(20);
        let processed_a = process_member(&a);
        let processed_b = process_member(&b);
        assert_eq!(processed_a.member_hash, processed_b.member_hash);
    }
}
