use crate::consensus::{mode_with_tiebreak, Observation};
use crate::errors::RegistryError;
use crate::titlecase::title_case;
use std::collections::{HashMap, HashSet};
use tracing::instrument;
use wds_db::{CanonicalRepository, ProcessedRepository};
use wds_domain_models::{CanonicalDimension, Hash12, ProcessedDimension};
use wds_normalizer::LabelNormalizer;

/// Stage 3 (§4.G): one canonical `dictionary_dimension_set` row per distinct
/// `dimensionHash`, consensus-selected across every contributing
/// `(productid, dimensionPosition)` group.
#[instrument(skip(processed, canonical, normalizer))]
pub async fn run(
    processed: &ProcessedRepository,
    canonical: &CanonicalRepository,
    normalizer: &dyn LabelNormalizer,
) -> Result<usize, RegistryError> {
    let all_dimensions = processed.all_processed_dimensions().await?;

    let mut groups: HashMap<Hash12, Vec<ProcessedDimension>> = HashMap::new();
    for dimension in all_dimensions {
        groups.entry(dimension.dimension_hash.clone()).or_default().push(dimension);
    }

    let mut count = 0;
    for (dimension_hash, group) in groups {
        let usage_count = group.len() as i64;
        let has_uom = group.iter().any(|d| d.has_uom);

        let name_en_obs: Vec<Observation<String>> = group
            .iter()
            .map(|d| Observation { value: d.name_en.clone(), productid: d.productid.0 })
            .collect();
        let name_fr_obs: Vec<Observation<String>> = group
            .iter()
            .map(|d| Observation { value: d.name_fr.clone(), productid: d.productid.0 })
            .collect();
        let name_en = title_case(&mode_with_tiebreak(&name_en_obs));
        let name_fr = title_case(&mode_with_tiebreak(&name_fr_obs));

        let members = processed.members_for_dimension_hash(&dimension_hash).await?;
        let is_tree = members.iter().any(|m| m.parent_member_id.is_some());
        let distinct_uom: HashSet<&str> = members.iter().filter_map(|m| m.uom_code.as_deref()).collect();
        let is_hetero = distinct_uom.len() > 1;
        let has_total = members
            .iter()
            .any(|m| normalizer.contains_total_token(&m.name_en) || normalizer.contains_total_token(&m.name_fr));

        canonical
            .upsert_dimension(&CanonicalDimension {
                dimension_hash,
                name_en,
                name_fr,
                usage_count,
                has_uom,
                is_tree,
                is_hetero,
                has_total,
            })
            .await?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wds_db::DbClient;
    use wds_domain_models::ProcessedMember;
    use wds_normalizer::DefaultNormalizer;

    #[tokio::test]
    async fn has_total_is_detected_from_french_label_alone() {
        let db = DbClient::connect(":memory:", None).await.unwrap();
        let processed = ProcessedRepository::new(db.connection().unwrap());
        let canonical = CanonicalRepository::new(db.connection().unwrap());
        let normalizer = DefaultNormalizer;

        let productid = wds_domain_models::ProductId(1);
        let dimension_hash = Hash12::from_full_hex(&"d".repeat(12));
        processed
            .upsert_dimension(&ProcessedDimension {
                productid,
                dimension_position: 1,
                dimension_hash: dimension_hash.clone(),
                name_en: "Geography".to_string(),
                name_fr: "Géographie".to_string(),
                has_uom: false,
            })
            .await
            .unwrap();

        // English label carries no "total" token; only the French label does.
        processed
            .replace_members_for_product(
                productid,
                &[ProcessedMember {
                    productid,
                    dimension_position: 1,
                    member_id: 1,
                    parent_member_id: None,
                    uom_code: None,
                    name_en: "All provinces".to_string(),
                    name_fr: "Totaux des provinces".to_string(),
                    member_label_norm: "all provinces".to_string(),
                    member_hash: Hash12::from_full_hex(&"e".repeat(12)),
                    dimension_hash: Some(dimension_hash.clone()),
                }],
            )
            .await
            .unwrap();

        run(&processed, &canonical, &normalizer).await.unwrap();

        let dimension = canonical.dimension(&dimension_hash).await.unwrap().unwrap();
        assert!(dimension.has_total);
    }
}
