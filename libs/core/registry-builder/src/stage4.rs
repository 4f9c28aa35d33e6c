use crate::consensus::{mode_with_null_only_if_sole, mode_with_tiebreak, Observation};
use crate::errors::RegistryError;
use crate::tree::compute_tree_levels;
use std::collections::HashMap;
use tracing::instrument;
use wds_db::{CanonicalRepository, ProcessedRepository};
use wds_domain_models::{CanonicalMember, Hash12, ProcessedMember};
use wds_normalizer::LabelNormalizer;

/// Stage 4 (§4.G): one canonical `dictionary_dimension_set_member` row per
/// `(dimensionHash, memberId)` observed across every contributing group.
#[instrument(skip(processed, canonical, normalizer))]
pub async fn run(
    processed: &ProcessedRepository,
    canonical: &CanonicalRepository,
    normalizer: &dyn LabelNormalizer,
) -> Result<usize, RegistryError> {
    let dimension_hashes = canonical.all_dimension_hashes().await?;
    let mut count = 0;

    for dimension_hash in dimension_hashes {
        count += run_for_dimension(&dimension_hash, processed, canonical, normalizer).await?;
    }

    Ok(count)
}

async fn run_for_dimension(
    dimension_hash: &Hash12,
    processed: &ProcessedRepository,
    canonical: &CanonicalRepository,
    normalizer: &dyn LabelNormalizer,
) -> Result<usize, RegistryError> {
    let rows = processed.members_for_dimension_hash(dimension_hash).await?;
    let canonical_dimension = canonical.dimension(dimension_hash).await?;
    let is_tree = canonical_dimension.map(|d| d.is_tree).unwrap_or(false);

    let mut by_member_id: HashMap<i64, Vec<ProcessedMember>> = HashMap::new();
    for row in rows {
        by_member_id.entry(row.member_id).or_default().push(row);
    }

    let mut parent_by_member: HashMap<i64, Option<i64>> = HashMap::new();
    let mut pending: Vec<(i64, String, String, Option<i64>, Option<String>, i64)> = Vec::new();

    for (member_id, rows) in &by_member_id {
        let name_en_obs: Vec<Observation<String>> = rows
            .iter()
            .map(|r| Observation { value: r.name_en.clone(), productid: r.productid.0 })
            .collect();
        let name_fr_obs: Vec<Observation<String>> = rows
            .iter()
            .map(|r| Observation { value: r.name_fr.clone(), productid: r.productid.0 })
            .collect();
        let parent_obs: Vec<Observation<Option<i64>>> = rows
            .iter()
            .map(|r| Observation { value: r.parent_member_id, productid: r.productid.0 })
            .collect();
        let uom_obs: Vec<Observation<Option<String>>> = rows
            .iter()
            .map(|r| Observation { value: r.uom_code.clone(), productid: r.productid.0 })
            .collect();

        let name_en = mode_with_tiebreak(&name_en_obs);
        let name_fr = mode_with_tiebreak(&name_fr_obs);
        let parent_member_id = mode_with_null_only_if_sole(&parent_obs);
        let uom_code = mode_with_null_only_if_sole(&uom_obs);
        let usage_count = rows.len() as i64;

        parent_by_member.insert(*member_id, parent_member_id);
        pending.push((*member_id, name_en, name_fr, parent_member_id, uom_code, usage_count));
    }

    let tree_levels = if is_tree {
        let edges: Vec<(i64, Option<i64>)> = parent_by_member.iter().map(|(id, parent)| (*id, *parent)).collect();
        compute_tree_levels(&edges)
    } else {
        None
    };

    for (member_id, name_en, name_fr, parent_member_id, uom_code, usage_count) in &pending {
        let base_name = normalizer.normalize(name_en);
        let tree_level = tree_levels.as_ref().and_then(|levels| levels.get(member_id).copied());

        canonical
            .upsert_member(&CanonicalMember {
                dimension_hash: dimension_hash.clone(),
                member_id: *member_id,
                name_en: name_en.clone(),
                name_fr: name_fr.clone(),
                parent_member_id: *parent_member_id,
                uom_code: uom_code.clone(),
                usage_count: *usage_count,
                tree_level,
                base_name,
            })
            .await?;
    }

    Ok(pending.len())
}
