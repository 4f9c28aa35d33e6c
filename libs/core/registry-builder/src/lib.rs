//! Dimension Registry Builder (§4.G), the pipeline's hardest component:
//! reduces raw per-cube dimension definitions to a canonical, deduplicated
//! set of dimensions and members via hierarchical hashing and label
//! consensus. Four replayable, pure stages: raw → processed members →
//! processed dimensions → canonical dimensions → canonical members.

pub mod consensus;
pub mod errors;
pub mod hashing;
mod prune;
mod relabel;
mod stage1;
mod stage2;
mod stage3;
mod stage4;
mod titlecase;
pub mod tree;

pub use errors::RegistryError;
pub use relabel::renormalize_labels;

use prune::prune_stale_dimensions;
use tracing::{info, instrument};
use wds_db::{CanonicalRepository, ProcessedRepository, RawDimensionRepository};
use wds_domain_models::ProductId;
use wds_normalizer::LabelNormalizer;

/// Runs Stage 1 and Stage 2 for one product, the per-product half of the
/// build that must happen before the cross-product consensus stages.
#[instrument(skip(raw_dimensions, processed))]
pub async fn process_product(
    productid: ProductId,
    raw_dimensions: &RawDimensionRepository,
    processed: &ProcessedRepository,
) -> Result<(), RegistryError> {
    let members = stage1::run(productid, raw_dimensions, processed).await?;
    let dimensions = stage2::run(productid, raw_dimensions, processed).await?;
    info!(%productid, members, dimensions, "stage 1/2 complete for product");
    Ok(())
}

/// Runs Stage 3 and Stage 4 across every product's processed output,
/// rebuilding the canonical dictionary in full. Idempotent: re-running over
/// unchanged processed tables reproduces identical canonical rows (§4.G
/// idempotence invariant), since every stage here is a pure function of the
/// processed tables, not of its own prior output.
#[instrument(skip(processed, canonical, normalizer))]
pub async fn build_canonical_registry(
    processed: &ProcessedRepository,
    canonical: &CanonicalRepository,
    normalizer: &dyn LabelNormalizer,
) -> Result<(), RegistryError> {
    let dimensions = stage3::run(processed, canonical, normalizer).await?;
    let members = stage4::run(processed, canonical, normalizer).await?;
    let pruned = prune_stale_dimensions(processed, canonical).await?;
    info!(dimensions, members, pruned, "stage 3/4 complete");
    Ok(())
}
