use crate::context::AppContext;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{info, warn};
use wds_db::{CanonicalRepository, ProcessedRepository, RawDimensionRepository};
use wds_registry_builder::{build_canonical_registry, process_product, renormalize_labels};

/// Runs Stage 1/2 for every product with raw dimensions, then Stage 3/4 across
/// the accumulated processed tables (§4.G). A single product's stage 1/2
/// failure is logged and skipped; the cross-product stages still need every
/// product's output, so they run once at the end regardless.
pub async fn build_registry(context: &AppContext) -> Result<()> {
    let raw_dimensions =
        RawDimensionRepository::new(context.db.connection().context("opening raw dimension connection")?);
    let processed = ProcessedRepository::new(context.db.connection().context("opening processed connection")?);
    let canonical = CanonicalRepository::new(context.db.connection().context("opening canonical connection")?);

    let productids: BTreeSet<_> = raw_dimensions
        .all_product_dimension_pairs()
        .await
        .context("listing raw dimension products")?
        .into_iter()
        .map(|(productid, _)| productid)
        .collect();

    let mut processed_count = 0;
    for productid in productids {
        match process_product(productid, &raw_dimensions, &processed).await {
            Ok(()) => processed_count += 1,
            Err(error) => warn!(%productid, %error, "stage 1/2 failed for product, skipping"),
        }
    }

    build_canonical_registry(&processed, &canonical, context.normalizer.as_ref())
        .await
        .context("building canonical registry")?;

    info!(products = processed_count, "registry build complete");
    Ok(())
}

pub async fn normalize_labels(context: &AppContext) -> Result<()> {
    let canonical = CanonicalRepository::new(context.db.connection().context("opening canonical connection")?);
    let count = renormalize_labels(&canonical, context.normalizer.as_ref())
        .await
        .context("renormalizing canonical labels")?;
    info!(count, "label renormalization complete");
    Ok(())
}
