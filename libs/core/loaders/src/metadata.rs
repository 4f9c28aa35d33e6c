use crate::errors::LoaderError;
use crate::wire::{DimensionWire, MetadataEnvelope};
use tracing::{info, instrument, warn};
use wds_db::RawDimensionRepository;
use wds_domain_models::{ProductId, RawDimension, RawMember};

/// Parses one product's active metadata JSON into raw dimension/member rows
/// and replaces that product's slice of `processing_raw_*` (§4.F). Schema or
/// parse failures are the caller's to catch and skip — per §7, a malformed
/// product must not block the rest of the catalog.
#[instrument(skip(payload, repository))]
pub async fn load_metadata(
    productid: ProductId,
    payload: &[u8],
    repository: &RawDimensionRepository,
) -> Result<usize, LoaderError> {
    let envelope: MetadataEnvelope =
        serde_json::from_slice(payload).map_err(|source| LoaderError::MetadataParse { productid, source })?;

    if envelope.status != "SUCCESS" {
        warn!(%productid, status = %envelope.status, "metadata envelope reported non-success status");
    }
    if !envelope.object.unknown.is_empty() {
        warn!(%productid, fields = %envelope.object.unknown.describe(), "metadata object carries unrecognized fields");
    }

    let mut dimensions = Vec::with_capacity(envelope.object.dimensions.len());
    let mut members = Vec::new();

    for dim_wire in envelope.object.dimensions {
        let DimensionWire {
            dimension_position_id,
            dimension_name_en,
            dimension_name_fr,
            has_uom,
            members: member_wires,
            unknown,
        } = dim_wire;

        if !unknown.is_empty() {
            warn!(%productid, position = dimension_position_id, fields = %unknown.describe(), "dimension entry carries unrecognized fields");
        }

        dimensions.push(RawDimension {
            productid,
            dimension_position: dimension_position_id,
            name_en: dimension_name_en,
            name_fr: dimension_name_fr,
            has_uom,
        });

        for member_wire in member_wires {
            if !member_wire.unknown.is_empty() {
                warn!(
                    %productid,
                    position = dimension_position_id,
                    member_id = member_wire.member_id,
                    fields = %member_wire.unknown.describe(),
                    "member entry carries unrecognized fields"
                );
            }
            members.push(RawMember {
                productid,
                dimension_position: dimension_position_id,
                member_id: member_wire.member_id,
                parent_member_id: member_wire.parent_member_id,
                classification_code: member_wire.classification_code,
                name_en: member_wire.member_name_en,
                name_fr: member_wire.member_name_fr,
                uom_code: member_wire.member_uom_code,
                geo_level: member_wire.geo_level,
                vintage: member_wire.vintage,
                terminated: member_wire.terminated,
            });
        }
    }

    let count = members.len();
    repository
        .replace_for_product(productid, &dimensions, &members)
        .await?;
    info!(%productid, dimensions = dimensions.len(), members = count, "raw dimensions loaded");
    Ok(count)
}
