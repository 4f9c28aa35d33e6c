use crate::errors::DbError;
use libsql::{params, Connection};
use tracing::instrument;
use wds_domain_models::{ProductId, RawDimension, RawMember};

/// Backs the Raw Dimension Loader (§4.F). Unlike the spine, metadata is loaded
/// per-product and a product's prior rows must be cleared before the new ones
/// land, so a stale dimension position from an earlier cube shape doesn't
/// survive alongside the replacement.
pub struct RawDimensionRepository {
    connection: Connection,
}

impl RawDimensionRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, dimensions, members))]
    pub async fn replace_for_product(
        &self,
        productid: ProductId,
        dimensions: &[RawDimension],
        members: &[RawMember],
    ) -> Result<(), DbError> {
        let txn = self
            .connection
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        txn.execute(
            "DELETE FROM processing_raw_members WHERE productid = ?1",
            params![productid.0],
        )
        .await
        .map_err(DbError::Query)?;
        txn.execute(
            "DELETE FROM processing_raw_dimensions WHERE productid = ?1",
            params![productid.0],
        )
        .await
        .map_err(DbError::Query)?;

        for dimension in dimensions {
            txn.execute(
                "INSERT INTO processing_raw_dimensions \
                 (productid, dimension_position, name_en, name_fr, has_uom) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    productid.0,
                    dimension.dimension_position,
                    dimension.name_en.clone(),
                    dimension.name_fr.clone(),
                    dimension.has_uom as i64,
                ],
            )
            .await
            .map_err(DbError::Query)?;
        }

        for member in members {
            txn.execute(
                "INSERT INTO processing_raw_members \
                 (productid, dimension_position, member_id, parent_member_id, classification_code, \
                  name_en, name_fr, uom_code, geo_level, vintage, terminated) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    productid.0,
                    member.dimension_position,
                    member.member_id,
                    member.parent_member_id,
                    member.classification_code.clone(),
                    member.name_en.clone(),
                    member.name_fr.clone(),
                    member.uom_code.clone(),
                    member.geo_level.clone(),
                    member.vintage.clone(),
                    member.terminated.map(|b| b as i64),
                ],
            )
            .await
            .map_err(DbError::Query)?;
        }

        txn.commit().await.map_err(|e| DbError::Transaction(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dimensions_for_product(&self, productid: ProductId) -> Result<Vec<RawDimension>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT dimension_position, name_en, name_fr, has_uom FROM processing_raw_dimensions \
                 WHERE productid = ?1 ORDER BY dimension_position",
                params![productid.0],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let has_uom: i64 = row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(RawDimension {
                productid,
                dimension_position: row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_en: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_fr: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
                has_uom: has_uom != 0,
            });
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn members_for_dimension(
        &self,
        productid: ProductId,
        dimension_position: i32,
    ) -> Result<Vec<RawMember>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT member_id, parent_member_id, classification_code, name_en, name_fr, \
                 uom_code, geo_level, vintage, terminated FROM processing_raw_members \
                 WHERE productid = ?1 AND dimension_position = ?2 ORDER BY member_id",
                params![productid.0, dimension_position],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let terminated: Option<i64> = row.get(8).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(RawMember {
                productid,
                dimension_position,
                member_id: row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?,
                parent_member_id: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
                classification_code: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_en: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_fr: row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?,
                uom_code: row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?,
                geo_level: row.get(6).map_err(|e| DbError::Mapping(e.to_string()))?,
                vintage: row.get(7).map_err(|e| DbError::Mapping(e.to_string()))?,
                terminated: terminated.map(|v| v != 0),
            });
        }
        Ok(out)
    }

    #[instrument(skip(self))]
    pub async fn all_product_dimension_pairs(&self) -> Result<Vec<(ProductId, i32)>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT DISTINCT productid, dimension_position FROM processing_raw_dimensions \
                 ORDER BY productid, dimension_position",
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let productid: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            let position: i32 = row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push((ProductId(productid), position));
        }
        Ok(out)
    }
}
