use crate::errors::DbError;
use libsql::{params, Connection};
use tracing::instrument;
use wds_domain_models::{Hash12, ProcessedDimension, ProcessedMember, ProductId};

/// Backs registry-builder Stage 1 (processed members) and Stage 2 (processed
/// dimensions). Both stages are fully deterministic given the raw tables, so
/// writes here are whole-product replacements, matching `raw_dimension`'s
/// shape.
pub struct ProcessedRepository {
    connection: Connection,
}

impl ProcessedRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, members))]
    pub async fn replace_members_for_product(
        &self,
        productid: ProductId,
        members: &[ProcessedMember],
    ) -> Result<(), DbError> {
        let txn = self
            .connection
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        txn.execute(
            "DELETE FROM processing_processed_members WHERE productid = ?1",
            params![productid.0],
        )
        .await
        .map_err(DbError::Query)?;

        for member in members {
            txn.execute(
                "INSERT INTO processing_processed_members \
                 (productid, dimension_position, member_id, parent_member_id, uom_code, \
                  name_en, name_fr, member_label_norm, member_hash, dimension_hash) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    productid.0,
                    member.dimension_position,
                    member.member_id,
                    member.parent_member_id,
                    member.uom_code.clone(),
                    member.name_en.clone(),
                    member.name_fr.clone(),
                    member.member_label_norm.clone(),
                    member.member_hash.as_str(),
                    member.dimension_hash.as_ref().map(|h| h.as_str().to_string()),
                ],
            )
            .await
            .map_err(DbError::Query)?;
        }

        txn.commit().await.map_err(|e| DbError::Transaction(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn members_for_dimension(
        &self,
        productid: ProductId,
        dimension_position: i32,
    ) -> Result<Vec<ProcessedMember>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT member_id, parent_member_id, uom_code, name_en, name_fr, \
                 member_label_norm, member_hash, dimension_hash FROM processing_processed_members \
                 WHERE productid = ?1 AND dimension_position = ?2 ORDER BY member_id",
                params![productid.0, dimension_position],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let dimension_hash: Option<String> = row.get(7).map_err(|e| DbError::Mapping(e.to_string()))?;
            let member_hash: String = row.get(6).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(ProcessedMember {
                productid,
                dimension_position,
                member_id: row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?,
                parent_member_id: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
                uom_code: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_en: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_fr: row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?,
                member_label_norm: row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?,
                member_hash: Hash12::from_full_hex(&member_hash),
                dimension_hash: dimension_hash.map(|h| Hash12::from_full_hex(&h)),
            });
        }
        Ok(out)
    }

    /// Backfills `dimension_hash` onto every processed member row for
    /// `(productid, dimension_position)` once Stage 2 has computed it.
    #[instrument(skip(self))]
    pub async fn backfill_dimension_hash(
        &self,
        productid: ProductId,
        dimension_position: i32,
        dimension_hash: &Hash12,
    ) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE processing_processed_members SET dimension_hash = ?1 \
                 WHERE productid = ?2 AND dimension_position = ?3",
                params![dimension_hash.as_str(), productid.0, dimension_position],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn upsert_dimension(&self, dimension: &ProcessedDimension) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO processing_processed_dimensions \
                 (productid, dimension_position, dimension_hash, name_en, name_fr, has_uom) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT (productid, dimension_position) DO UPDATE SET \
                 dimension_hash = excluded.dimension_hash, name_en = excluded.name_en, \
                 name_fr = excluded.name_fr, has_uom = excluded.has_uom",
                params![
                    dimension.productid.0,
                    dimension.dimension_position,
                    dimension.dimension_hash.as_str(),
                    dimension.name_en.clone(),
                    dimension.name_fr.clone(),
                    dimension.has_uom as i64,
                ],
            )
            .await?;
        Ok(())
    }

    /// Every `(productid, dimensionPosition, dimensionHash)` triple on file,
    /// the Stage 3/4 consensus input.
    #[instrument(skip(self))]
    pub async fn all_processed_dimensions(&self) -> Result<Vec<ProcessedDimension>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT productid, dimension_position, dimension_hash, name_en, name_fr, has_uom \
                 FROM processing_processed_dimensions ORDER BY dimension_hash, productid",
                (),
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let productid: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            let dimension_hash: String = row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?;
            let has_uom: i64 = row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(ProcessedDimension {
                productid: ProductId(productid),
                dimension_position: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
                dimension_hash: Hash12::from_full_hex(&dimension_hash),
                name_en: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_fr: row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?,
                has_uom: has_uom != 0,
            });
        }
        Ok(out)
    }

    /// All processed members sharing a `dimension_hash`, across every product
    /// that contributed that shape — the Stage 4 consensus input.
    #[instrument(skip(self))]
    pub async fn members_for_dimension_hash(
        &self,
        dimension_hash: &Hash12,
    ) -> Result<Vec<ProcessedMember>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT productid, dimension_position, member_id, parent_member_id, uom_code, \
                 name_en, name_fr, member_label_norm, member_hash FROM processing_processed_members \
                 WHERE dimension_hash = ?1 ORDER BY productid, member_id",
                params![dimension_hash.as_str()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let productid: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            let member_hash: String = row.get(8).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(ProcessedMember {
                productid: ProductId(productid),
                dimension_position: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
                member_id: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
                parent_member_id: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
                uom_code: row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_en: row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?,
                name_fr: row.get(6).map_err(|e| DbError::Mapping(e.to_string()))?,
                member_label_norm: row.get(7).map_err(|e| DbError::Mapping(e.to_string()))?,
                member_hash: Hash12::from_full_hex(&member_hash),
                dimension_hash: Some(dimension_hash.clone()),
            });
        }
        Ok(out)
    }
}
