use crate::errors::DbError;
use libsql::{params, Connection};
use tracing::instrument;
use wds_domain_models::{CanonicalDimension, CanonicalMember, Hash12};

/// Backs registry-builder Stage 3 (`dictionary_dimension_set`) and Stage 4
/// (`dictionary_dimension_set_member`). Both are consensus snapshots recomputed
/// wholesale by `build-registry`, so writes are keyed upserts rather than
/// incremental patches: re-running the builder over unchanged raw tables must
/// reproduce byte-identical rows (the idempotence invariant, §4.G).
pub struct CanonicalRepository {
    connection: Connection,
}

impl CanonicalRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn upsert_dimension(&self, dimension: &CanonicalDimension) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO dictionary_dimension_set \
                 (dimension_hash, name_en, name_fr, usage_count, has_uom, is_tree, is_hetero, has_total) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT (dimension_hash) DO UPDATE SET \
                 name_en = excluded.name_en, name_fr = excluded.name_fr, \
                 usage_count = excluded.usage_count, has_uom = excluded.has_uom, \
                 is_tree = excluded.is_tree, is_hetero = excluded.is_hetero, has_total = excluded.has_total",
                params![
                    dimension.dimension_hash.as_str(),
                    dimension.name_en.clone(),
                    dimension.name_fr.clone(),
                    dimension.usage_count,
                    dimension.has_uom as i64,
                    dimension.is_tree as i64,
                    dimension.is_hetero as i64,
                    dimension.has_total as i64,
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn upsert_member(&self, member: &CanonicalMember) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO dictionary_dimension_set_member \
                 (dimension_hash, member_id, name_en, name_fr, parent_member_id, uom_code, \
                  usage_count, tree_level, base_name) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
                 ON CONFLICT (dimension_hash, member_id) DO UPDATE SET \
                 name_en = excluded.name_en, name_fr = excluded.name_fr, \
                 parent_member_id = excluded.parent_member_id, uom_code = excluded.uom_code, \
                 usage_count = excluded.usage_count, tree_level = excluded.tree_level, \
                 base_name = excluded.base_name",
                params![
                    member.dimension_hash.as_str(),
                    member.member_id,
                    member.name_en.clone(),
                    member.name_fr.clone(),
                    member.parent_member_id,
                    member.uom_code.clone(),
                    member.usage_count,
                    member.tree_level,
                    member.base_name.clone(),
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn dimension(&self, dimension_hash: &Hash12) -> Result<Option<CanonicalDimension>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT dimension_hash, name_en, name_fr, usage_count, has_uom, is_tree, is_hetero, has_total \
                 FROM dictionary_dimension_set WHERE dimension_hash = ?1",
                params![dimension_hash.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_dimension(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn members(&self, dimension_hash: &Hash12) -> Result<Vec<CanonicalMember>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT dimension_hash, member_id, name_en, name_fr, parent_member_id, uom_code, \
                 usage_count, tree_level, base_name FROM dictionary_dimension_set_member \
                 WHERE dimension_hash = ?1 ORDER BY member_id",
                params![dimension_hash.as_str()],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_member(&row)?);
        }
        Ok(out)
    }

    /// Deletes a dimension's members and its `dictionary_dimension_set` row.
    /// Used by the registry builder's prune pass (§4.G) when a shape no
    /// longer has any contributing processed-dimension group.
    #[instrument(skip(self))]
    pub async fn delete_dimension(&self, dimension_hash: &Hash12) -> Result<(), DbError> {
        self.connection
            .execute(
                "DELETE FROM dictionary_dimension_set_member WHERE dimension_hash = ?1",
                params![dimension_hash.as_str()],
            )
            .await?;
        self.connection
            .execute(
                "DELETE FROM dictionary_dimension_set WHERE dimension_hash = ?1",
                params![dimension_hash.as_str()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn all_dimension_hashes(&self) -> Result<Vec<Hash12>, DbError> {
        let mut rows = self
            .connection
            .query("SELECT dimension_hash FROM dictionary_dimension_set ORDER BY dimension_hash", ())
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let value: String = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            out.push(Hash12::from_full_hex(&value));
        }
        Ok(out)
    }
}

fn row_to_dimension(row: &libsql::Row) -> Result<CanonicalDimension, DbError> {
    let dimension_hash: String = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
    let has_uom: i64 = row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?;
    let is_tree: i64 = row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?;
    let is_hetero: i64 = row.get(6).map_err(|e| DbError::Mapping(e.to_string()))?;
    let has_total: i64 = row.get(7).map_err(|e| DbError::Mapping(e.to_string()))?;
    Ok(CanonicalDimension {
        dimension_hash: Hash12::from_full_hex(&dimension_hash),
        name_en: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
        name_fr: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
        usage_count: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
        has_uom: has_uom != 0,
        is_tree: is_tree != 0,
        is_hetero: is_hetero != 0,
        has_total: has_total != 0,
    })
}

fn row_to_member(row: &libsql::Row) -> Result<CanonicalMember, DbError> {
    let dimension_hash: String = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
    Ok(CanonicalMember {
        dimension_hash: Hash12::from_full_hex(&dimension_hash),
        member_id: row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?,
        name_en: row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?,
        name_fr: row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?,
        parent_member_id: row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?,
        uom_code: row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?,
        usage_count: row.get(6).map_err(|e| DbError::Mapping(e.to_string()))?,
        tree_level: row.get(7).map_err(|e| DbError::Mapping(e.to_string()))?,
        base_name: row.get(8).map_err(|e| DbError::Mapping(e.to_string()))?,
    })
}
