use crate::errors::DbError;
use chrono::Utc;
use libsql::{params, Connection};
use tracing::{info, instrument, warn};
use wds_domain_models::{ArtifactFamily, ArtifactKey, ArtifactRecord, Hash12};

fn table_name(family: ArtifactFamily) -> &'static str {
    match family {
        ArtifactFamily::Spine => "raw_files_spine_artifacts",
        ArtifactFamily::Cube => "raw_files_cube_artifacts",
        ArtifactFamily::Metadata => "raw_files_metadata_artifacts",
    }
}

/// `true` when the libsql error text looks like a unique-constraint
/// violation. libsql doesn't expose SQLite's structured extended error code
/// over this driver version, so the message text is the only signal
/// available — matched against SQLite's own wording.
fn is_unique_violation(error: &libsql::Error) -> bool {
    error.to_string().contains("UNIQUE constraint failed")
}

/// CRUD over one artifact family's history table (§4.C). The three families
/// share an identical shape modulo the `productid` column, which spine rows
/// don't have; callers pass `ArtifactKey::Spine` and a dummy productid is
/// simply never read or written for that family.
pub struct ArtifactRepository {
    connection: Connection,
    family: ArtifactFamily,
}

impl ArtifactRepository {
    pub fn new(connection: Connection, family: ArtifactFamily) -> Self {
        Self { connection, family }
    }

    /// Inserts a new active row for `key`, deactivating any prior active row
    /// for the same key inside one transaction. A unique-constraint
    /// violation on `(productid, file_hash)` means this exact content is
    /// already on file for this product — not an error, just "no change":
    /// the existing row for that hash is returned instead.
    #[instrument(skip(self, storage_location))]
    pub async fn insert(
        &self,
        key: ArtifactKey,
        hash: &Hash12,
        storage_location: &str,
    ) -> Result<ArtifactRecord, DbError> {
        let table = table_name(self.family);
        let txn = self
            .connection
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let deactivate_sql = match key.productid() {
            Some(_) => format!("UPDATE {table} SET active = 0 WHERE productid = ?1 AND active = 1"),
            None => format!("UPDATE {table} SET active = 0 WHERE active = 1"),
        };
        match key.productid() {
            Some(productid) => txn.execute(&deactivate_sql, params![productid.0]).await,
            None => txn.execute(&deactivate_sql, ()).await,
        }
        .map_err(DbError::Query)?;

        let download_time = Utc::now().to_rfc3339();
        let insert_sql = match key.productid() {
            Some(_) => format!(
                "INSERT INTO {table} (productid, file_hash, download_time, active, storage_location) \
                 VALUES (?1, ?2, ?3, 1, ?4)"
            ),
            None => format!(
                "INSERT INTO {table} (file_hash, download_time, active, storage_location) \
                 VALUES (?1, ?2, 1, ?3)"
            ),
        };

        let insert_result = match key.productid() {
            Some(productid) => {
                txn.execute(
                    &insert_sql,
                    params![productid.0, hash.as_str(), download_time.clone(), storage_location],
                )
                .await
            }
            None => {
                txn.execute(&insert_sql, params![hash.as_str(), download_time.clone(), storage_location])
                    .await
            }
        };

        match insert_result {
            Ok(_) => {
                let id = txn.last_insert_rowid();
                txn.commit()
                    .await
                    .map_err(|e| DbError::Transaction(e.to_string()))?;
                info!(family = %self.family, %hash, "artifact activated");
                Ok(ArtifactRecord {
                    id,
                    key,
                    file_hash: hash.clone(),
                    download_time: Utc::now(),
                    active: true,
                    storage_location: storage_location.to_string(),
                })
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(family = %self.family, %hash, "content already on file, treating as no-op");
                drop(txn);
                self.find_by_hash(key, hash)
                    .await?
                    .ok_or(DbError::NoActiveArtifact)
            }
            Err(e) => Err(DbError::Query(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn active(&self, key: ArtifactKey) -> Result<Option<ArtifactRecord>, DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!(
                "SELECT id, productid, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE productid = ?1 AND active = 1"
            ),
            None => format!(
                "SELECT id, 0, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE active = 1"
            ),
        };
        let mut rows = match key.productid() {
            Some(productid) => self.connection.query(&sql, params![productid.0]).await?,
            None => self.connection.query(&sql, ()).await?,
        };

        match rows.next().await? {
            Some(row) => Ok(Some(self.row_to_record(row, key)?)),
            None => Ok(None),
        }
    }

    /// Every active row across every key in this family — the Verifier's
    /// reconciliation input (§4.I).
    #[instrument(skip(self))]
    pub async fn all_active(&self) -> Result<Vec<ArtifactRecord>, DbError> {
        let table = table_name(self.family);
        let sql = match self.family {
            ArtifactFamily::Spine => {
                format!("SELECT id, 0, file_hash, download_time, active, storage_location FROM {table} WHERE active = 1")
            }
            _ => format!(
                "SELECT id, productid, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE active = 1 ORDER BY productid"
            ),
        };
        let mut rows = self.connection.query(&sql, ()).await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let productid: i64 = row.get(1).map_err(|e| DbError::Mapping(e.to_string()))?;
            let key = match self.family {
                ArtifactFamily::Spine => ArtifactKey::Spine,
                ArtifactFamily::Cube => ArtifactKey::Cube(wds_domain_models::ProductId(productid)),
                ArtifactFamily::Metadata => ArtifactKey::Metadata(wds_domain_models::ProductId(productid)),
            };
            records.push(self.row_to_record(row, key)?);
        }
        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn find_by_hash(
        &self,
        key: ArtifactKey,
        hash: &Hash12,
    ) -> Result<Option<ArtifactRecord>, DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!(
                "SELECT id, productid, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE productid = ?1 AND file_hash = ?2"
            ),
            None => format!(
                "SELECT id, 0, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE file_hash = ?1"
            ),
        };
        let mut rows = match key.productid() {
            Some(productid) => self.connection.query(&sql, params![productid.0, hash.as_str()]).await?,
            None => self.connection.query(&sql, params![hash.as_str()]).await?,
        };

        match rows.next().await? {
            Some(row) => Ok(Some(self.row_to_record(row, key)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn history(&self, key: ArtifactKey) -> Result<Vec<ArtifactRecord>, DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!(
                "SELECT id, productid, file_hash, download_time, active, storage_location \
                 FROM {table} WHERE productid = ?1 ORDER BY id DESC"
            ),
            None => format!(
                "SELECT id, 0, file_hash, download_time, active, storage_location \
                 FROM {table} ORDER BY id DESC"
            ),
        };
        let mut rows = match key.productid() {
            Some(productid) => self.connection.query(&sql, params![productid.0]).await?,
            None => self.connection.query(&sql, ()).await?,
        };

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(self.row_to_record(row, key)?);
        }
        Ok(records)
    }

    /// Deletes row `id`. Returns `Err(DbError::NoActiveArtifact)` when the
    /// deleted row was the family's active row for `key` — deletion still
    /// took effect, but the caller (typically the Verifier) must reconcile
    /// by marking the key's status pending again.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: ArtifactKey, id: i64) -> Result<(), DbError> {
        let table = table_name(self.family);
        let select_sql = format!(
            "SELECT id, {}, file_hash, download_time, active, storage_location FROM {table} WHERE id = ?1",
            if key.productid().is_some() { "productid" } else { "0" }
        );
        let mut rows = self.connection.query(&select_sql, params![id]).await?;
        let row = rows.next().await?;
        let was_active = match row {
            Some(row) => self.row_to_record(row, key)?.active,
            None => return Ok(()),
        };

        let delete_sql = format!("DELETE FROM {table} WHERE id = ?1");
        self.connection.execute(&delete_sql, params![id]).await?;

        if was_active {
            Err(DbError::NoActiveArtifact)
        } else {
            Ok(())
        }
    }

    fn row_to_record(&self, row: libsql::Row, key: ArtifactKey) -> Result<ArtifactRecord, DbError> {
        let id: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
        let file_hash: String = row.get(2).map_err(|e| DbError::Mapping(e.to_string()))?;
        let download_time: String = row.get(3).map_err(|e| DbError::Mapping(e.to_string()))?;
        let active: i64 = row.get(4).map_err(|e| DbError::Mapping(e.to_string()))?;
        let storage_location: String = row.get(5).map_err(|e| DbError::Mapping(e.to_string()))?;

        Ok(ArtifactRecord {
            id,
            key,
            file_hash: Hash12::from_full_hex(&file_hash),
            download_time: chrono::DateTime::parse_from_rfc3339(&download_time)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DbError::Mapping(e.to_string()))?,
            active: active != 0,
            storage_location,
        })
    }
}
