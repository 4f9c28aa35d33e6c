use crate::errors::DbError;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Connection};
use tracing::instrument;
use wds_domain_models::{ArtifactFamily, ArtifactKey, Hash12, ProductId};

fn table_name(family: ArtifactFamily) -> &'static str {
    match family {
        ArtifactFamily::Spine => "raw_files_spine_status",
        ArtifactFamily::Cube => "raw_files_cube_status",
        ArtifactFamily::Metadata => "raw_files_metadata_status",
    }
}

/// Per-key bookkeeping (§3 "Artifact status", §5.1 claim protocol). Spine has
/// a single singleton row; cube/metadata status is keyed by `productid`.
pub struct StatusRepository {
    connection: Connection,
    family: ArtifactFamily,
}

impl StatusRepository {
    pub fn new(connection: Connection, family: ArtifactFamily) -> Self {
        Self { connection, family }
    }

    /// Inserts a status row with `download_pending = true` if one doesn't
    /// already exist for `key`. Used by cube-status seeding (§4.D) to bring
    /// newly-discovered spine productids into the fetch loop.
    #[instrument(skip(self))]
    pub async fn seed(&self, key: ArtifactKey) -> Result<(), DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!(
                "INSERT INTO {table} (productid, download_pending) VALUES (?1, 1) \
                 ON CONFLICT DO NOTHING"
            ),
            None => format!(
                "INSERT INTO {table} (singleton, download_pending) VALUES (0, 1) \
                 ON CONFLICT DO NOTHING"
            ),
        };
        match key.productid() {
            Some(productid) => self.connection.execute(&sql, params![productid.0]).await,
            None => self.connection.execute(&sql, ()).await,
        }?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_pending(&self, key: ArtifactKey) -> Result<(), DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!("UPDATE {table} SET download_pending = 1, claimed_by = NULL WHERE productid = ?1"),
            None => format!("UPDATE {table} SET download_pending = 1, claimed_by = NULL WHERE singleton = 0"),
        };
        match key.productid() {
            Some(productid) => self.connection.execute(&sql, params![productid.0]).await,
            None => self.connection.execute(&sql, ()).await,
        }?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_fetched(
        &self,
        key: ArtifactKey,
        hash: &Hash12,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!(
                "UPDATE {table} SET download_pending = 0, claimed_by = NULL, \
                 last_download = ?1, last_file_hash = ?2 WHERE productid = ?3"
            ),
            None => format!(
                "UPDATE {table} SET download_pending = 0, claimed_by = NULL, \
                 last_download = ?1, last_file_hash = ?2 WHERE singleton = 0"
            ),
        };
        let timestamp = fetched_at.to_rfc3339();
        match key.productid() {
            Some(productid) => {
                self.connection
                    .execute(&sql, params![timestamp, hash.as_str(), productid.0])
                    .await
            }
            None => self.connection.execute(&sql, params![timestamp, hash.as_str()]).await,
        }?;
        Ok(())
    }

    /// Releases a claim without changing `download_pending`, so the key goes
    /// back into the candidate pool for the next worker — used after a
    /// transient fetch failure (§7).
    #[instrument(skip(self))]
    pub async fn release_claim(&self, key: ArtifactKey) -> Result<(), DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!("UPDATE {table} SET claimed_by = NULL WHERE productid = ?1"),
            None => format!("UPDATE {table} SET claimed_by = NULL WHERE singleton = 0"),
        };
        match key.productid() {
            Some(productid) => self.connection.execute(&sql, params![productid.0]).await,
            None => self.connection.execute(&sql, ()).await,
        }?;
        Ok(())
    }

    /// Software compare-and-swap claim (§5.1): pick one unclaimed pending
    /// candidate, then attempt to stamp it with `worker_id`, re-checking that
    /// nobody claimed it first. Returns `None` once no pending, unclaimed
    /// candidates remain.
    #[instrument(skip(self, worker_id))]
    pub async fn claim_next(&self, worker_id: &str) -> Result<Option<ArtifactKey>, DbError> {
        let table = table_name(self.family);

        loop {
            let select_sql = match self.family {
                ArtifactFamily::Spine => {
                    format!("SELECT singleton FROM {table} WHERE download_pending = 1 AND claimed_by IS NULL LIMIT 1")
                }
                _ => format!(
                    "SELECT productid FROM {table} WHERE download_pending = 1 AND claimed_by IS NULL \
                     ORDER BY productid LIMIT 1"
                ),
            };
            let mut rows = self.connection.query(&select_sql, ()).await?;
            let candidate: Option<i64> = match rows.next().await? {
                Some(row) => Some(row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?),
                None => None,
            };
            drop(rows);

            let Some(candidate) = candidate else {
                return Ok(None);
            };

            let claim_sql = match self.family {
                ArtifactFamily::Spine => format!(
                    "UPDATE {table} SET claimed_by = ?1 WHERE singleton = 0 AND claimed_by IS NULL"
                ),
                _ => format!(
                    "UPDATE {table} SET claimed_by = ?1 WHERE productid = ?2 AND claimed_by IS NULL"
                ),
            };
            let claimed_rows = match self.family {
                ArtifactFamily::Spine => self.connection.execute(&claim_sql, params![worker_id]).await?,
                _ => {
                    self.connection
                        .execute(&claim_sql, params![worker_id, candidate])
                        .await?
                }
            };

            if claimed_rows > 0 {
                let key = match self.family {
                    ArtifactFamily::Spine => ArtifactKey::Spine,
                    ArtifactFamily::Cube => ArtifactKey::Cube(ProductId(candidate)),
                    ArtifactFamily::Metadata => ArtifactKey::Metadata(ProductId(candidate)),
                };
                return Ok(Some(key));
            }
            // Someone else claimed it between our SELECT and UPDATE; loop and
            // try the next candidate instead of returning a false negative.
        }
    }

    /// Raw listing of pending keys, independent of claim state — used for
    /// reporting and by `seed-status`'s "already present" check.
    #[instrument(skip(self))]
    pub async fn pending_keys(&self) -> Result<Vec<ArtifactKey>, DbError> {
        let table = table_name(self.family);
        let sql = match self.family {
            ArtifactFamily::Spine => format!("SELECT singleton FROM {table} WHERE download_pending = 1"),
            _ => format!("SELECT productid FROM {table} WHERE download_pending = 1 ORDER BY productid"),
        };
        let mut rows = self.connection.query(&sql, ()).await?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            let value: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            keys.push(match self.family {
                ArtifactFamily::Spine => ArtifactKey::Spine,
                ArtifactFamily::Cube => ArtifactKey::Cube(ProductId(value)),
                ArtifactFamily::Metadata => ArtifactKey::Metadata(ProductId(value)),
            });
        }
        Ok(keys)
    }

    /// `true` if a status row exists for `key` at all (seeded or not).
    #[instrument(skip(self))]
    pub async fn exists(&self, key: ArtifactKey) -> Result<bool, DbError> {
        let table = table_name(self.family);
        let sql = match key.productid() {
            Some(_) => format!("SELECT 1 FROM {table} WHERE productid = ?1"),
            None => format!("SELECT 1 FROM {table} WHERE singleton = 0"),
        };
        let mut rows = match key.productid() {
            Some(productid) => self.connection.query(&sql, params![productid.0]).await?,
            None => self.connection.query(&sql, ()).await?,
        };
        Ok(rows.next().await?.is_some())
    }

    /// Metadata-only: the hash that was last fully loaded into the raw
    /// dimension/member tables, distinct from the artifact's current hash.
    /// Used by the Raw Dimension Loader (§4.F) to detect "hash advanced
    /// since last load" without reloading unchanged metadata.
    #[instrument(skip(self))]
    pub async fn last_loaded_hash(&self, productid: ProductId) -> Result<Option<Hash12>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT last_loaded_hash FROM raw_files_metadata_status WHERE productid = ?1",
                params![productid.0],
            )
            .await?;
        match rows.next().await? {
            Some(row) => {
                let value: Option<String> = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
                Ok(value.map(|h| Hash12::from_full_hex(&h)))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_loaded(&self, productid: ProductId, hash: &Hash12) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE raw_files_metadata_status SET last_loaded_hash = ?1 WHERE productid = ?2",
                params![hash.as_str(), productid.0],
            )
            .await?;
        Ok(())
    }

    /// Spine-only: the date the spine was last loaded into the spine tables,
    /// distinct from when it was last downloaded. Feeds the lower bound of
    /// changed-cube discovery (§4.D) so a re-run doesn't re-walk dates
    /// already covered by the spine's most recent load.
    #[instrument(skip(self))]
    pub async fn spine_last_loaded_date(&self) -> Result<Option<NaiveDate>, DbError> {
        let mut rows = self
            .connection
            .query("SELECT last_loaded_date FROM raw_files_spine_status WHERE singleton = 0", ())
            .await?;
        match rows.next().await? {
            Some(row) => {
                let value: Option<String> = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
                Ok(value.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_spine_loaded(&self, date: NaiveDate) -> Result<(), DbError> {
        self.connection
            .execute(
                "UPDATE raw_files_spine_status SET last_loaded_date = ?1 WHERE singleton = 0",
                params![date.format("%Y-%m-%d").to_string()],
            )
            .await?;
        Ok(())
    }
}
