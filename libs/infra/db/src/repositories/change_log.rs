use crate::errors::DbError;
use chrono::NaiveDate;
use libsql::{params, Connection};
use tracing::instrument;
use wds_domain_models::{ChangeLogEntry, ProductId};

/// Append-only log of `(productid, changeDate)` pairs reported by the
/// changed-cube-list endpoint (§4.D). The composite primary key makes
/// re-recording the same change on a later run a no-op.
pub struct ChangeLogRepository {
    connection: Connection,
}

impl ChangeLogRepository {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn record(&self, entry: ChangeLogEntry) -> Result<(), DbError> {
        self.connection
            .execute(
                "INSERT INTO raw_files_changed_cubes_log (productid, change_date) VALUES (?1, ?2) \
                 ON CONFLICT DO NOTHING",
                params![entry.productid.0, entry.change_date.to_string()],
            )
            .await?;
        Ok(())
    }

    /// Distinct productids changed strictly after `since`, ordered for
    /// deterministic fetch scheduling.
    #[instrument(skip(self))]
    pub async fn changed_since(&self, since: NaiveDate) -> Result<Vec<ProductId>, DbError> {
        let mut rows = self
            .connection
            .query(
                "SELECT DISTINCT productid FROM raw_files_changed_cubes_log \
                 WHERE change_date > ?1 ORDER BY productid",
                params![since.to_string()],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            let value: i64 = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
            ids.push(ProductId(value));
        }
        Ok(ids)
    }

    #[instrument(skip(self))]
    pub async fn latest_change_date(&self) -> Result<Option<NaiveDate>, DbError> {
        let mut rows = self
            .connection
            .query("SELECT MAX(change_date) FROM raw_files_changed_cubes_log", ())
            .await?;
        match rows.next().await? {
            Some(row) => {
                let value: Option<String> = row.get(0).map_err(|e| DbError::Mapping(e.to_string()))?;
                value
                    .map(|d| {
                        NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|e| DbError::Mapping(e.to_string()))
                    })
                    .transpose()
            }
            None => Ok(None),
        }
    }
}
