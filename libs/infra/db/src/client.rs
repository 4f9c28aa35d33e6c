use crate::errors::DbError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

/// Owns the libsql `Database` handle and hands out fresh `Connection`s. The
/// relational store is used as durable key/value storage with transactions
/// (per SPEC_FULL §1); this client doesn't pool connections beyond what
/// libsql itself does, matching the teacher's shape.
#[derive(Clone)]
pub struct DbClient {
    database: Arc<Database>,
    /// Local in-memory databases are purged once every connection handle is
    /// dropped; holding one open keeps the schema alive for the process
    /// lifetime when `database_url` is `:memory:` (used by integration tests).
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(database_token))]
    pub async fn connect(database_url: &str, database_token: Option<String>) -> Result<Self, DbError> {
        if database_url.is_empty() {
            return Err(DbError::Connection("database URL is empty".into()));
        }

        let is_remote = database_url.starts_with("libsql://") || database_url.starts_with("https://");
        let is_memory = database_url.contains(":memory:");

        let database = if is_remote {
            let token = database_token
                .ok_or_else(|| DbError::Connection("remote database requires an auth token".into()))?;
            Builder::new_remote(database_url.to_string(), token)
                .build()
                .await
        } else {
            Builder::new_local(database_url).build().await
        }
        .map_err(|e| DbError::Connection(format!("failed to open database driver: {e}")))?;

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database
                .connect()
                .map_err(|e| DbError::Connection(format!("failed to open memory anchor: {e}")))?;
            apply_schema(&anchor_conn).await?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = database
                .connect()
                .map_err(|e| DbError::Connection(format!("failed to open bootstrap connection: {e}")))?;
            apply_schema(&bootstrap_conn).await?;
        }

        info!(database_url, "connected and schema synchronized");
        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn connection(&self) -> Result<Connection, DbError> {
        self.database
            .connect()
            .map_err(|e| DbError::Connection(e.to_string()))
    }
}
