use crate::config::IngestConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use wds_client::WdsClient;
use wds_content_store::ContentStore;
use wds_db::DbClient;
use wds_normalizer::{DefaultNormalizer, LabelNormalizer};

/// One root context per CLI invocation, bundling every shared handle a
/// subcommand might need. Built once in `main` and passed down by reference,
/// rather than each subcommand reopening its own database/client.
pub struct AppContext {
    pub db: Arc<DbClient>,
    pub client: Arc<WdsClient>,
    pub content_store: Arc<ContentStore>,
    pub normalizer: Arc<dyn LabelNormalizer>,
    pub config: IngestConfig,
}

impl AppContext {
    pub async fn build(config: IngestConfig) -> Result<Self> {
        let db = DbClient::connect(&config.database_url, config.database_token.clone())
            .await
            .context("failed to connect to the database")?;
        let client = WdsClient::new(config.base_url.clone(), config.http_timeout());
        let content_store = ContentStore::new(config.content_root.clone());

        Ok(Self {
            db: Arc::new(db),
            client: Arc::new(client),
            content_store: Arc::new(content_store),
            normalizer: Arc::new(DefaultNormalizer),
            config,
        })
    }
}
