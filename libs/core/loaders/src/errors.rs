use thiserror::Error;
use wds_domain_models::ProductId;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to parse spine JSON: {0}")]
    SpineParse(#[from] serde_json::Error),

    #[error("failed to parse metadata JSON for product {productid}: {source}")]
    MetadataParse {
        productid: ProductId,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Db(#[from] wds_db::DbError),
}
