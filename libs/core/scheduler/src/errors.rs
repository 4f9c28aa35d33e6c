use thiserror::Error;
use wds_domain_models::ProductId;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Client(#[from] wds_client::ClientError),

    #[error(transparent)]
    Store(#[from] wds_content_store::StoreError),

    #[error(transparent)]
    Db(#[from] wds_db::DbError),

    #[error("product {productid} failed and was skipped: {reason}")]
    ProductSkipped { productid: ProductId, reason: String },
}
