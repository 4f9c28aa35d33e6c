use serde::Deserialize;

/// WDS wraps most JSON responses in a per-item envelope reporting whether that
/// particular lookup succeeded, independent of the HTTP status code.
#[derive(Debug, Deserialize)]
pub(crate) struct WdsEnvelope<T> {
    pub status: String,
    pub object: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangedCubeWire {
    #[serde(rename = "productId")]
    pub product_id: i64,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
}
