use crate::errors::ClientError;
use crate::wire::{ChangedCubeWire, WdsEnvelope};
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{instrument, warn};
use wds_domain_models::ProductId;

/// A changed-cube fact as reported by `getChangedCubeList`, already parsed out
/// of the WDS envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedCubeEntry {
    pub productid: ProductId,
    pub release_time: DateTime<Utc>,
}

/// Minimum spacing between consecutive calls to the same endpoint class, per
/// §6's rate floor (metadata ≥1s, cube downloads ≥2s). The spine/changed-cube
/// list endpoints are cheap and share the metadata floor.
#[derive(Debug, Clone, Copy)]
pub struct PolitenessPolicy {
    pub metadata_delay: Duration,
    pub cube_delay: Duration,
}

impl Default for PolitenessPolicy {
    fn default() -> Self {
        Self {
            metadata_delay: Duration::from_secs(1),
            cube_delay: Duration::from_secs(2),
        }
    }
}

/// Pure adapter over the four WDS operations this pipeline needs. Retries
/// transient errors with exponential backoff bounded by `per_call_deadline`;
/// never touches disk or the database itself — that's the scheduler's job.
pub struct WdsClient {
    http: Client,
    base_url: String,
    per_call_deadline: Duration,
    politeness: PolitenessPolicy,
    last_metadata_call: Mutex<Option<tokio::time::Instant>>,
    last_cube_call: Mutex<Option<tokio::time::Instant>>,
}

impl WdsClient {
    pub fn new(base_url: impl Into<String>, per_call_deadline: Duration) -> Self {
        Self::with_politeness(base_url, per_call_deadline, PolitenessPolicy::default())
    }

    pub fn with_politeness(
        base_url: impl Into<String>,
        per_call_deadline: Duration,
        politeness: PolitenessPolicy,
    ) -> Self {
        let http = Client::builder()
            .user_agent(concat!("wds-ingestor/", env!("CARGO_PKG_VERSION")))
            .timeout(per_call_deadline)
            .build()
            .expect("reqwest client configuration is static and always valid");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            per_call_deadline,
            politeness,
            last_metadata_call: Mutex::new(None),
            last_cube_call: Mutex::new(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all_cubes(&self) -> Result<Vec<u8>, ClientError> {
        self.wait_politely(&self.last_metadata_call, self.politeness.metadata_delay)
            .await;
        self.get_bytes("getAllCubesListLite").await
    }

    #[instrument(skip(self))]
    pub async fn changed_cube_list(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ChangedCubeEntry>, ClientError> {
        self.wait_politely(&self.last_metadata_call, self.politeness.metadata_delay)
            .await;
        let endpoint = "getChangedCubeList";
        let path = format!("getChangedCubeList/{}", date.format("%Y-%m-%d"));
        let bytes = self.get_bytes_at(endpoint, &path).await?;

        let envelopes: Vec<WdsEnvelope<ChangedCubeWire>> =
            serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
                endpoint,
                source,
            })?;

        let mut entries = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            if envelope.status != "SUCCESS" {
                warn!(status = %envelope.status, "changed-cube entry reported non-success status");
                continue;
            }
            let release_time = DateTime::parse_from_rfc3339(&envelope.object.release_time)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            entries.push(ChangedCubeEntry {
                productid: ProductId(envelope.object.product_id),
                release_time,
            });
        }
        Ok(entries)
    }

    #[instrument(skip(self))]
    pub async fn cube_metadata(&self, productid: ProductId) -> Result<Vec<u8>, ClientError> {
        self.wait_politely(&self.last_metadata_call, self.politeness.metadata_delay)
            .await;
        let path = format!("getCubeMetadata/{productid}");
        self.get_bytes_at("getCubeMetadata", &path).await
    }

    #[instrument(skip(self))]
    pub async fn download_cube_csv(&self, productid: ProductId) -> Result<Vec<u8>, ClientError> {
        self.wait_politely(&self.last_cube_call, self.politeness.cube_delay)
            .await;

        // getFullTableDownloadCSV returns a signed URL; the file itself is
        // fetched with a single follow-up redirect-following GET.
        let location_path = format!("getFullTableDownloadCSV/{productid}/en");
        let location_bytes = self
            .get_bytes_at("getFullTableDownloadCSV", &location_path)
            .await?;

        let endpoint = "getFullTableDownloadCSV";
        let location: WdsEnvelope<String> =
            serde_json::from_slice(&location_bytes).map_err(|source| ClientError::Decode {
                endpoint,
                source,
            })?;
        let signed_url = location.object;

        self.fetch_with_retry("downloadCubeCsv", || {
            self.http.get(&signed_url).send()
        })
        .await
    }

    async fn wait_politely(&self, last_call: &Mutex<Option<tokio::time::Instant>>, floor: Duration) {
        let mut guard = last_call.lock().await;
        if let Some(previous) = *guard {
            let elapsed = previous.elapsed();
            if elapsed < floor {
                tokio::time::sleep(floor - elapsed).await;
            }
        }
        *guard = Some(tokio::time::Instant::now());
    }

    async fn get_bytes(&self, endpoint: &'static str) -> Result<Vec<u8>, ClientError> {
        self.get_bytes_at(endpoint, endpoint).await
    }

    async fn get_bytes_at(&self, endpoint: &'static str, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}/{}", self.base_url, path);
        self.fetch_with_retry(endpoint, || self.http.get(&url).send())
            .await
    }

    async fn fetch_with_retry<F, Fut>(
        &self,
        endpoint: &'static str,
        request: F,
    ) -> Result<Vec<u8>, ClientError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let backoff_policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(self.per_call_deadline * 4))
            .build();

        retry(backoff_policy, || async {
            let response = match request().await {
                Ok(response) => response,
                Err(source) => {
                    let err = ClientError::Transport { endpoint, source };
                    return if err.is_transient() {
                        warn!(endpoint, "transient WDS transport failure, retrying");
                        Err(backoff::Error::transient(err))
                    } else {
                        Err(backoff::Error::permanent(err))
                    };
                }
            };

            let status = response.status();
            if status == StatusCode::OK {
                let bytes = match response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(source) => {
                        return Err(backoff::Error::permanent(ClientError::Transport {
                            endpoint,
                            source,
                        }))
                    }
                };
                return Ok(bytes.to_vec());
            }

            let err = ClientError::UnexpectedStatus { endpoint, status };
            if err.is_transient() {
                warn!(%status, endpoint, "transient WDS failure, retrying");
                Err(backoff::Error::transient(err))
            } else {
                Err(backoff::Error::permanent(err))
            }
        })
        .await
    }
}
