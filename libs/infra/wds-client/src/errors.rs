use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("WDS request to {endpoint} failed after retries: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("WDS returned HTTP {status} for {endpoint}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("failed to parse WDS response body for {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Transient failures are worth retrying (5xx, connection reset, timeout);
    /// 4xx and decode failures are not — retrying a malformed request just
    /// burns the rate-limit budget for no benefit.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ClientError::UnexpectedStatus { status, .. } => status.is_server_error(),
            ClientError::Decode { .. } => false,
        }
    }
}
