use clap::Parser;
use std::time::Duration;

/// Environment/CLI surface for every subcommand (§6.1). Every field is
/// backed by an env var via clap's `env` feature, following the teacher's
/// `#[arg(long, env = "...")]` convention.
#[derive(Parser, Debug, Clone)]
#[command(name = "wds-ingestor", version, about = "Statistics Canada WDS ingestion pipeline")]
pub struct IngestConfig {
    /// libsql connection URL (`file:...` local or `libsql://...` remote).
    #[arg(long, env = "WDS_DATABASE_URL", default_value = "file:./wds.db")]
    pub database_url: String,

    /// Auth token, required when `database_url` is remote.
    #[arg(long, env = "WDS_DATABASE_TOKEN")]
    pub database_token: Option<String>,

    /// WDS API base URL.
    #[arg(
        long,
        env = "WDS_BASE_URL",
        default_value = "https://www150.statcan.gc.ca/t1/wds/rest"
    )]
    pub base_url: String,

    /// Content-store root directory.
    #[arg(long, env = "WDS_CONTENT_ROOT", default_value = "./content")]
    pub content_root: String,

    #[arg(long, env = "WDS_CUBE_WORKERS", default_value_t = 4)]
    pub cube_workers: usize,

    #[arg(long, env = "WDS_METADATA_WORKERS", default_value_t = 4)]
    pub metadata_workers: usize,

    #[arg(long, env = "WDS_SPINE_WORKERS", default_value_t = 4)]
    pub spine_workers: usize,

    /// Per-call HTTP deadline, in seconds.
    #[arg(long, env = "WDS_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Timezone for the 08:30 release-time offset (§9).
    #[arg(long, env = "WDS_RELEASE_OFFSET_TZ", default_value = "America/Toronto")]
    pub release_offset_tz: String,

    #[command(subcommand)]
    pub command: super::commands::Command,
}

impl IngestConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn release_tz(&self) -> chrono_tz::Tz {
        self.release_offset_tz
            .parse()
            .unwrap_or(chrono_tz::America::Toronto)
    }
}
