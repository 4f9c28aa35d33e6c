use crate::ids::{Hash12, ProductId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three artifact families tracked in parallel by the Ingestion Scheduler.
/// Spine has no `productid`; cube and metadata artifacts are keyed by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactFamily {
    Spine,
    Cube,
    Metadata,
}

impl ArtifactFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactFamily::Spine => "spine",
            ArtifactFamily::Cube => "cubes",
            ArtifactFamily::Metadata => "metadata",
        }
    }
}

impl fmt::Display for ArtifactFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one artifact lifecycle: a family, plus a productid for the two
/// families that have one. `ArtifactKey::Spine` is the sole key for that family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKey {
    Spine,
    Cube(ProductId),
    Metadata(ProductId),
}

impl ArtifactKey {
    pub fn family(&self) -> ArtifactFamily {
        match self {
            ArtifactKey::Spine => ArtifactFamily::Spine,
            ArtifactKey::Cube(_) => ArtifactFamily::Cube,
            ArtifactKey::Metadata(_) => ArtifactFamily::Metadata,
        }
    }

    pub fn productid(&self) -> Option<ProductId> {
        match self {
            ArtifactKey::Spine => None,
            ArtifactKey::Cube(p) | ArtifactKey::Metadata(p) => Some(*p),
        }
    }
}

/// One row of an artifact family's history. At most one row per `(family, key)`
/// has `active = true`; history rows are retained with `active = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: i64,
    pub key: ArtifactKey,
    pub file_hash: Hash12,
    pub download_time: DateTime<Utc>,
    pub active: bool,
    pub storage_location: String,
}

/// Per-key bookkeeping row driving the scheduler's state machine. Invariant: if
/// `download_pending` is true, the next scheduler pass must attempt a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub key: ArtifactKey,
    pub last_download: Option<DateTime<Utc>>,
    pub download_pending: bool,
    pub last_file_hash: Option<Hash12>,
}

impl ArtifactStatus {
    pub fn seed(key: ArtifactKey) -> Self {
        Self {
            key,
            last_download: None,
            download_pending: true,
            last_file_hash: None,
        }
    }
}

/// Write-once `(productid, change_date)` fact recorded by cube-change discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub productid: ProductId,
    pub change_date: NaiveDate,
}
