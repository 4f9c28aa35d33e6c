use crate::errors::StoreError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use wds_domain_models::{ArtifactFamily, Hash12};

/// Outcome of `ContentStore::put`: the content address and the path it now
/// lives at, whether this call wrote a new file or found an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    pub hash: Hash12,
    pub path: PathBuf,
    pub newly_written: bool,
}

/// Filesystem store addressed by SHA-256, fanned out two levels deep by hash
/// prefix under `<root>/<family>/<prefix>/<hash>.<ext>`. Safe for concurrent
/// `put`: the final path is only ever reached via an atomic rename, so two
/// writers racing on the same content converge on the same file.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Computes the canonical path for a given family/hash pair without
    /// touching the filesystem. `extension` matches the family's artifact
    /// type (`json` for spine/metadata, `zip` for cube CSVs).
    pub fn path_for(&self, family: ArtifactFamily, hash: &Hash12, extension: &str) -> PathBuf {
        self.root
            .join(family.as_str())
            .join(hash.fanout_prefix())
            .join(format!("{hash}.{extension}"))
    }

    #[instrument(skip(self, payload))]
    pub async fn put(
        &self,
        family: ArtifactFamily,
        extension: &str,
        payload: &[u8],
    ) -> Result<PutOutcome, StoreError> {
        let hash = Hash12::from_full_hex(&hex::encode(Sha256::digest(payload)));
        let final_path = self.path_for(family, &hash, extension);

        if fs::metadata(&final_path).await.is_ok() {
            debug!(path = %final_path.display(), "content already present, skipping write");
            return Ok(PutOutcome {
                hash,
                path: final_path,
                newly_written: false,
            });
        }

        let parent = final_path
            .parent()
            .expect("path_for always nests under root/family/prefix");
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;

        let temp_path = parent.join(format!(".{hash}.{extension}.tmp"));
        {
            let mut temp_file =
                fs::File::create(&temp_path)
                    .await
                    .map_err(|source| StoreError::Write {
                        path: temp_path.clone(),
                        source,
                    })?;
            temp_file
                .write_all(payload)
                .await
                .map_err(|source| StoreError::Write {
                    path: temp_path.clone(),
                    source,
                })?;
            temp_file.sync_all().await.map_err(|source| StoreError::Write {
                path: temp_path.clone(),
                source,
            })?;
        }

        match fs::rename(&temp_path, &final_path).await {
            Ok(()) => Ok(PutOutcome {
                hash,
                path: final_path,
                newly_written: true,
            }),
            Err(source) => {
                // Another writer may have published the same content between
                // our existence check and our rename; that's success, not a
                // race to report.
                let _ = fs::remove_file(&temp_path).await;
                if fs::metadata(&final_path).await.is_ok() {
                    Ok(PutOutcome {
                        hash,
                        path: final_path,
                        newly_written: false,
                    })
                } else {
                    Err(StoreError::Publish {
                        path: final_path,
                        source,
                    })
                }
            }
        }
    }

    /// Streams the file at `path` and recomputes its SHA-256, comparing the
    /// 12-char prefix against `expected`. `Ok(false)` (not an error) means the
    /// file exists but its content no longer matches — the caller decides
    /// what corruption response that implies.
    #[instrument(skip(self))]
    pub async fn verify(&self, path: &Path, expected: &Hash12) -> Result<bool, StoreError> {
        let bytes = fs::read(path).await.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let actual = Hash12::from_full_hex(&hex::encode(Sha256::digest(&bytes)));
        Ok(&actual == expected)
    }

    /// Best-effort removal; a missing file is not an error since the caller
    /// is typically cleaning up after a corruption it already detected.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &Path) {
        if let Err(source) = fs::remove_file(path).await {
            if source.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), %source, "best-effort delete failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_is_idempotent_on_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());

        let first = store.put(ArtifactFamily::Cube, "zip", b"hello").await.unwrap();
        assert!(first.newly_written);

        let second = store.put(ArtifactFamily::Cube, "zip", b"hello").await.unwrap();
        assert!(!second.newly_written);
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.path, second.path);
    }

    #[tokio::test]
    async fn verify_detects_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let outcome = store
            .put(ArtifactFamily::Metadata, "json", b"{\"a\":1}")
            .await
            .unwrap();

        assert!(store.verify(&outcome.path, &outcome.hash).await.unwrap());

        tokio::fs::write(&outcome.path, b"{\"a\":").await.unwrap();
        assert!(!store.verify(&outcome.path, &outcome.hash).await.unwrap());
    }

    #[tokio::test]
    async fn path_for_fans_out_by_two_char_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path());
        let outcome = store.put(ArtifactFamily::Spine, "json", b"spine").await.unwrap();
        let prefix = outcome.hash.fanout_prefix();
        assert!(outcome.path.starts_with(dir.path().join("spine").join(prefix)));
    }
}
