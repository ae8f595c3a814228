//! Durable artifact storage.
//!
//! Each token persists as two files under the output root, `{id}.png` and
//! `{id}.json`. A hit requires both: a token with only one file present is
//! a partial write left by a crash and reads as a miss, so the next
//! request regenerates and repairs it.
//!
//! Writes land atomically via write-to-temp-then-rename, image first. At
//! no point is a metadata file visible without its image.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::{
    artifact::errors::ArtifactError,
    types::{CachedArtifact, Metadata, TokenId},
};

/// File-backed artifact store with atomic per-token writes.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    #[must_use]
    pub fn image_path(&self, token_id: TokenId) -> PathBuf {
        self.output_dir.join(format!("{token_id}.png"))
    }

    #[must_use]
    pub fn metadata_path(&self, token_id: TokenId) -> PathBuf {
        self.output_dir.join(format!("{token_id}.json"))
    }

    /// Reads a complete artifact, or `None` on any kind of miss.
    ///
    /// Unparseable metadata counts as a miss rather than an error: it is
    /// the on-disk residue of a torn write and regeneration repairs it.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Storage`] only for I/O failures other than
    /// absence.
    pub async fn read(&self, token_id: TokenId) -> Result<Option<CachedArtifact>, ArtifactError> {
        let image = match tokio::fs::read(self.image_path(token_id)).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_err("read image", &e)),
        };

        let metadata_raw = match tokio::fs::read(self.metadata_path(token_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_err("read metadata", &e)),
        };

        match serde_json::from_slice::<Metadata>(&metadata_raw) {
            Ok(metadata) => Ok(Some(CachedArtifact { image, metadata })),
            Err(e) => {
                tracing::warn!(token_id, error = %e, "corrupt metadata on disk, treating as miss");
                Ok(None)
            }
        }
    }

    /// Persists both artifact files, image before metadata, each via
    /// temp-then-rename.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Storage`] on any I/O failure.
    pub async fn write(
        &self,
        token_id: TokenId,
        artifact: &CachedArtifact,
    ) -> Result<(), ArtifactError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| storage_err("create output dir", &e))?;

        let metadata_json = serde_json::to_vec(&artifact.metadata)
            .map_err(|e| ArtifactError::Storage(format!("serialize metadata: {e}")))?;

        write_atomic(&self.image_path(token_id), &artifact.image).await?;
        write_atomic(&self.metadata_path(token_id), &metadata_json).await?;

        tracing::debug!(token_id, bytes = artifact.image.len(), "artifact persisted");
        Ok(())
    }
}

async fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), ArtifactError> {
    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| storage_err("write temp file", &e))?;
    tokio::fs::rename(&tmp, target)
        .await
        .map_err(|e| storage_err("rename temp file", &e))?;
    Ok(())
}

fn storage_err(context: &str, err: &std::io::Error) -> ArtifactError {
    ArtifactError::Storage(format!("{context}: {err}"))
}
