//! Content-addressed clip storage shared by every narration in the process.
//!
//! Entries are keyed by [`Fingerprint`] and never mutated. Writes go
//! through a temporary file in the cache directory followed by a rename,
//! so readers never see a partial clip and racing writers of the same key
//! resolve as last-writer-wins.

use narrator_domain::Fingerprint;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{NarratorError, Result};

#[derive(Debug, Clone)]
pub struct ClipCache {
    root: PathBuf,
    extension: String,
}

impl ClipCache {
    /// Open (creating if needed) a cache rooted at `root` whose clips use
    /// the given file extension.
    pub async fn open(root: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| NarratorError::io(&root, e))?;
        Ok(Self {
            root,
            extension: extension.into().trim_start_matches('.').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root
            .join(format!("{}.{}", fingerprint.file_stem(), self.extension))
    }

    /// A zero-length file counts as absent.
    pub async fn contains(&self, fingerprint: &Fingerprint) -> bool {
        tokio::fs::metadata(self.path_for(fingerprint))
            .await
            .is_ok_and(|meta| meta.is_file() && meta.len() > 0)
    }

    pub async fn load(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(fingerprint);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NarratorError::io(path, e)),
        }
    }

    pub async fn store(&self, fingerprint: &Fingerprint, bytes: Vec<u8>) -> Result<PathBuf> {
        let root = self.root.clone();
        let path = self.path_for(fingerprint);
        let target = path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&root, &target, &bytes))
            .await
            .map_err(|e| NarratorError::io(&path, std::io::Error::other(e)))?
            .map_err(|e| NarratorError::io(&path, e))?;

        debug!(path = %path.display(), "stored clip");
        Ok(path)
    }
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staging = tempfile::NamedTempFile::new_in(dir)?;
    staging.write_all(bytes)?;
    staging.as_file().sync_all()?;
    staging.persist(target).map_err(|e| e.error)?;
    Ok(())
}
