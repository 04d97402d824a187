//! On-disk tile cache.
//!
//! Append-only: a tile file, once written, is never invalidated. The
//! presence of the file is the only cache-hit test, so an empty or corrupt
//! file is served as-is. Writes go to a `.tmp` sibling first and are
//! renamed into place, so an interrupted write never leaves a partial tile
//! under the final name.
//!
//! Column directories are created lazily on the first write for a
//! `(server, z, x)` prefix. Creation is idempotent and takes no lock;
//! concurrent writers racing on the same prefix both succeed.

use dashmap::DashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

use super::path::{column_directory, tile_path};
use crate::coord::TileHead;

/// Errors from cache reads and writes.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read cached tile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write cached tile {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Tile cache rooted at one directory, shared across servers.
#[derive(Debug)]
pub struct DiskTileCache {
    root: PathBuf,
    /// Column directories known to exist
    prepared: DashSet<PathBuf>,
}

impl DiskTileCache {
    /// Creates a cache rooted at `root`. Nothing is touched on disk until
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prepared: DashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a tile is (or would be) stored at.
    pub fn path_for(&self, server: &str, head: &TileHead) -> PathBuf {
        tile_path(&self.root, server, head)
    }

    /// Whether a file exists for this tile.
    pub fn contains(&self, server: &str, head: &TileHead) -> bool {
        self.path_for(server, head).is_file()
    }

    /// Reads a cached tile. `Ok(None)` is a miss.
    pub async fn read(&self, server: &str, head: &TileHead) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(server, head);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                trace!(path = %path.display(), bytes = bytes.len(), "Cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Stores a tile, creating its column directory if needed.
    ///
    /// The bytes land in `<y>.tmp` and are renamed to `<y>.png` once fully
    /// written. On failure the temp file is removed and no entry appears.
    pub async fn write(
        &self,
        server: &str,
        head: &TileHead,
        bytes: &[u8],
    ) -> Result<(), CacheError> {
        self.prepare_column(server, head).await?;

        let path = self.path_for(server, head);
        let temp_path = path.with_extension("tmp");
        let staged = match tokio::fs::write(&temp_path, bytes).await {
            Ok(()) => tokio::fs::rename(&temp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(source) = staged {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(CacheError::Write { path, source });
        }

        trace!(path = %path.display(), bytes = bytes.len(), "Tile cached");
        Ok(())
    }

    async fn prepare_column(&self, server: &str, head: &TileHead) -> Result<(), CacheError> {
        let dir = column_directory(&self.root, server, head);
        if self.prepared.contains(&dir) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        debug!(dir = %dir.display(), "Cache column directory ready");
        self.prepared.insert(dir);
        Ok(())
    }
}
