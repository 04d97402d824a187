//! Tile manager types.

use std::fmt;

use crate::coord::TileHead;
use crate::provider::TileServerKind;
use crate::stats::FetchStatsSnapshot;

/// Encoded image bytes of one tile.
#[derive(Clone, PartialEq, Eq)]
pub struct TileImage {
    pub head: TileHead,
    pub bytes: Vec<u8>,
}

impl TileImage {
    pub fn new(head: TileHead, bytes: Vec<u8>) -> Self {
        Self { head, bytes }
    }
}

impl fmt::Debug for TileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileImage")
            .field("head", &self.head)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One request to the tile manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub heads: Vec<TileHead>,
    pub kind: TileServerKind,
}

/// Results of one completed batch.
///
/// `images` holds between zero and `requested.len()` entries in completion
/// order; tiles that failed are simply absent.
#[derive(Debug, Clone)]
pub struct TileBatch {
    /// Monotonic batch number within one manager
    pub sequence: u64,
    pub kind: TileServerKind,
    pub requested: Vec<TileHead>,
    pub images: Vec<TileImage>,
    pub stats: FetchStatsSnapshot,
}

/// Receiver of finished batches.
///
/// Called from a fetch worker thread; implementations should hand the batch
/// off (for example over a channel) rather than do heavy work inline.
pub trait TileSink: Send + Sync {
    fn send_tiles(&self, batch: TileBatch);
}

impl<F> TileSink for F
where
    F: Fn(TileBatch) + Send + Sync,
{
    fn send_tiles(&self, batch: TileBatch) {
        self(batch)
    }
}

/// Anything that accepts tile requests.
///
/// Implemented by [`super::TileManager`]; the map generator depends on this
/// trait only.
pub trait TileRequester: Send + Sync {
    fn request_tiles(&self, heads: Vec<TileHead>, kind: TileServerKind);
}
