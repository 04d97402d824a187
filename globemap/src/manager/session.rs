//! Per-tile fetch session.
//!
//! ```text
//! CacheCheck ──hit──────────────────────────────────────────► Done
//!     │ miss
//!     ▼
//! Request(mirror) ──ok──► Persist ──► Done
//!     │ unreachable, retries left
//!     └──► Request(next mirror)
//!     │ anything else / out of retries / watchdog
//!     └──► Abandoned
//! ```
//!
//! Failures never leave the session: the caller gets `None` and the batch
//! carries on without this tile.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::TileImage;
use crate::cache::DiskTileCache;
use crate::coord::TileHead;
use crate::provider::{AsyncHttpClient, FetchError, TileServer};
use crate::stats::FetchStats;

/// Everything a session needs, shared by all sessions of one batch.
pub(crate) struct SessionContext<C> {
    pub client: Arc<C>,
    pub server: Arc<dyn TileServer>,
    pub cache: Arc<DiskTileCache>,
    pub stats: Arc<FetchStats>,
    pub max_retries: u32,
    /// Watchdog for one request attempt
    pub deadline: Duration,
}

/// Fetches one tile from cache or network.
pub(crate) async fn fetch_tile<C>(ctx: &SessionContext<C>, head: TileHead) -> Option<TileImage>
where
    C: AsyncHttpClient,
{
    let server_name = ctx.server.server_name();

    match ctx.cache.read(server_name, &head).await {
        Ok(Some(bytes)) => {
            ctx.stats.record_cache_hit();
            debug!(tile = %head, "Tile served from cache");
            return Some(TileImage::new(head, bytes));
        }
        Ok(None) => {}
        Err(e) => {
            warn!(tile = %head, error = %e, "Cache read failed, fetching from network");
        }
    }

    let mut attempt = 0;
    loop {
        let mirror = ctx.server.next_mirror();
        let url = ctx.server.tile_url(mirror, &head);

        let result = match tokio::time::timeout(ctx.deadline, ctx.client.get(&url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(format!(
                "no response from {} within {:?}",
                mirror, ctx.deadline
            ))),
        };

        match result {
            Ok(bytes) => {
                if let Err(e) = ctx.cache.write(server_name, &head, &bytes).await {
                    warn!(tile = %head, error = %e, "Failed to cache tile");
                }
                ctx.stats.record_network_fetch(mirror, bytes.len());
                debug!(tile = %head, mirror = mirror, bytes = bytes.len(), "Tile fetched");
                return Some(TileImage::new(head, bytes));
            }
            Err(e) if e.is_unreachable() && attempt < ctx.max_retries => {
                attempt += 1;
                ctx.stats.record_retry();
                debug!(
                    tile = %head,
                    mirror = mirror,
                    attempt = attempt,
                    error = %e,
                    "Mirror unreachable, retrying on next mirror"
                );
            }
            Err(e) => {
                ctx.stats.record_failure();
                warn!(tile = %head, url = %url, error = %e, "Tile abandoned");
                return None;
            }
        }
    }
}
