//! Tile manager: batches of tile heads in, batches of tile images out.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::coalesce::Coalescer;
use super::session::{fetch_tile, SessionContext};
use super::types::{TileBatch, TileImage, TileRequest, TileRequester, TileSink};
use crate::cache::DiskTileCache;
use crate::config::NetworkConfig;
use crate::coord::TileHead;
use crate::provider::{AsyncHttpClient, TileServer, TileServerKind};
use crate::stats::FetchStats;

/// Fetches tile batches on a fixed pool of worker threads.
///
/// One batch runs at a time. A request made while a batch is running
/// replaces any earlier waiting request (heads and server kind alike) and
/// starts as soon as the running batch has been delivered.
///
/// Dropping the manager cancels in-flight fetches and joins every worker
/// thread. It must not be dropped from inside an async context.
pub struct TileManager<C: AsyncHttpClient + 'static> {
    shared: Arc<Shared<C>>,
    runtime: Option<Runtime>,
}

struct Shared<C> {
    client: Arc<C>,
    cache: Arc<DiskTileCache>,
    sink: Arc<dyn TileSink>,
    servers: HashMap<TileServerKind, Arc<dyn TileServer>>,
    state: Mutex<Coalescer<TileRequest>>,
    max_retries: u32,
    deadline: Duration,
    cancel: CancellationToken,
    handle: Handle,
    batches: AtomicU64,
}

impl<C: AsyncHttpClient + 'static> TileManager<C> {
    /// Starts the worker pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker threads cannot be spawned.
    pub fn new(
        client: C,
        cache: DiskTileCache,
        config: &NetworkConfig,
        sink: Arc<dyn TileSink>,
    ) -> Result<Self, io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.workers())
            .thread_name("globemap-fetch")
            .enable_all()
            .build()?;

        let servers = TileServerKind::all()
            .iter()
            .map(|kind| (*kind, kind.create()))
            .collect();

        let shared = Arc::new(Shared {
            client: Arc::new(client),
            cache: Arc::new(cache),
            sink,
            servers,
            state: Mutex::new(Coalescer::new()),
            max_retries: config.max_retries(),
            deadline: Duration::from_secs(
                config
                    .request_timeout_secs()
                    .max(config.connect_timeout_secs()),
            ),
            cancel: CancellationToken::new(),
            handle: runtime.handle().clone(),
            batches: AtomicU64::new(0),
        });

        info!(
            workers = config.workers(),
            max_retries = config.max_retries(),
            cache = %shared.cache.root().display(),
            "Tile manager started"
        );

        Ok(Self {
            shared,
            runtime: Some(runtime),
        })
    }

    /// Requests a batch of tiles from the given server.
    ///
    /// Returns immediately. Results arrive through the sink, exactly once
    /// per started batch.
    pub fn request_tiles(&self, heads: Vec<TileHead>, kind: TileServerKind) {
        if self.shared.cancel.is_cancelled() {
            return;
        }

        let request = TileRequest { heads, kind };
        let start = self.shared.state.lock().submit(request);

        match start {
            Some(request) => {
                let shared = Arc::clone(&self.shared);
                self.shared.handle.spawn(run_batches(shared, request));
            }
            None => debug!("Batch in flight, request left pending"),
        }
    }

    /// Whether a batch is currently running.
    pub fn is_busy(&self) -> bool {
        self.shared.state.lock().is_active()
    }

    /// Number of batches started so far.
    pub fn batches_started(&self) -> u64 {
        self.shared.batches.load(Ordering::Relaxed)
    }

    /// The server instance used for a kind.
    pub fn server(&self, kind: TileServerKind) -> Option<Arc<dyn TileServer>> {
        self.shared.servers.get(&kind).cloned()
    }

    /// Cancels in-flight fetches, then stops and joins the worker threads.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            self.shared.cancel.cancel();
            self.shared.state.lock().reset();
            // Runtime drop waits for the worker threads to exit
            drop(runtime);
            info!("Tile manager stopped");
        }
    }
}

impl<C: AsyncHttpClient + 'static> Drop for TileManager<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<C: AsyncHttpClient + 'static> TileRequester for TileManager<C> {
    fn request_tiles(&self, heads: Vec<TileHead>, kind: TileServerKind) {
        TileManager::request_tiles(self, heads, kind)
    }
}

/// Coordinator: runs a batch, delivers it, then picks up whatever request
/// arrived meanwhile.
async fn run_batches<C: AsyncHttpClient + 'static>(shared: Arc<Shared<C>>, first: TileRequest) {
    let mut request = first;
    loop {
        let batch = run_batch(&shared, request).await;
        if shared.cancel.is_cancelled() {
            return;
        }
        shared.sink.send_tiles(batch);

        let next = shared.state.lock().finish();
        match next {
            Some(next) => request = next,
            None => return,
        }
    }
}

async fn run_batch<C: AsyncHttpClient + 'static>(
    shared: &Arc<Shared<C>>,
    request: TileRequest,
) -> TileBatch {
    let sequence = shared.batches.fetch_add(1, Ordering::Relaxed) + 1;
    let stats = Arc::new(FetchStats::new());

    let mut seen = HashSet::with_capacity(request.heads.len());
    let heads: Vec<TileHead> = request
        .heads
        .into_iter()
        .filter(|head| seen.insert(*head))
        .collect();

    let Some(server) = shared.servers.get(&request.kind).cloned() else {
        warn!(kind = %request.kind, "No server for kind, delivering empty batch");
        return TileBatch {
            sequence,
            kind: request.kind,
            requested: heads,
            images: Vec::new(),
            stats: stats.snapshot(),
        };
    };

    debug!(
        sequence = sequence,
        tiles = heads.len(),
        server = server.server_name(),
        "Batch started"
    );

    let results: Arc<Mutex<Vec<TileImage>>> =
        Arc::new(Mutex::new(Vec::with_capacity(heads.len())));

    if !heads.is_empty() {
        let (release, done) = oneshot::channel();
        let countdown = Arc::new(Countdown {
            remaining: AtomicUsize::new(heads.len()),
            release: Mutex::new(Some(release)),
        });

        let ctx = Arc::new(SessionContext {
            client: Arc::clone(&shared.client),
            server: Arc::clone(&server),
            cache: Arc::clone(&shared.cache),
            stats: Arc::clone(&stats),
            max_retries: shared.max_retries,
            deadline: shared.deadline,
        });

        for head in heads.iter().copied() {
            let ctx = Arc::clone(&ctx);
            let results = Arc::clone(&results);
            let ticket = CountdownTicket(Arc::clone(&countdown));
            let cancel = shared.cancel.clone();

            shared.handle.spawn(async move {
                let _ticket = ticket;
                let image = tokio::select! {
                    _ = cancel.cancelled() => None,
                    image = fetch_tile(&ctx, head) => image,
                };
                if let Some(image) = image {
                    results.lock().push(image);
                }
            });
        }

        // Every ticket releases on drop, so this resolves even when tasks
        // are torn down; a closed channel means the same thing.
        let _ = done.await;
    }

    let images = std::mem::take(&mut *results.lock());
    let stats = stats.snapshot();
    info!(
        sequence = sequence,
        requested = heads.len(),
        delivered = images.len(),
        cache_hits = stats.cache_hits,
        network = stats.network_fetches,
        failed = stats.failures,
        "Batch complete"
    );

    TileBatch {
        sequence,
        kind: request.kind,
        requested: heads,
        images,
        stats,
    }
}

/// Remaining-tile counter that fires a one-shot release at zero.
struct Countdown {
    remaining: AtomicUsize,
    release: Mutex<Option<oneshot::Sender<()>>>,
}

/// Held by one fetch task; counts the tile as finished when dropped,
/// whether the task completed, failed or was cancelled.
struct CountdownTicket(Arc<Countdown>);

impl Drop for CountdownTicket {
    fn drop(&mut self) {
        if self.0.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            if let Some(release) = self.0.release.lock().take() {
                let _ = release.send(());
            }
        }
    }
}
