//! The generator thread.
//!
//! All regeneration state lives on one dedicated thread. Triggers from the
//! UI side and tile batches from the fetch pool both arrive as
//! [`GeneratorEvent`]s on a single channel, so layout and geometry are never
//! touched from two threads.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::composite::composite_texture;
use super::geometry::synthesize_geometry;
use super::layout::TileTexture;
use super::plan_layout;
use super::types::{MapSink, MapTexture, ViewProvider};
use crate::config::GeneratorConfig;
use crate::coord::GeoPoint;
use crate::manager::{Coalescer, TileBatch, TileImage, TileRequester, TileSink};
use crate::projection::Projector;
use crate::provider::TileServerKind;
use crate::stats::FetchStatsSnapshot;
use crate::view::ViewData;

/// Messages handled by the generator thread.
#[derive(Debug)]
pub enum GeneratorEvent {
    ViewUpdated,
    GlobeRotated,
    TileServerChanged(TileServerKind),
    TilesReceived(TileBatch),
    Shutdown,
}

/// Event channel created ahead of the generator so the tile manager can be
/// handed its sink first.
pub struct GeneratorChannel {
    tx: Sender<GeneratorEvent>,
    rx: Receiver<GeneratorEvent>,
}

impl Default for GeneratorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Tile sink that forwards finished batches to the generator thread.
    pub fn tile_sink(&self) -> Arc<dyn TileSink> {
        let tx = self.tx.clone();
        Arc::new(move |batch: TileBatch| {
            if tx.send(GeneratorEvent::TilesReceived(batch)).is_err() {
                debug!("Generator gone, batch dropped");
            }
        })
    }
}

/// Handle to the generator thread.
///
/// Dropping it stops and joins the thread.
pub struct MapGenerator {
    events: Sender<GeneratorEvent>,
    worker: Option<JoinHandle<()>>,
}

impl MapGenerator {
    /// Starts the generator thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(
        channel: GeneratorChannel,
        projector: Arc<Projector>,
        view: Arc<dyn ViewProvider>,
        requester: Arc<dyn TileRequester>,
        sink: Arc<dyn MapSink>,
        config: GeneratorConfig,
        kind: TileServerKind,
    ) -> io::Result<Self> {
        let GeneratorChannel { tx, rx } = channel;
        let mut worker = Worker {
            projector,
            view,
            requester,
            sink,
            config,
            kind,
            state: Coalescer::new(),
            current: None,
        };

        let handle = thread::Builder::new()
            .name("globemap-generator".to_string())
            .spawn(move || worker.run(rx))?;

        info!(server = %kind, "Map generator started");

        Ok(Self {
            events: tx,
            worker: Some(handle),
        })
    }

    /// The viewport changed; regenerate with a fresh snapshot.
    pub fn view_updated(&self) {
        self.send(GeneratorEvent::ViewUpdated);
    }

    /// The projection center moved; regenerate.
    pub fn globe_rotated(&self) {
        self.send(GeneratorEvent::GlobeRotated);
    }

    /// Switches the tile server and regenerates.
    pub fn set_tile_server(&self, kind: TileServerKind) {
        self.send(GeneratorEvent::TileServerChanged(kind));
    }

    /// Stops the thread after the event it is handling, then joins it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, event: GeneratorEvent) {
        if self.events.send(event).is_err() {
            warn!("Map generator thread is not running");
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = self.events.send(GeneratorEvent::Shutdown);
            if let Err(e) = handle.join() {
                warn!("Map generator thread panicked: {:?}", e);
            }
            info!("Map generator stopped");
        }
    }
}

impl Drop for MapGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Inputs captured when a regeneration is requested.
#[derive(Debug, Clone, Copy)]
struct RegenInput {
    view: ViewData,
    kind: TileServerKind,
}

/// A regeneration waiting for its images, its geometry, or both.
struct InFlight {
    input: RegenInput,
    center: GeoPoint,
    layout: TileTexture,
    vertices: Option<Vec<f32>>,
    images: Option<Vec<TileImage>>,
    stats: FetchStatsSnapshot,
}

impl InFlight {
    fn is_complete(&self) -> bool {
        self.vertices.is_some() && self.images.is_some()
    }
}

struct Worker {
    projector: Arc<Projector>,
    view: Arc<dyn ViewProvider>,
    requester: Arc<dyn TileRequester>,
    sink: Arc<dyn MapSink>,
    config: GeneratorConfig,
    kind: TileServerKind,
    state: Coalescer<RegenInput>,
    current: Option<InFlight>,
}

impl Worker {
    fn run(&mut self, rx: Receiver<GeneratorEvent>) {
        while let Ok(event) = rx.recv() {
            match event {
                GeneratorEvent::ViewUpdated | GeneratorEvent::GlobeRotated => {
                    self.request_regeneration()
                }
                GeneratorEvent::TileServerChanged(kind) => {
                    if kind != self.kind {
                        info!(server = %kind, "Tile server changed");
                        self.kind = kind;
                    }
                    self.request_regeneration();
                }
                GeneratorEvent::TilesReceived(batch) => self.on_tiles(batch),
                GeneratorEvent::Shutdown => break,
            }
        }
        debug!("Map generator loop exited");
    }

    fn request_regeneration(&mut self) {
        let input = RegenInput {
            view: self.view.view_data(),
            kind: self.kind,
        };
        match self.state.submit(input) {
            Some(input) => self.start(input),
            None => debug!("Regeneration in flight, input left pending"),
        }
    }

    /// Runs regenerations until one has to wait for tiles.
    fn start(&mut self, input: RegenInput) {
        let mut next = Some(input);
        while let Some(input) = next.take() {
            next = self.begin(input);
        }
    }

    /// Starts one regeneration. Returns the next input when this one
    /// completed without waiting.
    fn begin(&mut self, input: RegenInput) -> Option<RegenInput> {
        self.sink.map_ready(false);

        let projector = self.projector.snapshot();
        let center = projector.projection_center();

        let Some(layout) = plan_layout(&projector, &input.view, &self.config) else {
            info!(zoom = input.view.zoom, "Nothing visible");
            self.sink.map_updated(MapTexture::empty(input.view.zoom, center));
            self.sink.map_ready(true);
            return self.state.finish();
        };

        let (cols, rows) = layout.texture_size();
        debug!(
            zoom = input.view.zoom,
            tiles = layout.tile_count(),
            cols,
            rows,
            "Tile set discovered"
        );

        self.requester
            .request_tiles(layout.heads().to_vec(), input.kind);

        let vertices = synthesize_geometry(
            &projector,
            &layout,
            input.view.unit_in_meter,
            self.config.subdivisions(),
        );

        self.current = Some(InFlight {
            input,
            center,
            layout,
            vertices: Some(vertices),
            images: None,
            stats: FetchStatsSnapshot::default(),
        });
        self.try_finalize()
    }

    fn on_tiles(&mut self, batch: TileBatch) {
        let Some(flight) = self.current.as_mut() else {
            debug!(sequence = batch.sequence, "Stale batch ignored");
            return;
        };
        if batch.kind != flight.input.kind || batch.requested != flight.layout.heads() {
            debug!(sequence = batch.sequence, "Stale batch ignored");
            return;
        }

        debug!(
            sequence = batch.sequence,
            images = batch.images.len(),
            stats = %batch.stats,
            "Tiles received"
        );
        flight.images = Some(batch.images);
        flight.stats = batch.stats;

        if let Some(next) = self.try_finalize() {
            self.start(next);
        }
    }

    /// Publishes the current regeneration once both halves are in.
    fn try_finalize(&mut self) -> Option<RegenInput> {
        if !self.current.as_ref().is_some_and(InFlight::is_complete) {
            return None;
        }
        let flight = self.current.take()?;
        let InFlight {
            input,
            center,
            mut layout,
            vertices,
            images,
            stats,
        } = flight;

        let canvas = composite_texture(&mut layout, images.as_deref().unwrap_or_default());
        let (width, height) = canvas.dimensions();
        let map = MapTexture {
            layout,
            vertices: vertices.unwrap_or_default(),
            width,
            height,
            pixels: canvas.into_raw(),
            zoom: input.view.zoom,
            center,
            stats,
        };

        info!(
            tiles = map.layout.tile_count(),
            filled = map.layout.tile_filled(),
            vertices = map.vertex_count(),
            width,
            height,
            "Map published"
        );
        self.sink.map_updated(map);
        self.sink.map_ready(true);

        self.state.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileHead;
    use crate::stats::FetchStats;
    use parking_lot::Mutex;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(10);

    #[derive(Debug)]
    enum SinkEvent {
        Ready(bool),
        Updated(MapTexture),
    }

    struct RecordingSink(Mutex<Sender<SinkEvent>>);

    impl MapSink for RecordingSink {
        fn map_ready(&self, ready: bool) {
            let _ = self.0.lock().send(SinkEvent::Ready(ready));
        }

        fn map_updated(&self, map: MapTexture) {
            let _ = self.0.lock().send(SinkEvent::Updated(map));
        }
    }

    #[derive(Default)]
    struct RecordingRequester {
        requests: Mutex<Vec<(Vec<TileHead>, TileServerKind)>>,
    }

    impl RecordingRequester {
        fn wait_for(&self, count: usize) -> (Vec<TileHead>, TileServerKind) {
            let start = Instant::now();
            loop {
                if let Some(request) = self.requests.lock().get(count - 1) {
                    return request.clone();
                }
                assert!(start.elapsed() < WAIT, "no tile request #{}", count);
                thread::sleep(Duration::from_millis(5));
            }
        }

        fn count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    impl TileRequester for RecordingRequester {
        fn request_tiles(&self, heads: Vec<TileHead>, kind: TileServerKind) {
            self.requests.lock().push((heads, kind));
        }
    }

    struct Fixture {
        generator: MapGenerator,
        tiles: Arc<dyn TileSink>,
        requester: Arc<RecordingRequester>,
        events: Receiver<SinkEvent>,
    }

    fn fixture(view: ViewData) -> Fixture {
        let channel = GeneratorChannel::new();
        let tiles = channel.tile_sink();
        let requester = Arc::new(RecordingRequester::default());
        let (tx, events) = mpsc::channel();

        let generator = MapGenerator::spawn(
            channel,
            Arc::new(Projector::new()),
            Arc::new(move || view),
            requester.clone(),
            Arc::new(RecordingSink(Mutex::new(tx))),
            GeneratorConfig::default(),
            TileServerKind::Osm,
        )
        .unwrap();

        Fixture {
            generator,
            tiles,
            requester,
            events,
        }
    }

    fn deliver(tiles: &Arc<dyn TileSink>, heads: Vec<TileHead>, kind: TileServerKind) {
        tiles.send_tiles(TileBatch {
            sequence: 0,
            kind,
            requested: heads,
            images: Vec::new(),
            stats: FetchStats::new().snapshot(),
        });
    }

    fn next_map(events: &Receiver<SinkEvent>) -> MapTexture {
        loop {
            match events.recv_timeout(WAIT).unwrap() {
                SinkEvent::Updated(map) => return map,
                SinkEvent::Ready(_) => {}
            }
        }
    }

    fn small_view() -> ViewData {
        ViewData::from_viewport(256, 256, 1000.0, 0.001)
    }

    #[test]
    fn test_regeneration_publishes_after_tiles_arrive() {
        let f = fixture(small_view());
        f.generator.view_updated();

        let (heads, kind) = f.requester.wait_for(1);
        assert!(!heads.is_empty());
        assert_eq!(kind, TileServerKind::Osm);

        assert!(matches!(
            f.events.recv_timeout(WAIT).unwrap(),
            SinkEvent::Ready(false)
        ));
        assert!(f.events.recv_timeout(Duration::from_millis(100)).is_err());

        deliver(&f.tiles, heads.clone(), kind);
        let map = next_map(&f.events);
        assert_eq!(map.layout.heads(), heads.as_slice());
        assert!(map.vertex_count() > 0);
        let (cols, rows) = map.layout.texture_size();
        assert_eq!(map.width, cols * 256);
        assert_eq!(map.height, rows * 256);
        assert_eq!(map.pixels.len(), (map.width * map.height * 4) as usize);
        assert!(matches!(
            f.events.recv_timeout(WAIT).unwrap(),
            SinkEvent::Ready(true)
        ));
    }

    #[test]
    fn test_requests_while_busy_collapse_into_one() {
        let f = fixture(small_view());
        f.generator.view_updated();
        let (heads, kind) = f.requester.wait_for(1);

        for _ in 0..5 {
            f.generator.globe_rotated();
            f.generator.view_updated();
        }
        deliver(&f.tiles, heads, kind);
        next_map(&f.events);

        let (heads, kind) = f.requester.wait_for(2);
        deliver(&f.tiles, heads, kind);
        next_map(&f.events);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(f.requester.count(), 2);
    }

    #[test]
    fn test_nothing_visible_publishes_empty_map() {
        let f = fixture(small_view().panned(50_000.0, 0.0));
        f.generator.view_updated();

        let map = next_map(&f.events);
        assert!(map.is_empty());
        assert_eq!(map.vertex_count(), 0);
        assert_eq!(f.requester.count(), 0);
    }

    #[test]
    fn test_stale_batch_is_ignored() {
        let f = fixture(small_view());
        f.generator.view_updated();
        let (heads, _) = f.requester.wait_for(1);

        deliver(&f.tiles, vec![TileHead::new(0, 0, 0)], TileServerKind::Osm);
        deliver(&f.tiles, heads.clone(), TileServerKind::TwoGis);
        let early = f.events.recv_timeout(Duration::from_millis(200));
        assert!(matches!(early, Ok(SinkEvent::Ready(false))));
        assert!(f.events.recv_timeout(Duration::from_millis(200)).is_err());

        deliver(&f.tiles, heads, TileServerKind::Osm);
        next_map(&f.events);
    }

    #[test]
    fn test_tile_server_switch_reaches_requests() {
        let f = fixture(small_view());
        f.generator.set_tile_server(TileServerKind::TwoGis);
        let (_, kind) = f.requester.wait_for(1);
        assert_eq!(kind, TileServerKind::TwoGis);
    }

    #[test]
    fn test_shutdown_while_waiting_for_tiles() {
        let f = fixture(small_view());
        f.generator.view_updated();
        f.requester.wait_for(1);
        f.generator.shutdown();
        // Late batches go nowhere
        deliver(&f.tiles, Vec::new(), TileServerKind::Osm);
    }
}
