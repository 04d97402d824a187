//! End-to-end regeneration through the public API: projector and view in,
//! composited texture out, with a scripted HTTP client standing in for the
//! tile server.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use globemap::cache::DiskTileCache;
use globemap::generator::{MapSink, MapTexture};
use globemap::globe::{Globe, GlobeBuilder};
use globemap::projection::Projector;
use globemap::provider::{AsyncHttpClient, FetchError, TileServerKind};
use globemap::view::ViewData;
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(30);
const RED: Rgba<u8> = Rgba([200, 20, 20, 255]);

fn red_tile() -> Vec<u8> {
    let tile = RgbaImage::from_pixel(256, 256, RED);
    let mut bytes = Vec::new();
    tile.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Serves one fixed response after an optional delay, recording every URL.
#[derive(Clone)]
struct TileServerStub {
    response: Result<Vec<u8>, FetchError>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl TileServerStub {
    fn new(response: Result<Vec<u8>, FetchError>) -> Self {
        Self {
            response,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for TileServerStub {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

struct ChannelSink {
    maps: Mutex<Sender<MapTexture>>,
    started: AtomicUsize,
}

impl MapSink for ChannelSink {
    fn map_ready(&self, ready: bool) {
        if !ready {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn map_updated(&self, map: MapTexture) {
        let _ = self.maps.lock().send(map);
    }
}

struct Harness {
    globe: Globe<TileServerStub>,
    maps: Receiver<MapTexture>,
    sink: Arc<ChannelSink>,
    client: TileServerStub,
    cache_dir: TempDir,
}

fn small_view() -> ViewData {
    ViewData::from_viewport(256, 256, 1000.0, 0.001)
}

fn harness(client: TileServerStub, view: ViewData) -> Harness {
    let cache_dir = TempDir::new().unwrap();
    let (tx, maps) = mpsc::channel();
    let sink = Arc::new(ChannelSink {
        maps: Mutex::new(tx),
        started: AtomicUsize::new(0),
    });

    let globe = GlobeBuilder::new(client.clone(), DiskTileCache::new(cache_dir.path()))
        .with_projector(Arc::new(Projector::new()))
        .with_view(view)
        .with_map_sink(sink.clone())
        .build()
        .unwrap();

    Harness {
        globe,
        maps,
        sink,
        client,
        cache_dir,
    }
}

#[test]
fn test_fetched_tiles_fill_the_texture_and_the_cache() {
    let h = harness(TileServerStub::new(Ok(red_tile())), small_view());
    h.globe.view_updated();

    let map = h.maps.recv_timeout(WAIT).unwrap();
    let count = map.layout.tile_count();
    assert!(count > 0);
    assert_eq!(map.layout.tile_filled(), count);
    assert_eq!(h.client.calls(), count);
    assert_eq!(map.stats.network_fetches, count as u64);
    assert!(map.vertex_count() > 0);

    let image = RgbaImage::from_raw(map.width, map.height, map.pixels.clone()).unwrap();
    assert_eq!(image.get_pixel(10, 10), &RED);

    let cache = DiskTileCache::new(h.cache_dir.path());
    for head in map.layout.heads() {
        assert!(cache.contains("OpenStreetMap", head), "{} not cached", head);
    }
}

#[test]
fn test_second_regeneration_is_served_from_disk() {
    let h = harness(TileServerStub::new(Ok(red_tile())), small_view());
    h.globe.view_updated();
    let first = h.maps.recv_timeout(WAIT).unwrap();
    let calls = h.client.calls();

    h.globe.update_view(small_view());
    let second = h.maps.recv_timeout(WAIT).unwrap();

    assert_eq!(h.client.calls(), calls);
    assert_eq!(second.layout.heads(), first.layout.heads());
    assert_eq!(second.stats.cache_hits, second.layout.tile_count() as u64);
    assert_eq!(second.stats.network_fetches, 0);
    assert_eq!(second.pixels, first.pixels);
}

#[test]
fn test_failing_server_still_publishes_a_map() {
    let h = harness(
        TileServerStub::new(Err(FetchError::Status {
            status: 503,
            url: "stub".into(),
        })),
        small_view(),
    );
    h.globe.view_updated();

    let map = h.maps.recv_timeout(WAIT).unwrap();
    assert!(map.layout.tile_count() > 0);
    assert_eq!(map.layout.tile_filled(), 0);
    assert_eq!(map.stats.failures, map.layout.tile_count() as u64);
    assert!(map.pixels.iter().all(|&b| b == 0));
}

#[test]
fn test_unreachable_hosts_are_retried_on_other_mirrors() {
    let h = harness(
        TileServerStub::new(Err(FetchError::Unreachable("no route".into()))),
        small_view(),
    );
    h.globe.view_updated();

    let map = h.maps.recv_timeout(WAIT).unwrap();
    let count = map.layout.tile_count();
    assert_eq!(h.client.calls(), count * 3);
    assert_eq!(map.stats.retries, (count * 2) as u64);

    let urls = h.client.urls.lock().clone();
    for host in ["a.tile", "b.tile", "c.tile"] {
        assert!(urls.iter().any(|u| u.contains(host)), "{} never used", host);
    }
}

#[test]
fn test_switching_server_fetches_from_the_new_one() {
    let h = harness(TileServerStub::new(Ok(red_tile())), small_view());
    h.globe.view_updated();
    h.maps.recv_timeout(WAIT).unwrap();

    h.globe.set_tile_server(TileServerKind::TwoGis);
    let map = h.maps.recv_timeout(WAIT).unwrap();
    assert_eq!(map.layout.tile_filled(), map.layout.tile_count());

    let urls = h.client.urls.lock().clone();
    assert!(urls
        .iter()
        .any(|u| u.contains(".maps.2gis.com") && u.contains("/tiles?x=")));
    let cache = DiskTileCache::new(h.cache_dir.path());
    assert!(cache.contains("2GIS", &map.layout.heads()[0]));
}

#[test]
fn test_view_off_the_globe_publishes_an_empty_map() {
    let h = harness(
        TileServerStub::new(Ok(red_tile())),
        small_view().panned(20_000.0, 20_000.0),
    );
    h.globe.view_updated();

    let map = h.maps.recv_timeout(WAIT).unwrap();
    assert!(map.is_empty());
    assert_eq!((map.width, map.height), (0, 0));
    assert_eq!(h.client.calls(), 0);
}

#[test]
fn test_updates_during_a_regeneration_collapse_into_one() {
    let client = TileServerStub::new(Ok(red_tile())).with_delay(Duration::from_millis(300));
    let h = harness(client, small_view());

    h.globe.view_updated();
    for step in 0..10 {
        h.globe.rotate_by_pixels(step as f64, 0.0);
    }

    h.maps.recv_timeout(WAIT).unwrap();
    let last = h.maps.recv_timeout(WAIT).unwrap();
    assert!(h.maps.recv_timeout(Duration::from_millis(800)).is_err());
    assert_eq!(h.sink.started.load(Ordering::SeqCst), 2);

    // The follow-up regeneration used the final center
    let center = h.globe.projector().projection_center();
    assert_eq!(last.center, center);
}

#[test]
fn test_shutdown_with_fetches_in_flight() {
    let client = TileServerStub::new(Ok(red_tile())).with_delay(Duration::from_secs(5));
    let h = harness(client, small_view());
    h.globe.view_updated();
    std::thread::sleep(Duration::from_millis(100));
    h.globe.shutdown();
}
