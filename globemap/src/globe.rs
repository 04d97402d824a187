//! Composition root.
//!
//! [`GlobeBuilder`] wires the projector, the viewport, the tile manager and
//! the map generator together once; [`Globe`] is the handle the UI side
//! drives afterwards.
//!
//! ```text
//!   Globe ──view/rotate/server──► MapGenerator ──request_tiles──► TileManager
//!                                     ▲                               │
//!                                     └──── GeneratorChannel ◄────────┘
//!                                                 (TileBatch)
//!   MapGenerator ──map_ready / map_updated──► MapSink
//! ```

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

use crate::cache::DiskTileCache;
use crate::config::{ConfigFile, GeneratorConfig, NetworkConfig};
use crate::coord::{normalize_lon, GeoPoint};
use crate::generator::{GeneratorChannel, MapGenerator, MapSink, ViewProvider};
use crate::graticule::compose_wire_globe;
use crate::manager::{TileManager, TileRequester};
use crate::projection::Projector;
use crate::provider::{AsyncHttpClient, FetchError, ReqwestClient, TileServerKind};
use crate::view::ViewData;

/// Degrees the center moves per dragged pixel.
pub const DEGREES_PER_PIXEL: f64 = 0.05;

/// Failures that keep the globe from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no projector configured")]
    MissingProjector,

    #[error("no view data provider configured")]
    MissingViewProvider,

    #[error("no map sink configured")]
    MissingMapSink,

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] FetchError),

    #[error("failed to start worker threads: {0}")]
    Io(#[from] io::Error),
}

/// Viewport snapshot owned by the globe and updated through
/// [`Globe::update_view`].
#[derive(Debug, Default)]
pub struct SharedView(Mutex<ViewData>);

impl SharedView {
    pub fn new(view: ViewData) -> Self {
        Self(Mutex::new(view))
    }

    pub fn set(&self, view: ViewData) {
        *self.0.lock() = view;
    }

    pub fn get(&self) -> ViewData {
        *self.0.lock()
    }
}

impl ViewProvider for SharedView {
    fn view_data(&self) -> ViewData {
        self.get()
    }
}

/// Builder for [`Globe`].
pub struct GlobeBuilder<C: AsyncHttpClient + 'static> {
    client: C,
    cache: DiskTileCache,
    network: NetworkConfig,
    generator: GeneratorConfig,
    kind: TileServerKind,
    projector: Option<Arc<Projector>>,
    view: Option<ViewSource>,
    sink: Option<Arc<dyn MapSink>>,
}

enum ViewSource {
    Shared(Arc<SharedView>),
    External(Arc<dyn ViewProvider>),
}

impl GlobeBuilder<ReqwestClient> {
    /// Builder preconfigured from the user's config file.
    ///
    /// Projector and view still have to be supplied.
    pub fn from_config(config: &ConfigFile) -> Result<Self, SetupError> {
        let network = config.network_config();
        let client = ReqwestClient::from_config(&network)?;
        Ok(Self::new(client, DiskTileCache::new(&config.cache.directory))
            .with_network(network)
            .with_generator(config.generator_config())
            .with_tile_server(config.server.kind))
    }
}

impl<C: AsyncHttpClient + 'static> GlobeBuilder<C> {
    pub fn new(client: C, cache: DiskTileCache) -> Self {
        Self {
            client,
            cache,
            network: NetworkConfig::default(),
            generator: GeneratorConfig::default(),
            kind: TileServerKind::default(),
            projector: None,
            view: None,
            sink: None,
        }
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_tile_server(mut self, kind: TileServerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_projector(mut self, projector: Arc<Projector>) -> Self {
        self.projector = Some(projector);
        self
    }

    /// Uses a viewport owned by the globe, starting at `view`.
    pub fn with_view(mut self, view: ViewData) -> Self {
        self.view = Some(ViewSource::Shared(Arc::new(SharedView::new(view))));
        self
    }

    /// Pulls viewport snapshots from an outside provider instead.
    pub fn with_view_provider(mut self, provider: Arc<dyn ViewProvider>) -> Self {
        self.view = Some(ViewSource::External(provider));
        self
    }

    pub fn with_map_sink(mut self, sink: Arc<dyn MapSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Starts the fetch pool and the generator thread.
    ///
    /// # Errors
    ///
    /// Fails if a required collaborator is missing or a thread cannot be
    /// started. Nothing keeps running after an error.
    pub fn build(self) -> Result<Globe<C>, SetupError> {
        let projector = self.projector.ok_or(SetupError::MissingProjector)?;
        let view = self.view.ok_or(SetupError::MissingViewProvider)?;
        let sink = self.sink.ok_or(SetupError::MissingMapSink)?;

        let (shared_view, provider) = match view {
            ViewSource::Shared(shared) => {
                let provider: Arc<dyn ViewProvider> = shared.clone();
                (Some(shared), provider)
            }
            ViewSource::External(provider) => (None, provider),
        };

        let channel = GeneratorChannel::new();
        let manager = Arc::new(TileManager::new(
            self.client,
            self.cache,
            &self.network,
            channel.tile_sink(),
        )?);

        let requester: Arc<dyn TileRequester> = manager.clone();
        let generator = MapGenerator::spawn(
            channel,
            Arc::clone(&projector),
            Arc::clone(&provider),
            requester,
            sink,
            self.generator,
            self.kind,
        )?;

        info!(server = %self.kind, "Globe ready");

        Ok(Globe {
            projector,
            view: shared_view,
            view_provider: provider,
            kind: Mutex::new(self.kind),
            generator: Some(generator),
            manager: Some(manager),
        })
    }
}

/// Running globe.
///
/// Dropping it stops the generator first, then the fetch pool.
pub struct Globe<C: AsyncHttpClient + 'static> {
    projector: Arc<Projector>,
    view: Option<Arc<SharedView>>,
    view_provider: Arc<dyn ViewProvider>,
    kind: Mutex<TileServerKind>,
    generator: Option<MapGenerator>,
    manager: Option<Arc<TileManager<C>>>,
}

impl<C: AsyncHttpClient + 'static> Globe<C> {
    pub fn projector(&self) -> &Arc<Projector> {
        &self.projector
    }

    pub fn tile_server(&self) -> TileServerKind {
        *self.kind.lock()
    }

    /// Stores a new viewport snapshot (when the globe owns the viewport)
    /// and regenerates.
    pub fn update_view(&self, view: ViewData) {
        if let Some(shared) = &self.view {
            shared.set(view);
        }
        self.view_updated();
    }

    /// The external viewport changed; regenerate.
    pub fn view_updated(&self) {
        if let Some(generator) = &self.generator {
            generator.view_updated();
        }
    }

    /// Centers the projection on a point and regenerates.
    pub fn set_projection_at(&self, lon: f64, lat: f64) {
        self.projector.set_projection_at(lon, lat);
        self.globe_rotated();
    }

    /// Moves the center by [`DEGREES_PER_PIXEL`] per dragged pixel:
    /// `dx` westwards, `dy` northwards.
    pub fn rotate_by_pixels(&self, dx: f64, dy: f64) {
        let center = self.projector.projection_center();
        let target = rotated_center(center, dx, dy);
        self.set_projection_at(target.lon, target.lat);
    }

    /// Resets the projection center to (0, 0).
    pub fn balance(&self) {
        self.set_projection_at(0.0, 0.0);
    }

    /// Graticule segments for the current center, in the current view's GL
    /// units. Rebuild after every rotation.
    pub fn wire_globe(&self) -> Vec<f32> {
        let unit_in_meter = self.view_provider.view_data().unit_in_meter;
        compose_wire_globe(&self.projector, unit_in_meter)
    }

    pub fn set_tile_server(&self, kind: TileServerKind) {
        *self.kind.lock() = kind;
        if let Some(generator) = &self.generator {
            generator.set_tile_server(kind);
        }
    }

    /// Stops the generator, then cancels outstanding fetches and joins the
    /// fetch pool.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn globe_rotated(&self) {
        if let Some(generator) = &self.generator {
            generator.globe_rotated();
        }
    }

    fn stop(&mut self) {
        if let Some(generator) = self.generator.take() {
            generator.shutdown();
        }
        // The generator held the only other reference
        if let Some(manager) = self.manager.take() {
            match Arc::try_unwrap(manager) {
                Ok(manager) => manager.shutdown(),
                Err(manager) => drop(manager),
            }
        }
    }
}

impl<C: AsyncHttpClient + 'static> Drop for Globe<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Projection center after dragging by `(dx, dy)` pixels.
pub fn rotated_center(center: GeoPoint, dx: f64, dy: f64) -> GeoPoint {
    GeoPoint::new(
        normalize_lon(center.lon - dx * DEGREES_PER_PIXEL),
        (center.lat + dy * DEGREES_PER_PIXEL).clamp(-90.0, 90.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MapTexture;
    use crate::provider::MockAsyncHttpClient;
    use tempfile::TempDir;

    struct NullSink;

    impl MapSink for NullSink {
        fn map_ready(&self, _ready: bool) {}
        fn map_updated(&self, _map: MapTexture) {}
    }

    fn builder(temp_dir: &TempDir) -> GlobeBuilder<MockAsyncHttpClient> {
        GlobeBuilder::new(
            MockAsyncHttpClient {
                response: Err(FetchError::Timeout("offline".into())),
            },
            DiskTileCache::new(temp_dir.path()),
        )
    }

    #[test]
    fn test_rotated_center() {
        let center = rotated_center(GeoPoint::new(0.0, 0.0), 20.0, 20.0);
        assert!((center.lon + 1.0).abs() < 1e-9);
        assert!((center.lat - 1.0).abs() < 1e-9);

        let clamped = rotated_center(GeoPoint::new(179.0, 89.0), -40.0, 100.0);
        assert!((clamped.lon + 179.0).abs() < 1e-9);
        assert_eq!(clamped.lat, 90.0);
    }

    #[test]
    fn test_missing_projector_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = builder(&temp_dir)
            .with_view(ViewData::default())
            .with_map_sink(Arc::new(NullSink))
            .build();
        assert!(matches!(result, Err(SetupError::MissingProjector)));
    }

    #[test]
    fn test_missing_view_provider_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = builder(&temp_dir)
            .with_projector(Arc::new(Projector::new()))
            .with_map_sink(Arc::new(NullSink))
            .build();
        assert!(matches!(result, Err(SetupError::MissingViewProvider)));
    }

    #[test]
    fn test_controls_move_projector() {
        let temp_dir = TempDir::new().unwrap();
        let globe = builder(&temp_dir)
            .with_projector(Arc::new(Projector::new()))
            .with_view(ViewData::default().panned(1.0e6, 0.0))
            .with_map_sink(Arc::new(NullSink))
            .build()
            .unwrap();

        globe.set_projection_at(10.0, 20.0);
        globe.rotate_by_pixels(-20.0, 0.0);
        let center = globe.projector().projection_center();
        assert!((center.lon - 11.0).abs() < 1e-9);
        assert!((center.lat - 20.0).abs() < 1e-9);

        globe.balance();
        assert_eq!(globe.projector().projection_center(), GeoPoint::new(0.0, 0.0));

        globe.set_tile_server(TileServerKind::TwoGis);
        assert_eq!(globe.tile_server(), TileServerKind::TwoGis);
        globe.shutdown();
    }

    #[test]
    fn test_wire_globe_follows_rotation_and_view_units() {
        let temp_dir = TempDir::new().unwrap();
        let globe = builder(&temp_dir)
            .with_projector(Arc::new(Projector::new()))
            .with_view(ViewData::default().panned(1.0e6, 0.0))
            .with_map_sink(Arc::new(NullSink))
            .build()
            .unwrap();

        let at_origin = globe.wire_globe();
        assert!(!at_origin.is_empty());
        assert_eq!(at_origin, compose_wire_globe(globe.projector(), 0.001));

        globe.set_projection_at(45.0, 30.0);
        let rotated = globe.wire_globe();
        assert_ne!(rotated, at_origin);
        assert_eq!(rotated, compose_wire_globe(globe.projector(), 0.001));

        let mut view = ViewData::default().panned(1.0e6, 0.0);
        view.unit_in_meter = 0.002;
        globe.update_view(view);
        assert_eq!(globe.wire_globe(), compose_wire_globe(globe.projector(), 0.002));
        globe.shutdown();
    }
}
