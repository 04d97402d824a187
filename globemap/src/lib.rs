//! globemap - Map tiles on an orthographic globe
//!
//! This library works out which slippy-map tiles are visible on a projected
//! sphere, fetches them from a tile server (disk cache first), and composes
//! them into one texture plus the triangle mesh that drapes it over the
//! globe.
//!
//! # High-Level API
//!
//! The [`globe`] module wires everything together:
//!
//! ```ignore
//! use std::sync::Arc;
//! use globemap::config::ConfigFile;
//! use globemap::globe::GlobeBuilder;
//! use globemap::projection::Projector;
//! use globemap::view::ViewData;
//!
//! let config = ConfigFile::load()?;
//! let globe = GlobeBuilder::from_config(&config)?
//!     .with_projector(Arc::new(Projector::new()))
//!     .with_view(ViewData::default())
//!     .with_map_sink(sink)
//!     .build()?;
//!
//! globe.set_projection_at(37.6, 55.7);
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod generator;
pub mod globe;
pub mod graticule;
pub mod logging;
pub mod manager;
pub mod projection;
pub mod provider;
pub mod stats;
pub mod view;

/// Version of the globemap library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
