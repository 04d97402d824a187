//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use crate::provider::TileServerKind;
use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Tile server selection
    pub server: ServerSettings,
    /// Disk cache settings
    pub cache: CacheSettings,
    /// Fetch pool and HTTP settings
    pub network: NetworkSettings,
    /// Map regeneration settings
    pub generator: GeneratorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Tile server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// Which tile server to fetch from
    pub kind: TileServerKind,
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Root directory; tiles live in `<directory>/<server>/<z>/<x>/<y>.png`
    pub directory: PathBuf,
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    /// Worker threads in the fetch pool
    pub workers: usize,
    /// Seconds allowed to establish a connection
    pub connect_timeout: u64,
    /// Seconds allowed for a whole request
    pub request_timeout: u64,
    /// Extra attempts on another mirror when a host is unreachable
    pub max_retries: u32,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Map generator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    /// Sub-quads per tile edge in the overlay mesh
    pub subdivisions: u32,
    /// Pixel stride when probing the view edges for a visible point
    pub edge_stride_px: u32,
    /// Upper bound on tiles discovered per regeneration
    pub max_tiles: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
