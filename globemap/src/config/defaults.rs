//! Default values and constants for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::provider::{TileServerKind, DEFAULT_USER_AGENT};

/// Fetch pool size.
pub const DEFAULT_WORKERS: usize = 4;

/// Connection watchdog in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Whole-request deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retries on another mirror after an unreachable host.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Mesh subdivisions per tile edge.
pub const DEFAULT_SUBDIVISIONS: u32 = 10;

/// Edge probe stride in pixels.
pub const DEFAULT_EDGE_STRIDE_PX: u32 = 10;

/// Tiles discovered per regeneration before the flood fill stops.
pub const DEFAULT_MAX_TILES: usize = 1024;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "globemap.log";

/// Default tile cache directory (platform cache dir + `globemap`).
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("globemap")
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            server: ServerSettings {
                kind: TileServerKind::default(),
            },
            cache: CacheSettings {
                directory: default_cache_dir(),
            },
            network: NetworkSettings {
                workers: DEFAULT_WORKERS,
                connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
                request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
                max_retries: DEFAULT_MAX_RETRIES,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            generator: GeneratorSettings {
                subdivisions: DEFAULT_SUBDIVISIONS,
                edge_stride_px: DEFAULT_EDGE_STRIDE_PX,
                max_tiles: DEFAULT_MAX_TILES,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
