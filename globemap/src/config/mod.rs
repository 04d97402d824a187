//! Configuration for globemap components.
//!
//! Two layers:
//!
//! - [`ConfigFile`]: the user's `~/.globemap/config.ini`, one struct per
//!   INI section, loaded with defaults for anything missing.
//! - Runtime structs ([`NetworkConfig`], [`GeneratorConfig`]) with
//!   `with_*` builders, handed to the tile manager and map generator.
//!
//! # Example
//!
//! ```
//! use globemap::config::{ConfigFile, NetworkConfig};
//!
//! let file = ConfigFile::default();
//! let network: NetworkConfig = file.network_config();
//! assert_eq!(network.workers(), 4);
//! ```

mod defaults;
mod file;
mod generator;
mod network;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use generator::GeneratorConfig;
pub use network::NetworkConfig;
pub use settings::{
    CacheSettings, ConfigFile, GeneratorSettings, LoggingSettings, NetworkSettings,
    ServerSettings,
};
