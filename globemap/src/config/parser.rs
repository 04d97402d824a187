//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("kind") {
            config.server.kind = v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "server".to_string(),
                key: "kind".to_string(),
                value: v.to_string(),
                reason: "must be one of: osm, 2gis".to_string(),
            })?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
    }

    // [network] section
    if let Some(section) = ini.section(Some("network")) {
        if let Some(v) = section.get("workers") {
            config.network.workers = parse_positive("network", "workers", v)?;
        }
        if let Some(v) = section.get("connect_timeout") {
            config.network.connect_timeout = parse_positive("network", "connect_timeout", v)?;
        }
        if let Some(v) = section.get("request_timeout") {
            config.network.request_timeout = parse_positive("network", "request_timeout", v)?;
        }
        if let Some(v) = section.get("max_retries") {
            config.network.max_retries =
                v.trim()
                    .parse()
                    .map_err(|_| ConfigFileError::InvalidValue {
                        section: "network".to_string(),
                        key: "max_retries".to_string(),
                        value: v.to_string(),
                        reason: "must be a non-negative integer".to_string(),
                    })?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.network.user_agent = v.to_string();
            }
        }
    }

    // [generator] section
    if let Some(section) = ini.section(Some("generator")) {
        if let Some(v) = section.get("subdivisions") {
            config.generator.subdivisions = parse_positive("generator", "subdivisions", v)?;
        }
        if let Some(v) = section.get("edge_stride_px") {
            config.generator.edge_stride_px = parse_positive("generator", "edge_stride_px", v)?;
        }
        if let Some(v) = section.get("max_tiles") {
            config.generator.max_tiles = parse_positive("generator", "max_tiles", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parses an integer that must be at least 1.
fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    match value.trim().parse::<T>() {
        Ok(n) if n >= T::from(1) => Ok(n),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
