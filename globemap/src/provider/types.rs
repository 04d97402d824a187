//! Tile server types and traits

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::coord::TileHead;

/// Description of one remote tile provider.
///
/// Variants differ in host names, port and URL scheme. The set of variants
/// is closed; see [`super::TileServerKind`].
pub trait TileServer: Send + Sync {
    /// Stable name, also used as the cache directory for this server.
    fn server_name(&self) -> &str;

    /// TCP port the mirrors listen on.
    fn server_port(&self) -> u16;

    /// Returns the next mirror host in round-robin order.
    ///
    /// Safe to call concurrently from many fetch tasks.
    fn next_mirror(&self) -> &str;

    /// Every mirror host, in rotation order.
    fn mirrors(&self) -> &[String];

    /// Request target (path and query) for a tile.
    ///
    /// A pure function of the head and the server type.
    fn tile_target(&self, head: &TileHead) -> String;

    /// Full request URL for a tile on a specific mirror.
    fn tile_url(&self, mirror: &str, head: &TileHead) -> String {
        format!(
            "http://{}:{}{}",
            mirror,
            self.server_port(),
            self.tile_target(head)
        )
    }
}

/// Fixed list of interchangeable hosts cycled in round-robin order.
#[derive(Debug)]
pub struct MirrorRing {
    hosts: Vec<String>,
    /// Counter for round-robin host selection
    counter: AtomicUsize,
}

impl MirrorRing {
    /// Builds a ring from `{subdomain}{domain}` pairs.
    pub fn new(subdomains: &[&str], domain: &str) -> Self {
        Self {
            hosts: subdomains
                .iter()
                .map(|sub| format!("{}{}", sub, domain))
                .collect(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Next host; wraps around after the last one.
    pub fn next(&self) -> &str {
        let current = self.counter.fetch_add(1, Ordering::Relaxed);
        &self.hosts[current % self.hosts.len()]
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }
}
