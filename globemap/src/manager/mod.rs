//! Tile manager
//!
//! Turns a batch of tile heads into a batch of encoded tile images, using the
//! disk cache first and the network second.
//!
//! # Architecture
//!
//! ```text
//! request_tiles(heads, kind)
//!        │
//!        ▼
//!   Coalescer ── busy ──► pending slot (latest request only)
//!        │ idle
//!        ▼
//!   coordinator task ─┬─► session(tile 1) ─┐
//!        ▲            ├─► session(tile 2) ─┼─► results + countdown
//!        │            └─► session(tile N) ─┘        │
//!        │                                          │ reaches zero
//!        └──────────── oneshot release ◄────────────┘
//!        │
//!        ▼
//!   TileSink::send_tiles(batch), then the pending request if any
//! ```
//!
//! Sessions run as tasks on a fixed multi-thread runtime. Each task owns its
//! state and a countdown ticket that is released when the task ends for any
//! reason, so a batch always completes exactly once.

mod coalesce;
mod session;
mod tile_manager;
mod types;

pub use coalesce::Coalescer;
pub use tile_manager::TileManager;
pub use types::{TileBatch, TileImage, TileRequest, TileRequester, TileSink};
