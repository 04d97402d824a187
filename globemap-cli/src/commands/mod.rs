//! CLI command implementations.
//!
//! - [`config`] - Config file management (init, show, path)
//! - [`render`] - Headless map regeneration to a PNG
//! - [`visible`] - Visible tile set for a view

pub mod common;
pub mod config;
pub mod render;
pub mod visible;
