//! Folds tile images into one RGBA texture following a [`TileTexture`].

use image::imageops::{self, FilterType};
use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, warn};

use super::layout::TileTexture;
use crate::coord::{TileHead, TILE_SIDE};
use crate::manager::TileImage;

/// Errors decoding a single tile image.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes encoded tile bytes into a `TILE_SIDE`-square RGBA image.
///
/// Tiles of another size are resized so they fill exactly one grid cell.
pub fn decode_tile(bytes: &[u8]) -> Result<RgbaImage, CompositeError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let side = TILE_SIDE;
    if decoded.width() == side && decoded.height() == side {
        Ok(decoded)
    } else {
        Ok(imageops::resize(&decoded, side, side, FilterType::Triangle))
    }
}

/// Builds the composited texture.
///
/// The result is `cols * TILE_SIDE` by `rows * TILE_SIDE` pixels. Cells
/// without a usable image stay transparent. Every placed tile bumps the
/// layout's filled count.
pub fn composite_texture(layout: &mut TileTexture, images: &[TileImage]) -> RgbaImage {
    let (cols, rows) = layout.texture_size();
    let mut canvas = RgbaImage::new(cols * TILE_SIDE, rows * TILE_SIDE);
    let mut placed: Vec<TileHead> = Vec::with_capacity(images.len());

    for image in images {
        let Some(body) = layout.body(&image.head).copied() else {
            debug!(tile = %image.head, "Image not in layout, skipped");
            continue;
        };
        if placed.contains(&image.head) {
            continue;
        }

        match decode_tile(&image.bytes) {
            Ok(tile) => {
                let x = i64::from(body.col * TILE_SIDE);
                let y = i64::from(body.row * TILE_SIDE);
                imageops::replace(&mut canvas, &tile, x, y);
                placed.push(image.head);
                layout.mark_filled();
            }
            Err(e) => warn!(tile = %image.head, error = %e, "Tile left blank"),
        }
    }

    canvas
}
