//! Overlay mesh synthesis.
//!
//! Each tile quad is split into `K x K` sub-quads in tile (Mercator) space so
//! the texture maps linearly onto every sub-quad while the mesh follows the
//! curvature of the orthographic projection. Corners behind the horizon are
//! dropped; a sub-quad keeps two triangles with four visible corners, one
//! with three, none otherwise.
//!
//! Output layout: `x, y, u, v` per vertex, three vertices per triangle,
//! positions in GL units.

use crate::coord::{tile_x_to_lon, tile_y_to_lat};
use crate::projection::Projector;

use super::layout::TileTexture;

/// Floats per vertex.
pub const VERTEX_STRIDE: usize = 4;

type Vertex = [f32; VERTEX_STRIDE];

/// Builds the triangle list for every tile of the layout.
pub fn synthesize_geometry(
    projector: &Projector,
    texture: &TileTexture,
    unit_in_meter: f64,
    subdivisions: u32,
) -> Vec<f32> {
    let k = subdivisions.max(1) as usize;
    let side = k + 1;
    let mut vertices = Vec::new();
    let mut grid: Vec<Option<Vertex>> = Vec::with_capacity(side * side);

    for (head, body) in texture.iter() {
        grid.clear();

        // Row j runs north to south, column i west to east
        for j in 0..side {
            let fj = j as f64 / k as f64;
            let lat = tile_y_to_lat(head.y as f64 + fj, head.z);
            let v = body.ty1 + (body.ty0 - body.ty1) * fj as f32;

            for i in 0..side {
                let fi = i as f64 / k as f64;
                let lon = tile_x_to_lon(head.x as f64 + fi, head.z);
                let u = body.tx0 + (body.tx1 - body.tx0) * fi as f32;

                grid.push(projector.project_fwd(lon, lat).map(|(x, y)| {
                    [
                        (x * unit_in_meter) as f32,
                        (y * unit_in_meter) as f32,
                        u,
                        v,
                    ]
                }));
            }
        }

        for j in 0..k {
            for i in 0..k {
                let corners = [
                    grid[j * side + i],
                    grid[j * side + i + 1],
                    grid[(j + 1) * side + i + 1],
                    grid[(j + 1) * side + i],
                ];
                push_sub_quad(&mut vertices, &corners);
            }
        }
    }

    vertices
}

fn push_sub_quad(out: &mut Vec<f32>, corners: &[Option<Vertex>; 4]) {
    let visible: Vec<Vertex> = corners.iter().flatten().copied().collect();
    match visible.len() {
        4 => {
            for index in [0, 1, 2, 0, 2, 3] {
                out.extend_from_slice(&visible[index]);
            }
        }
        3 => {
            for vertex in &visible {
                out.extend_from_slice(vertex);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileHead;

    fn triangles(vertices: &[f32]) -> usize {
        vertices.len() / (VERTEX_STRIDE * 3)
    }

    #[test]
    fn test_fully_visible_tile_has_two_triangles_per_sub_quad() {
        let projector = Projector::new();
        let head = TileHead::new(6, 32, 31);
        let texture = TileTexture::layout(&[head]);

        let vertices = synthesize_geometry(&projector, &texture, 0.001, 10);
        assert_eq!(triangles(&vertices), 10 * 10 * 2);
    }

    #[test]
    fn test_hidden_tile_has_no_geometry() {
        let projector = Projector::new();
        // Tile on the far side of the globe
        let head = TileHead::new(3, 0, 3);
        let texture = TileTexture::layout(&[head]);

        let vertices = synthesize_geometry(&projector, &texture, 0.001, 10);
        assert!(vertices.is_empty());
    }

    #[test]
    fn test_horizon_tile_is_partially_covered() {
        let projector = Projector::new();
        // Spans longitudes 67.5..90 at the equator: east limb
        let head = TileHead::new(4, 11, 7);
        let texture = TileTexture::layout(&[head]);

        let full = synthesize_geometry(&projector, &texture, 0.001, 8);
        assert!(!full.is_empty());
        assert!(triangles(&full) <= 8 * 8 * 2);

        projector.set_projection_at(-20.0, 0.0);
        let clipped = synthesize_geometry(&projector, &texture, 0.001, 8);
        assert!(triangles(&clipped) < triangles(&full));
    }

    #[test]
    fn test_uv_spans_tile_cell() {
        let projector = Projector::new();
        let heads = [TileHead::new(5, 16, 15), TileHead::new(5, 15, 15)];
        let texture = TileTexture::layout(&heads);

        let vertices = synthesize_geometry(&projector, &texture, 1.0, 4);
        let (mut u_min, mut u_max) = (f32::MAX, f32::MIN);
        let (mut v_min, mut v_max) = (f32::MAX, f32::MIN);
        for vertex in vertices.chunks(VERTEX_STRIDE) {
            u_min = u_min.min(vertex[2]);
            u_max = u_max.max(vertex[2]);
            v_min = v_min.min(vertex[3]);
            v_max = v_max.max(vertex[3]);
        }
        assert!((u_min - 0.0).abs() < 1e-6 && (u_max - 1.0).abs() < 1e-6);
        assert!((v_min - 0.0).abs() < 1e-6 && (v_max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_three_visible_corners_make_one_triangle() {
        let mut out = Vec::new();
        let v = [1.0, 2.0, 0.5, 0.5];
        push_sub_quad(&mut out, &[Some(v), None, Some(v), Some(v)]);
        assert_eq!(out.len(), 3 * VERTEX_STRIDE);

        out.clear();
        push_sub_quad(&mut out, &[Some(v), None, None, Some(v)]);
        assert!(out.is_empty());
    }
}
