use nalgebra::{vector, Vector3};

use super::buffer::Color;
use super::vertex::Vertex;

/// Candidate pixel write, produced by rasterizing one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub depth: f32, // Post projection z, nearer is smaller.
    pub color: Color,
    pub intensity: f32, // Diffuse light coefficient in [0, 1].
    pub normal: Vector3<f32>,
    pub world_pos: Vector3<f32>,
    pub original_pos: Vector3<f32>,
}

/// Simple local bounding box struct for convenience, corners are inclusive.
#[derive(Debug, PartialEq, Eq)]
struct BoundingBox {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

/// Bounding box of a triangle clamped to the screen, None if nothing is left of it, or any of
/// the coordinates is not finite.
fn get_triangle_bounding_box(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>, width: u32, height: u32) -> Option<BoundingBox> {
    if width == 0 || height == 0 {
        return None;
    }
    if [a.x, a.y, b.x, b.y, c.x, c.y].iter().any(|value| !value.is_finite()) {
        return None;
    }
    let x_low = a.x.min(b.x).min(c.x).floor();
    let y_low = a.y.min(b.y).min(c.y).floor();
    let x_high = a.x.max(b.x).max(c.x).ceil();
    let y_high = a.y.max(b.y).max(c.y).ceil();
    let x_limit = (width - 1) as f32;
    let y_limit = (height - 1) as f32;
    if x_high < 0.0 || y_high < 0.0 || x_low > x_limit || y_low > y_limit {
        return None;
    }
    // Clamping in float domain first, so the casts can't overflow.
    return Some(BoundingBox {
        x_min: x_low.max(0.0) as u32,
        y_min: y_low.max(0.0) as u32,
        x_max: x_high.min(x_limit) as u32,
        y_max: y_high.min(y_limit) as u32,
    });
}

/// Twice the signed area of a triangle below which it's treated as degenerate.
const DEGENERATE_AREA: f32 = 1e-6;

/// Barycentric coordinates of point p relative to triangle a, b, c in screen space.
/// None for a degenerate triangle.
fn to_barycentric_coord(p: (f32, f32), a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<Vector3<f32>> {
    let raw_cross = vector![b.x - a.x, c.x - a.x, a.x - p.0].cross(&vector![b.y - a.y, c.y - a.y, a.y - p.1]);
    if raw_cross.z.abs() < DEGENERATE_AREA {
        return None;
    }
    // Dividing by the signed area makes the weights winding independent.
    return Some(vector![
        1.0 - (raw_cross.x + raw_cross.y) / raw_cross.z,
        raw_cross.x / raw_cross.z,
        raw_cross.y / raw_cross.z
    ]);
}

/// Turns screen space triangles into fragments.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    pub width: u32,
    pub height: u32,
    light_direction: Vector3<f32>, // Normalized, pointing from the surface to the light.
}

impl Rasterizer {
    /// Light direction doesn't need to be normalized, a zero vector leaves everything unlit.
    pub fn new(width: u32, height: u32, light_direction: Vector3<f32>) -> Self {
        return Self {
            width,
            height,
            light_direction: light_direction.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros),
        };
    }

    /// Fragments covering the triangle, in row order from the bottom of its bounding box.
    /// Edges are inclusive, so neighbouring triangles can both emit the pixels on a shared edge.
    /// Triangles facing away from the light are still emitted, with zero intensity.
    pub fn triangle(&self, triangle: &[Vertex; 3], base_color: Color) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        self.for_each_fragment(triangle, base_color, |fragment| fragments.push(fragment));
        return fragments;
    }

    /// Same as `triangle`, but hands fragments out one by one without collecting them.
    pub fn for_each_fragment<F: FnMut(Fragment)>(&self, triangle: &[Vertex; 3], base_color: Color, mut emit: F) {
        let [a, b, c] = triangle;
        let bbox = match get_triangle_bounding_box(a.position, b.position, c.position, self.width, self.height) {
            Some(bbox) => bbox,
            None => return,
        };

        for y in bbox.y_min..=bbox.y_max {
            for x in bbox.x_min..=bbox.x_max {
                let bar_coord = match to_barycentric_coord((x as f32, y as f32), a.position, b.position, c.position) {
                    Some(bar_coord) => bar_coord,
                    // Degenerate triangle, no pixel of it can be covered.
                    None => return,
                };
                if bar_coord.x < 0.0 || bar_coord.y < 0.0 || bar_coord.z < 0.0 {
                    // If any of the coordinates are negative, point is not in the triangle, so skipping it.
                    continue;
                }

                let depth = bar_coord.dot(&vector![a.position.z, b.position.z, c.position.z]);
                let normal = a.normal * bar_coord.x + b.normal * bar_coord.y + c.normal * bar_coord.z;
                let world_pos = a.world_pos * bar_coord.x + b.world_pos * bar_coord.y + c.world_pos * bar_coord.z;
                let original_pos =
                    a.original_pos * bar_coord.x + b.original_pos * bar_coord.y + c.original_pos * bar_coord.z;

                let intensity = match normal.try_normalize(f32::EPSILON) {
                    Some(normal) => normal.dot(&self.light_direction).clamp(0.0, 1.0),
                    None => 0.0,
                };

                emit(Fragment {
                    x,
                    y,
                    depth,
                    color: base_color,
                    intensity,
                    normal,
                    world_pos,
                    original_pos,
                });
            }
        }
    }
}
