use nalgebra::Vector3;

use super::transform::Uniforms;
use super::util::{from_hom_point, to_hom_point, upper_3x3};

/// Vertex flowing through the pipeline.
/// Before the vertex shader `position` is in object space, after it - in screen space with
/// depth in z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tex: Vector3<f32>, // Carried along, never sampled.
    pub world_pos: Vector3<f32>,
    pub original_pos: Vector3<f32>, // Object space position, the only input of procedural shaders.
}

impl Vertex {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>, tex: Vector3<f32>) -> Self {
        return Self {
            position,
            normal,
            tex,
            world_pos: position,
            original_pos: position,
        };
    }
}

/// Takes a vertex all the way from object space to screen space.
///
/// A vertex with clip w == 0 comes out with inf or NaN coordinates, the rasterizer skips
/// triangles like that.
pub fn vertex_shader(vertex: &Vertex, uniforms: &Uniforms) -> Vertex {
    let clip = uniforms.projection * uniforms.view * uniforms.model * to_hom_point(vertex.position);
    let ndc = from_hom_point(clip);
    let screen = uniforms.viewport * to_hom_point(ndc);

    // Not interested in translation, when transforming normals.
    let normal = upper_3x3(&uniforms.model) * vertex.normal;
    let normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);

    let world_pos = (uniforms.model * to_hom_point(vertex.position)).xyz();

    return Vertex {
        position: screen.xyz(),
        normal,
        tex: vertex.tex,
        world_pos,
        original_pos: vertex.position,
    };
}

/// Groups transformed vertices into triangles, three consecutive vertices each.
/// Vertex count is expected to be a multiple of 3, a trailing incomplete triangle is dropped.
pub fn primitive_assembly(transformed_vertices: &[Vertex]) -> Vec<[Vertex; 3]> {
    return transformed_vertices
        .chunks_exact(3)
        .map(|triangle| [triangle[0], triangle[1], triangle[2]])
        .collect();
}
