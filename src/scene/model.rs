use std::sync::Arc;

use nalgebra::Matrix4;

use super::buffer::Color;
use super::shader::ShaderKind;
use crate::mesh::Mesh;

/// One draw call worth of data. Meshes are shared, the render list itself is rebuilt every frame.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: Arc<Mesh>,
    pub model_matrix: Matrix4<f32>,
    pub shader: ShaderKind,
    pub base_color: Color, // Only the Lit shader looks at it.
}

impl Model {
    pub fn new(mesh: Arc<Mesh>, model_matrix: Matrix4<f32>, shader: ShaderKind) -> Self {
        return Self {
            mesh,
            model_matrix,
            shader,
            base_color: Color::WHITE,
        };
    }

    pub fn with_color(mut self, base_color: Color) -> Self {
        self.base_color = base_color;
        return self;
    }
}
