//! Software rendering pipeline: vertex shader, primitive assembly, rasterization, fragment
//! shading and depth tested composition into a framebuffer.

pub mod buffer;
pub mod camera;
pub mod model;
pub mod noise;
pub mod raster;
pub mod shader;
pub mod starfield;
pub mod transform;
pub mod util;
pub mod vertex;

use log::debug;
use nalgebra::Matrix4;

use crate::config::RenderConfig;
use buffer::Framebuffer;
use camera::Camera;
use model::Model;
use raster::Rasterizer;
use shader::FragmentShaders;
use starfield::Starfield;
use transform::{create_projection_matrix, create_viewport_matrix, Uniforms};
use vertex::{primitive_assembly, vertex_shader, Vertex};

/// Counters of a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub models: u32,
    pub triangles: u32,
    pub fragments: u64, // Emitted by the rasterizer.
    pub written: u64,   // Passed the depth test.
    pub stars: u32,
}

/// Owns everything a frame needs. Frames go begin_frame -> submit for every model -> end_frame.
pub struct Renderer {
    framebuffer: Framebuffer,
    rasterizer: Rasterizer,
    shaders: FragmentShaders,
    starfield: Option<Starfield>,
    projection: Matrix4<f32>,
    viewport: Matrix4<f32>,
    view: Matrix4<f32>,
    stats: FrameStats,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        let screen = &config.screen;
        let starfield = match config.starfield.enabled {
            true => Some(Starfield::new(&config.starfield, config.noise.seed, config.noise.frequency)),
            false => None,
        };
        return Self {
            framebuffer: Framebuffer::new(screen.width, screen.height, screen.background_color()),
            rasterizer: Rasterizer::new(screen.width, screen.height, config.lighting.direction()),
            shaders: FragmentShaders::new(config.shaders, config.noise.seed, config.noise.frequency),
            starfield,
            projection: create_projection_matrix(screen.width, screen.height, screen.fov, screen.near, screen.far),
            viewport: create_viewport_matrix(screen.width, screen.height),
            view: Matrix4::identity(),
            stats: FrameStats::default(),
        };
    }

    /// Clears the framebuffer, draws the stars and fixes the view matrix for the rest of the frame.
    pub fn begin_frame(&mut self, camera: &Camera) {
        self.framebuffer.clear();
        self.view = camera.view_matrix();
        self.stats = FrameStats::default();
        if let Some(starfield) = &mut self.starfield {
            starfield.advance();
            self.stats.stars = starfield.draw(&mut self.framebuffer);
        }
    }

    /// Runs the whole pipeline for one model right away.
    pub fn submit(&mut self, model: &Model) {
        let uniforms = Uniforms {
            model: model.model_matrix,
            view: self.view,
            projection: self.projection,
            viewport: self.viewport,
        };

        // 1. Vertex shader.
        let transformed: Vec<Vertex> = model
            .mesh
            .vertices()
            .iter()
            .map(|v| vertex_shader(&Vertex::new(v.position, v.normal, v.tex), &uniforms))
            .collect();

        // 2. Primitive assembly.
        let triangles = primitive_assembly(&transformed);

        // 3. Rasterization, 4. fragment shader and depth test, fragment by fragment.
        let Renderer { framebuffer, rasterizer, shaders, stats, .. } = self;
        for triangle in &triangles {
            rasterizer.for_each_fragment(triangle, model.base_color, |fragment| {
                stats.fragments += 1;
                if framebuffer.submit(&shaders.shade(model.shader, fragment)) {
                    stats.written += 1;
                }
            });
        }

        self.stats.models += 1;
        self.stats.triangles += triangles.len() as u32;
    }

    pub fn end_frame(&mut self) -> FrameStats {
        debug!("{:?}", self.stats);
        return self.stats;
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        return &self.framebuffer;
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        return &mut self.framebuffer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use buffer::Color;
    use nalgebra::vector;
    use shader::ShaderKind;
    use std::sync::Arc;

    fn small_config() -> RenderConfig {
        let mut config = RenderConfig::default();
        config.screen.width = 160;
        config.screen.height = 90;
        config.starfield.enabled = false;
        return config;
    }

    /// Square of two triangles facing +z, at the given depth in world space.
    fn square(z: f32, half: f32) -> Arc<Mesh> {
        let n = vector![0.0, 0.0, 1.0];
        let t = vector![0.0, 0.0, 0.0];
        let p = |x: f32, y: f32| vector![x * half, y * half, z];
        let buffer = [
            p(-1.0, -1.0), n, t, p(1.0, -1.0), n, t, p(1.0, 1.0), n, t,
            p(-1.0, -1.0), n, t, p(1.0, 1.0), n, t, p(-1.0, 1.0), n, t,
        ];
        return Arc::new(Mesh::from_interleaved(&buffer).unwrap());
    }

    #[test]
    fn nearer_model_covers_further_one_regardless_of_order() {
        let mut renderer = Renderer::new(&small_config());
        let near = Model::new(square(1.0, 0.5), Matrix4::identity(), ShaderKind::Lit).with_color(Color::new(0, 255, 0));
        let far = Model::new(square(-1.0, 0.5), Matrix4::identity(), ShaderKind::Lit).with_color(Color::new(255, 0, 0));

        renderer.begin_frame(&Camera::default());
        renderer.submit(&near);
        renderer.submit(&far);
        let stats = renderer.end_frame();

        let center = renderer.framebuffer().pixel(80, 45);
        assert!(center.g > 200 && center.r == 0, "{:?}", center);
        assert_eq!(stats.models, 2);
        assert_eq!(stats.triangles, 4);
        assert!(stats.written < stats.fragments);
    }

    #[test]
    fn begin_frame_clears_previous_frame() {
        let mut renderer = Renderer::new(&small_config());
        let model = Model::new(square(0.0, 0.5), Matrix4::identity(), ShaderKind::Lit);
        renderer.begin_frame(&Camera::default());
        renderer.submit(&model);
        assert!(renderer.end_frame().written > 0);

        renderer.begin_frame(&Camera::default());
        let stats = renderer.end_frame();
        assert_eq!(stats, FrameStats::default());
        assert_eq!(renderer.framebuffer().pixel(80, 45), Color::BLACK);
        assert_eq!(renderer.framebuffer().depth_at(80, 45), Framebuffer::CLEAR_DEPTH);
    }

    #[test]
    fn stars_are_drawn_when_enabled() {
        let mut config = small_config();
        config.starfield.enabled = true;
        let mut renderer = Renderer::new(&config);
        renderer.begin_frame(&Camera::default());
        assert!(renderer.end_frame().stars > 0);
    }
}
