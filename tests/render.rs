use std::path::PathBuf;
use std::sync::Arc;

use nalgebra::{vector, Matrix4};

use solar_renderer::config::RenderConfig;
use solar_renderer::mesh::Mesh;
use solar_renderer::scene::buffer::Framebuffer;
use solar_renderer::scene::camera::Camera;
use solar_renderer::scene::model::Model;
use solar_renderer::scene::shader::ShaderKind;
use solar_renderer::scene::Renderer;

fn asset(name: &str) -> PathBuf {
    return PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(name);
}

fn sphere() -> Arc<Mesh> {
    return Arc::new(Mesh::load(asset("sphere.obj")).unwrap());
}

fn config_without_stars() -> RenderConfig {
    let mut config = RenderConfig::default();
    config.starfield.enabled = false;
    return config;
}

/// Pixels, that something was drawn to.
fn covered(framebuffer: &Framebuffer) -> Vec<(u32, u32)> {
    let mut pixels = Vec::new();
    for y in 0..framebuffer.height {
        for x in 0..framebuffer.width {
            if framebuffer.depth_at(x, y).is_finite() {
                pixels.push((x, y));
            }
        }
    }
    return pixels;
}

#[test]
fn unit_sphere_lands_in_the_middle_of_the_screen() {
    let config = config_without_stars();
    let mut renderer = Renderer::new(&config);
    renderer.begin_frame(&Camera::default());
    renderer.submit(&Model::new(sphere(), Matrix4::identity(), ShaderKind::Lit));
    let stats = renderer.end_frame();
    assert_eq!(stats.triangles, 1280);

    let pixels = covered(renderer.framebuffer());
    assert!(!pixels.is_empty());
    let x_min = pixels.iter().map(|p| p.0).min().unwrap() as f32;
    let x_max = pixels.iter().map(|p| p.0).max().unwrap() as f32;
    let y_min = pixels.iter().map(|p| p.1).min().unwrap() as f32;
    let y_max = pixels.iter().map(|p| p.1).max().unwrap() as f32;
    assert!(((x_min + x_max) / 2.0 - 640.0).abs() <= 2.0, "{} {}", x_min, x_max);
    assert!(((y_min + y_max) / 2.0 - 360.0).abs() <= 2.0, "{} {}", y_min, y_max);

    // Unit sphere seen from 4.5 away with a 45 degree fov is about 198 pixels in radius.
    for &(x, y) in &pixels {
        let distance = ((x as f32 - 640.0).powi(2) + (y as f32 - 360.0).powi(2)).sqrt();
        assert!(distance <= 201.0, "({}, {}) is {} away", x, y, distance);
    }
    assert!(x_max - x_min > 380.0);

    // Facing the light, so the middle is fully lit.
    assert!(renderer.framebuffer().pixel(640, 360).r >= 250);
}

#[test]
fn same_frame_renders_identically() {
    let config = config_without_stars();
    let mesh = sphere();
    let render = |shader: ShaderKind| {
        let mut renderer = Renderer::new(&config);
        renderer.begin_frame(&Camera::default());
        let model = nalgebra::Matrix4::new_translation(&vector![0.3, -0.2, 0.0]);
        renderer.submit(&Model::new(Arc::clone(&mesh), model, shader));
        renderer.end_frame();
        return renderer.framebuffer().to_image();
    };
    for shader in ShaderKind::ALL {
        assert_eq!(render(shader), render(shader), "{:?}", shader);
    }
}

#[test]
fn orbiting_the_camera_keeps_the_sphere_size() {
    let config = config_without_stars();
    let mesh = sphere();
    let mut camera = Camera::default();
    for _ in 0..6 {
        camera = camera.move_right(config.camera.orbit_step);
    }
    let mut renderer = Renderer::new(&config);
    renderer.begin_frame(&camera);
    renderer.submit(&Model::new(mesh, Matrix4::identity(), ShaderKind::Earth));
    renderer.end_frame();

    let pixels = covered(renderer.framebuffer());
    let x_min = pixels.iter().map(|p| p.0).min().unwrap() as f32;
    let x_max = pixels.iter().map(|p| p.0).max().unwrap() as f32;
    assert!(((x_min + x_max) / 2.0 - 640.0).abs() <= 2.0);
    assert!(x_max - x_min > 380.0 && x_max - x_min < 402.0);
}

#[test]
fn shipped_config_is_valid() {
    let config = RenderConfig::load(asset("solar_system.toml")).unwrap();
    assert_eq!(config.bodies.len(), 7);
    assert_eq!(config.bodies[3].parent.as_deref(), Some("earth"));
    assert!(ShaderKind::ALL
        .iter()
        .filter(|&&kind| kind != ShaderKind::Noise && kind != ShaderKind::Lit)
        .all(|kind| config.bodies.iter().any(|body| body.shader == *kind)));
}
