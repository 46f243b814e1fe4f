use std::path::PathBuf;
use std::sync::Arc;
use std::{thread, time};

use log::info;
use nalgebra::{vector, Vector3};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use crate::config::{BodyConfig, RenderConfig};
use crate::mesh::Mesh;
use crate::scene::camera::{Camera, CameraCommand};
use crate::scene::model::Model;
use crate::scene::transform::create_model_matrix;
use crate::scene::Renderer;

/// Execution context, on top of the config.
#[derive(Debug, Clone)]
pub struct Context {
    pub mesh: Option<PathBuf>, // Overrides the mesh from config.
    pub headless: bool,
    pub frames: u32, // Headless only.
    pub output: PathBuf,
    pub print_fps: bool,
}

/// Animated bodies of the scene, angles advance by a fixed amount every frame.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    bodies: Vec<BodyConfig>,
    parents: Vec<Option<usize>>,
    orbit_angles: Vec<f32>,
    spin_angles: Vec<f32>,
}

impl SolarSystem {
    /// Parents are expected to be listed before their children, as config validation ensures.
    /// A parent name, that can't be found, leaves the body orbiting the origin.
    pub fn new(bodies: &[BodyConfig]) -> Self {
        let parents = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| match &body.parent {
                Some(parent) => bodies[..i].iter().position(|other| &other.name == parent),
                None => None,
            })
            .collect();
        return Self {
            bodies: bodies.to_vec(),
            parents,
            orbit_angles: vec![0.0; bodies.len()],
            spin_angles: vec![0.0; bodies.len()],
        };
    }

    pub fn advance(&mut self) {
        for (i, body) in self.bodies.iter().enumerate() {
            self.orbit_angles[i] = (self.orbit_angles[i] + body.orbit_speed) % 360.0;
            self.spin_angles[i] = (self.spin_angles[i] + body.spin_speed) % 360.0;
        }
    }

    /// World position of every body, children orbit in the xz plane around their parent.
    pub fn positions(&self) -> Vec<Vector3<f32>> {
        let mut positions: Vec<Vector3<f32>> = Vec::with_capacity(self.bodies.len());
        for (i, body) in self.bodies.iter().enumerate() {
            let center = match self.parents[i] {
                Some(parent) => positions[parent],
                None => Vector3::zeros(),
            };
            let angle = self.orbit_angles[i].to_radians();
            positions.push(center + vector![angle.cos(), 0.0, angle.sin()] * body.orbit_radius);
        }
        return positions;
    }

    pub fn models(&self, mesh: &Arc<Mesh>) -> Vec<Model> {
        return self
            .positions()
            .into_iter()
            .zip(self.bodies.iter())
            .zip(self.spin_angles.iter())
            .map(|((position, body), &spin)| {
                let matrix = create_model_matrix(position, Vector3::repeat(body.scale), vector![0.0, 1.0, 0.0], spin);
                Model::new(Arc::clone(mesh), matrix, body.shader)
            })
            .collect();
    }
}

/// Helper, mapping key presses to camera commands.
fn camera_command(key: event::VirtualKeyCode) -> Option<CameraCommand> {
    return match key {
        event::VirtualKeyCode::Up => Some(CameraCommand::MoveUp),
        event::VirtualKeyCode::Down => Some(CameraCommand::MoveDown),
        event::VirtualKeyCode::Left => Some(CameraCommand::MoveLeft),
        event::VirtualKeyCode::Right => Some(CameraCommand::MoveRight),
        event::VirtualKeyCode::W => Some(CameraCommand::ZoomIn),
        event::VirtualKeyCode::S => Some(CameraCommand::ZoomOut),
        _ => None,
    };
}

fn initial_camera(config: &RenderConfig) -> Camera {
    return Camera::new(config.camera_position(), config.camera_target(), config.camera_up());
}

fn render_frame(renderer: &mut Renderer, camera: &Camera, system: &SolarSystem, mesh: &Arc<Mesh>) {
    renderer.begin_frame(camera);
    for model in system.models(mesh) {
        renderer.submit(&model);
    }
    renderer.end_frame();
}

/// Renders `context.frames` frames without a window and saves the last one as an image.
fn run_headless(config: &RenderConfig, context: &Context, mesh: Arc<Mesh>) -> Result<(), Box<dyn std::error::Error>> {
    let mut renderer = Renderer::new(config);
    let mut system = SolarSystem::new(&config.bodies);
    let camera = initial_camera(config);

    for _ in 0..context.frames.max(1) {
        system.advance();
        render_frame(&mut renderer, &camera, &system, &mesh);
    }
    renderer.framebuffer().to_image().save(&context.output)?;
    info!("Saved frame to {}", context.output.display());
    return Ok(());
}

/// Actually launches the window, showing frames until Escape is pressed.
fn run_windowed(config: &RenderConfig, context: &Context, mesh: Arc<Mesh>) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (config.screen.width, config.screen.height);
    let mut renderer = Renderer::new(config);
    let mut system = SolarSystem::new(&config.bodies);
    let mut camera = initial_camera(config);

    let window_options: WindowOptions = WindowOptions {
        size: Some([width, height]),
        ..Default::default()
    };
    let window = create_window(&config.app.title, window_options)?;
    let event_channel = window.event_channel()?;

    let frame_delay = time::Duration::from_millis(config.app.frame_delay_ms);
    let mut show_depth = false;
    let mut exit = false;
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    while !exit {
        system.advance();
        render_frame(&mut renderer, &camera, &system, &mesh);

        let image_data = match show_depth {
            true => ImageView::new(ImageInfo::rgba8(width, height), renderer.framebuffer_mut().as_depth_data()),
            false => ImageView::new(ImageInfo::rgba8(width, height), renderer.framebuffer().as_render_data()),
        };
        window.set_image("image", image_data)?;

        // Unloading all the events, that have piled up during the frame.
        for window_event in event_channel.try_iter() {
            let input = match window_event {
                event::WindowEvent::KeyboardInput(event) => event.input,
                _ => continue,
            };
            if !input.state.is_pressed() {
                continue;
            }
            match input.key_code {
                Some(event::VirtualKeyCode::Escape) => exit = true,
                Some(event::VirtualKeyCode::D) => show_depth = !show_depth,
                Some(key) => {
                    if let Some(command) = camera_command(key) {
                        camera = camera.apply(command, &config.camera);
                    }
                }
                None => (),
            }
        }

        if context.print_fps {
            // Counting frames to printout stats every second.
            frame_counter += 1;
            if frame_counter_time_begin.elapsed().as_secs_f32() > 1.0 {
                info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }

        thread::sleep(frame_delay);
    }

    return Ok(());
}

pub fn run(config: RenderConfig, context: Context) -> Result<(), Box<dyn std::error::Error>> {
    let mesh_path = match &context.mesh {
        Some(path) => path.clone(),
        None => PathBuf::from(&config.app.mesh),
    };
    let mesh = Arc::new(Mesh::load(&mesh_path)?);
    info!(
        "Rendering {} bodies at {}x{}",
        config.bodies.len(),
        config.screen.width,
        config.screen.height
    );

    return match context.headless {
        true => run_headless(&config, &context, mesh),
        false => run_windowed(&config, &context, mesh),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::scene::shader::ShaderKind;

    fn body(name: &str, radius: f32, speed: f32, parent: Option<&str>) -> BodyConfig {
        return BodyConfig {
            name: String::from(name),
            shader: ShaderKind::Lit,
            scale: 1.0,
            orbit_radius: radius,
            orbit_speed: speed,
            spin_speed: 1.0,
            parent: parent.map(String::from),
        };
    }

    #[test]
    fn moon_follows_its_planet() {
        let bodies = [
            body("sun", 0.0, 0.0, None),
            body("earth", 2.0, 90.0, Some("sun")),
            body("moon", 1.0, 90.0, Some("earth")),
        ];
        let mut system = SolarSystem::new(&bodies);
        let start = system.positions();
        assert_relative_eq!(start[1], vector![2.0, 0.0, 0.0]);
        assert_relative_eq!(start[2], vector![3.0, 0.0, 0.0]);

        system.advance();
        let moved = system.positions();
        assert_relative_eq!(moved[0], Vector3::zeros());
        assert_relative_eq!(moved[1], vector![0.0, 0.0, 2.0], epsilon = 1e-5);
        assert_relative_eq!(moved[2], vector![0.0, 0.0, 3.0], epsilon = 1e-5);
    }

    #[test]
    fn unknown_parent_orbits_origin() {
        let system = SolarSystem::new(&[body("moon", 1.0, 0.0, Some("nowhere"))]);
        assert_relative_eq!(system.positions()[0], vector![1.0, 0.0, 0.0]);
    }

    #[test]
    fn models_share_the_mesh() {
        let n = vector![0.0, 0.0, 1.0];
        let mesh = Arc::new(Mesh::from_interleaved(&[n, n, n, n, n, n, n, n, n]).unwrap());
        let system = SolarSystem::new(&RenderConfig::default().bodies);
        let models = system.models(&mesh);
        assert_eq!(models.len(), 3);
        assert_eq!(Arc::strong_count(&mesh), 4);
        assert_eq!(models[0].shader, ShaderKind::Sun);
    }

    #[test]
    fn keys_map_to_camera_commands() {
        assert_eq!(camera_command(event::VirtualKeyCode::Up), Some(CameraCommand::MoveUp));
        assert_eq!(camera_command(event::VirtualKeyCode::S), Some(CameraCommand::ZoomOut));
        assert_eq!(camera_command(event::VirtualKeyCode::Q), None);
    }

    #[test]
    fn headless_run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_path = dir.path().join("triangle.obj");
        std::fs::write(&mesh_path, "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mut config = RenderConfig::default();
        config.screen.width = 64;
        config.screen.height = 36;
        let context = Context {
            mesh: Some(mesh_path),
            headless: true,
            frames: 2,
            output: dir.path().join("frame.png"),
            print_fps: false,
        };
        run(config, context.clone()).unwrap();
        let image = image::open(&context.output).unwrap();
        assert_eq!((image.width(), image.height()), (64, 36));
    }
}
