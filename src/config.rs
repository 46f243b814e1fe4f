//! Every tunable constant of the renderer and the demo scene, loadable from TOML.
//! Any table or key left out of the file keeps its default value.

use std::path::Path;

use nalgebra::{vector, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::buffer::Color;
use crate::scene::camera::Camera;
use crate::scene::shader::{ShaderKind, ShaderTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
    pub fov: f32, // Vertical, degrees.
    pub near: f32,
    pub far: f32,
    pub background: [u8; 3],
}

impl Default for ScreenConfig {
    fn default() -> Self {
        return Self {
            width: 1280,
            height: 720,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            background: [0, 0, 0],
        };
    }
}

impl ScreenConfig {
    pub fn background_color(&self) -> Color {
        return Color::new(self.background[0], self.background[1], self.background[2]);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub orbit_step: f32, // Degrees per move command.
    pub zoom_step: f32,
    pub min_distance: f32, // Zoom in limit on the total distance to the target.
    pub max_axis: f32,     // Zoom out limit on |z| alone.
}

impl Default for CameraConfig {
    fn default() -> Self {
        return Self {
            position: [0.0, 0.0, 4.5],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            orbit_step: 5.0,
            zoom_step: 0.5,
            min_distance: 1.5,
            max_axis: 40.0,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Points from surfaces to the light, doesn't need to be normalized.
    pub direction: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        return Self { direction: [0.0, 0.0, 1.0] };
    }
}

impl LightingConfig {
    pub fn direction(&self) -> Vector3<f32> {
        return Vector3::from(self.direction);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub seed: u32,
    pub frequency: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        return Self { seed: 1337, frequency: 0.01 };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub enabled: bool,
    pub count: u32,
    pub spacing: f32, // Distance between noise samples of neighbouring stars.
    pub depth: f32,
    pub drift: f32, // Offset change per frame.
    pub offset: [f64; 2],
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        return Self {
            enabled: true,
            count: 500,
            spacing: 5.0,
            depth: 100.0,
            drift: 0.001,
            offset: [1200.0, 3000.0],
        };
    }
}

/// Celestial body of the demo scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    pub shader: ShaderKind,
    pub scale: f32,
    pub orbit_radius: f32,
    pub orbit_speed: f32, // Degrees per frame.
    pub spin_speed: f32,  // Degrees per frame.
    /// Body to orbit around, origin if not set. Must be listed before this one.
    pub parent: Option<String>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        return Self {
            name: String::from("body"),
            shader: ShaderKind::Lit,
            scale: 1.0,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            spin_speed: 0.0,
            parent: None,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub frame_delay_ms: u64,
    pub mesh: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        return Self {
            title: String::from("solar renderer"),
            frame_delay_ms: 1000 / 60,
            mesh: String::from("assets/sphere.obj"),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub screen: ScreenConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub noise: NoiseConfig,
    pub starfield: StarfieldConfig,
    pub shaders: ShaderTable,
    pub bodies: Vec<BodyConfig>,
    pub app: AppConfig,
}

fn default_bodies() -> Vec<BodyConfig> {
    return vec![
        BodyConfig {
            name: String::from("sun"),
            shader: ShaderKind::Sun,
            scale: 1.0,
            spin_speed: 0.5,
            ..Default::default()
        },
        BodyConfig {
            name: String::from("earth"),
            shader: ShaderKind::Earth,
            scale: 0.4,
            orbit_radius: 2.5,
            orbit_speed: 1.0,
            spin_speed: 1.5,
            parent: Some(String::from("sun")),
        },
        BodyConfig {
            name: String::from("moon"),
            shader: ShaderKind::Moon,
            scale: 0.2,
            orbit_radius: 1.0,
            orbit_speed: 2.0,
            spin_speed: 1.0,
            parent: Some(String::from("earth")),
        },
    ];
}

impl Default for RenderConfig {
    fn default() -> Self {
        return Self {
            screen: ScreenConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            noise: NoiseConfig::default(),
            starfield: StarfieldConfig::default(),
            shaders: ShaderTable::default(),
            bodies: default_bodies(),
            app: AppConfig::default(),
        };
    }
}

impl RenderConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        return RenderConfig::from_toml(&contents);
    }

    pub fn from_toml(contents: &str) -> Result<RenderConfig, ConfigError> {
        let config: RenderConfig = toml::from_str(contents)?;
        config.validate()?;
        return Ok(config);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(message: String) -> Result<(), ConfigError> {
            return Err(ConfigError::Invalid(message));
        }

        let screen = &self.screen;
        if screen.width == 0 || screen.height == 0 {
            return invalid(format!("screen size {}x{} has no pixels", screen.width, screen.height));
        }
        if !(screen.near > 0.0 && screen.near < screen.far) {
            return invalid(format!("need 0 < near < far, got near {} far {}", screen.near, screen.far));
        }
        if !(screen.fov > 0.0 && screen.fov < 180.0) {
            return invalid(format!("fov {} is outside (0, 180)", screen.fov));
        }

        let camera = &self.camera;
        if !(camera.min_distance < camera.max_axis) {
            return invalid(format!(
                "zoom min distance {} is not below max axis {}",
                camera.min_distance, camera.max_axis
            ));
        }
        if camera.zoom_step <= 0.0 || camera.orbit_step <= 0.0 {
            return invalid(String::from("camera steps must be positive"));
        }
        if Camera::new(self.camera_position(), self.camera_target(), self.camera_up()).is_degenerate() {
            return invalid(String::from("camera looks along its up vector or sits on its target"));
        }
        if (camera.position[2] - camera.target[2]).abs() > camera.max_axis {
            return invalid(format!("camera starts beyond max axis {}", camera.max_axis));
        }

        if self.lighting.direction().norm() < f32::EPSILON {
            return invalid(String::from("light direction is a zero vector"));
        }

        for (i, body) in self.bodies.iter().enumerate() {
            if let Some(parent) = &body.parent {
                if !self.bodies[..i].iter().any(|other| &other.name == parent) {
                    return invalid(format!("body {} orbits {}, which is not listed before it", body.name, parent));
                }
            }
        }
        return Ok(());
    }

    pub fn camera_position(&self) -> Vector3<f32> {
        return Vector3::from(self.camera.position);
    }

    pub fn camera_target(&self) -> Vector3<f32> {
        return Vector3::from(self.camera.target);
    }

    pub fn camera_up(&self) -> Vector3<f32> {
        let up = Vector3::from(self.camera.up);
        return match up.norm() > f32::EPSILON {
            true => up,
            false => vector![0.0, 1.0, 0.0],
        };
    }
}
