use log::warn;
use nalgebra as na;
use na::{vector, Matrix4, Point3, Vector3};

use crate::config::CameraConfig;

/// Discrete camera inputs, one per camera operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ZoomIn,
    ZoomOut,
}

/// Orbit camera, looking at a target from a position, all in world space.
/// Operations consume the camera and return the moved one, a refused step returns it unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
}

/// Smallest angle between view direction and up, that pitch is allowed to reach.
const MIN_UP_ANGLE_DEGREES: f32 = 1.0;

/// Helper, rotating the (a, b) pair by a step around the origin, keeping its length.
fn orbit_pair(a: f32, b: f32, step_degrees: f32) -> (f32, f32) {
    let radius = a.hypot(b);
    let angle = a.atan2(b) + step_degrees.to_radians();
    return (angle.sin() * radius, angle.cos() * radius);
}

impl Default for Camera {
    fn default() -> Self {
        return Self {
            position: vector![0.0, 0.0, 4.5],
            target: Vector3::zeros(),
            up: vector![0.0, 1.0, 0.0],
        };
    }
}

impl Camera {
    pub fn new(position: Vector3<f32>, target: Vector3<f32>, up: Vector3<f32>) -> Self {
        return Self { position, target, up };
    }

    pub fn distance(&self) -> f32 {
        return (self.position - self.target).norm();
    }

    /// True if view direction is (nearly) parallel to up, or the camera sits on its target.
    pub fn is_degenerate(&self) -> bool {
        let direction = self.target - self.position;
        return match (direction.try_normalize(f32::EPSILON), self.up.try_normalize(f32::EPSILON)) {
            (Some(direction), Some(up)) => direction.dot(&up).abs() > MIN_UP_ANGLE_DEGREES.to_radians().cos(),
            _ => true,
        };
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        return Matrix4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        );
    }

    /// Pitch, rotating the (y, z) pair of the offset from the target.
    fn pitch(self, step_degrees: f32) -> Camera {
        let offset = self.position - self.target;
        let (y, z) = orbit_pair(offset.y, offset.z, step_degrees);
        let moved = Camera { position: self.target + vector![offset.x, y, z], ..self };
        if moved.is_degenerate() {
            return self;
        }
        return moved;
    }

    /// Yaw, rotating the (x, z) pair of the offset from the target.
    fn yaw(self, step_degrees: f32) -> Camera {
        let offset = self.position - self.target;
        let (x, z) = orbit_pair(offset.x, offset.z, step_degrees);
        return Camera { position: self.target + vector![x, offset.y, z], ..self };
    }

    /// Refuses steps, that would bring the view direction close to parallel with up.
    pub fn move_up(self, step_degrees: f32) -> Camera {
        return self.pitch(step_degrees);
    }

    pub fn move_down(self, step_degrees: f32) -> Camera {
        return self.pitch(-step_degrees);
    }

    pub fn move_left(self, step_degrees: f32) -> Camera {
        return self.yaw(-step_degrees);
    }

    pub fn move_right(self, step_degrees: f32) -> Camera {
        return self.yaw(step_degrees);
    }

    /// Moves z of the offset towards the target. Refused, when the camera would end up closer
    /// than `min_distance` or z would have to cross the target plane.
    /// Only z moves, so a camera yawed onto the x axis (|z| below one step) can't zoom in at
    /// all until it's moved back around.
    pub fn zoom_in(self, step: f32, min_distance: f32) -> Camera {
        let offset = self.position - self.target;
        if offset.z.abs() < step {
            return self;
        }
        let z = offset.z - step * offset.z.signum();
        let moved = Camera { position: self.target + vector![offset.x, offset.y, z], ..self };
        if moved.distance() < min_distance {
            return self;
        }
        return moved;
    }

    /// Moves z of the offset away from the target. Refused, when |z| would exceed `max_axis`.
    /// Unlike `zoom_in`, only the single axis is bounded.
    pub fn zoom_out(self, step: f32, max_axis: f32) -> Camera {
        let offset = self.position - self.target;
        let z = offset.z + step * offset.z.signum();
        if z.abs() > max_axis {
            return self;
        }
        return Camera { position: self.target + vector![offset.x, offset.y, z], ..self };
    }

    /// Maps a command onto its operation, with steps and limits taken from config.
    pub fn apply(self, command: CameraCommand, config: &CameraConfig) -> Camera {
        let moved = match command {
            CameraCommand::MoveUp => self.move_up(config.orbit_step),
            CameraCommand::MoveDown => self.move_down(config.orbit_step),
            CameraCommand::MoveLeft => self.move_left(config.orbit_step),
            CameraCommand::MoveRight => self.move_right(config.orbit_step),
            CameraCommand::ZoomIn => self.zoom_in(config.zoom_step, config.min_distance),
            CameraCommand::ZoomOut => self.zoom_out(config.zoom_step, config.max_axis),
        };
        if moved == self {
            warn!("Camera refused {:?} at {:?}", command, self.position.as_slice());
        }
        return moved;
    }
}
