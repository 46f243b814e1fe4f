use nalgebra as na;
use na::{vector, Matrix4, Rotation3, Unit, Vector3};

/// Per model transform bundle, handed to the vertex shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub model: Matrix4<f32>,      // Object to world.
    pub view: Matrix4<f32>,       // World to camera, shared by every model of a frame.
    pub projection: Matrix4<f32>, // Camera to clip space, constant.
    pub viewport: Matrix4<f32>,   // Normalized device coordinates to pixels, constant.
}

impl Uniforms {
    pub fn identity() -> Self {
        return Self {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            viewport: Matrix4::identity(),
        };
    }
}

/// Model matrix translate * scale * rotate, angle in degrees.
/// Falls back to no rotation for a zero rotation axis.
pub fn create_model_matrix(
    translation: Vector3<f32>,
    scale: Vector3<f32>,
    rotation_axis: Vector3<f32>,
    angle: f32,
) -> Matrix4<f32> {
    let translate = Matrix4::new_translation(&translation);
    let scale = Matrix4::new_nonuniform_scaling(&scale);
    let rotation = match Unit::try_new(rotation_axis, f32::EPSILON) {
        Some(axis) => Rotation3::from_axis_angle(&axis, angle.to_radians()).to_homogeneous(),
        None => Matrix4::identity(),
    };
    return translate * scale * rotation;
}

/// Right handed OpenGL style perspective, depth ends up in [-1, 1] after the divide.
pub fn create_projection_matrix(width: u32, height: u32, fov_degrees: f32, near: f32, far: f32) -> Matrix4<f32> {
    let aspect_ratio = width as f32 / height as f32;
    return Matrix4::new_perspective(aspect_ratio, fov_degrees.to_radians(), near, far);
}

/// Maps normalized device coordinates to pixels: x in [0, width], y in [0, height] and
/// depth to (z + 0.5) / 2, so nearer is smaller.
pub fn create_viewport_matrix(width: u32, height: u32) -> Matrix4<f32> {
    let scale = Matrix4::new_nonuniform_scaling(&vector![width as f32 / 2.0, height as f32 / 2.0, 0.5]);
    let translate = Matrix4::new_translation(&vector![1.0, 1.0, 0.5]);
    return scale * translate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use na::Point3;

    #[test]
    fn viewport_maps_ndc_corners_to_screen() {
        let viewport = create_viewport_matrix(1280, 720);
        let low = viewport.transform_point(&Point3::new(-1.0, -1.0, -1.0));
        let high = viewport.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(low, Point3::new(0.0, 0.0, -0.25));
        assert_relative_eq!(high, Point3::new(1280.0, 720.0, 0.75));
    }

    #[test]
    fn model_matrix_applies_scale_before_translation() {
        let model = create_model_matrix(vector![2.0, 0.0, 0.0], vector![0.5, 0.5, 0.5], vector![0.0, 1.0, 0.0], 0.0);
        let p = model.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(2.5, 0.5, 0.5));
    }

    #[test]
    fn model_matrix_rotates_about_axis() {
        let model = create_model_matrix(Vector3::zeros(), vector![1.0, 1.0, 1.0], vector![0.0, 1.0, 0.0], 90.0);
        let p = model.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn projection_keeps_center_on_axis() {
        let projection = create_projection_matrix(1280, 720, 45.0, 0.1, 100.0);
        let p = projection.transform_point(&Point3::new(0.0, 0.0, -4.5));
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
        assert!(p.z > -1.0 && p.z < 1.0);
    }
}
