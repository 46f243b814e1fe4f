use nalgebra as na;
use na::{vector, Matrix3, Matrix4, Vector3, Vector4};

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a point from homogenous coordinates.
/// No guard against w == 0, so the result can be inf or NaN and callers are expected to check
/// finiteness where it matters.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Upper left 3x3 block of a transform, i.e. its rotation and scale part without translation.
pub fn upper_3x3(m: &Matrix4<f32>) -> Matrix3<f32> {
    return m.fixed_slice::<3, 3>(0, 0).into_owned();
}

/// Hermite interpolation between two edges, same as GLSL smoothstep.
pub fn smoothstep(edge_0: f32, edge_1: f32, x: f32) -> f32 {
    let t = ((x - edge_0) / (edge_1 - edge_0)).clamp(0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}

/// Linear mix a * (1 - t) + b * t, same as GLSL mix.
/// t is unrestricted.
pub fn mix(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
    return a * (1.0 - t) + b * t;
}

/// Color given in 0-255 components as a float rgb vector.
pub fn rgb(r: u8, g: u8, b: u8) -> Vector3<f32> {
    return vector![r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn smoothstep_is_clamped_at_edges() {
        assert_eq!(smoothstep(0.3, 0.5, 0.1), 0.0);
        assert_eq!(smoothstep(0.3, 0.5, 0.9), 1.0);
        assert_relative_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
    }

    #[test]
    fn mix_hits_both_ends() {
        let a = vector![0.0, 0.5, 1.0];
        let b = vector![1.0, 1.0, 0.0];
        assert_relative_eq!(mix(a, b, 0.0), a);
        assert_relative_eq!(mix(a, b, 1.0), b);
    }

    #[test]
    fn homogenous_round_trip_keeps_point() {
        let p = vector![1.0, -2.0, 3.0];
        assert_relative_eq!(from_hom_point(to_hom_point(p)), p);
    }

    #[test]
    fn upper_block_drops_translation() {
        let m = Matrix4::new_translation(&vector![5.0, 6.0, 7.0]) * Matrix4::new_nonuniform_scaling(&vector![2.0, 3.0, 4.0]);
        assert_eq!(upper_3x3(&m), Matrix3::from_diagonal(&vector![2.0, 3.0, 4.0]));
    }

    #[test]
    fn zero_w_is_not_finite() {
        let p = from_hom_point(vector![1.0, 0.0, 1.0, 0.0]);
        assert!(!p.x.is_finite());
        assert!(p.y.is_nan());
    }
}
