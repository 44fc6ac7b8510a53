//! Procedural model matrices.
//!
//! Every transform is composed as translate · scale · rotate, so a vertex is
//! rotated first, then scaled, then moved into place.

mod orbit;
mod scatter;

pub use orbit::OrbitingBody;
pub use scatter::{Drift, ScatterField, SeedPolicy};

use glam::{Mat4, Vec3};

/// Axis shared by the random tumble of every scattered instance.
pub const TUMBLE_AXIS: Vec3 = Vec3::new(0.4, 0.6, 0.8);

/// translate(position) · scale(scale) · rotate(angle, axis).
///
/// `axis` need not be normalized.
pub fn compose(position: Vec3, scale: Vec3, angle_radians: f32, axis: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_scale(scale)
        * Mat4::from_axis_angle(axis.normalize(), angle_radians)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn identity_parts_give_identity() {
        let m = compose(Vec3::ZERO, Vec3::ONE, 0.0, Vec3::Y);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn scale_applies_before_translation() {
        let m = compose(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0), 0.0, Vec3::Y);
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(p, Vec3::new(12.0, 0.0, 0.0)));
    }

    #[test]
    fn rotation_applies_before_scale() {
        // Quarter turn about Y maps +X to -Z, then non-uniform scale stretches Z.
        let m = compose(
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 3.0),
            std::f32::consts::FRAC_PI_2,
            Vec3::Y,
        );
        let p = m.transform_point3(Vec3::X);
        assert!(approx(p, Vec3::new(0.0, 0.0, -3.0)), "{p:?}");
    }

    #[test]
    fn tumble_axis_is_normalized_on_use() {
        let m = compose(Vec3::ZERO, Vec3::ONE, 1.0, TUMBLE_AXIS);
        let v = m.transform_vector3(TUMBLE_AXIS);
        assert!(approx(v, TUMBLE_AXIS));
    }
}
