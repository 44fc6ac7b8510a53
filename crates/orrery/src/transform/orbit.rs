use glam::{Mat4, Vec3};
use orrery_engine::render::mesh::ModelSource;

use super::compose;

/// A body on a circular orbit around the origin that also spins about +Y.
///
/// The sun is a body with radius 0.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingBody {
    pub name: String,
    pub orbital_radius: f32,
    pub height: f32,
    pub scale: Vec3,
    pub spin_degrees_per_sec: f32,
    /// Radians per second along the orbit.
    pub orbital_speed: f32,
    pub model: ModelSource,
}

impl OrbitingBody {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let (sin, cos) = (self.orbital_speed * t).sin_cos();
        Vec3::new(sin * self.orbital_radius, self.height, cos * self.orbital_radius)
    }

    /// Model matrix at elapsed time `t` seconds. Pure in `t`.
    pub fn transform_at(&self, t: f32) -> Mat4 {
        compose(
            self.position_at(t),
            self.scale,
            t * self.spin_degrees_per_sec.to_radians(),
            Vec3::Y,
        )
    }
}
