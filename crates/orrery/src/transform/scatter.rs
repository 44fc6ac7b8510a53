use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{TUMBLE_AXIS, compose};

/// How the angular slot of each instance moves over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drift {
    /// Fixed ring: instance `i` sits at `i / n` of a full turn.
    None,
    /// Angle grows as `rate · base_degrees · t`, so later instances orbit
    /// faster and the belt spreads out over time.
    Differential { rate: f32 },
}

/// Where a field's random stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPolicy {
    Fixed(u64),
    /// Elapsed time truncated to whole seconds: jitter holds for a second,
    /// then re-rolls.
    WholeSeconds,
}

impl SeedPolicy {
    pub fn seed_at(self, elapsed: f32) -> u64 {
        match self {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::WholeSeconds => elapsed.max(0.0) as u64,
        }
    }
}

/// A ring or shell of randomly jittered, scaled and tumbled instances.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterField {
    pub instance_count: u32,
    pub field_radius: f32,
    /// Jitter components are drawn from `[-jitter_offset, jitter_offset)`; the
    /// planar pair is then limited to a disc of this radius, so every instance
    /// stays within `field_radius + jitter_offset` of the origin in x/z.
    pub jitter_offset: f32,
    /// Multiplier on the vertical jitter; small values flatten the field.
    pub height_jitter_scale: f32,
    pub drift: Drift,
    pub seed: SeedPolicy,
}

impl ScatterField {
    /// Replaces the contents of `out` with `instance_count` transforms,
    /// ordered by instance index.
    pub fn generate(&self, elapsed: f32, out: &mut Vec<Mat4>) {
        out.clear();
        if self.instance_count == 0 {
            return;
        }
        out.reserve(self.instance_count as usize);

        let mut rng = StdRng::seed_from_u64(self.seed.seed_at(elapsed));
        let jitter_steps = (2.0 * self.jitter_offset * 100.0) as u32;
        let n = self.instance_count as f32;

        for i in 0..self.instance_count {
            let base_degrees = i as f32 / n * 360.0;
            let theta = match self.drift {
                Drift::None => base_degrees.to_radians(),
                Drift::Differential { rate } => rate * base_degrees * elapsed,
            };

            let jx = self.jitter(&mut rng, jitter_steps);
            let jy = self.jitter(&mut rng, jitter_steps);
            let jz = self.jitter(&mut rng, jitter_steps);
            let planar = Vec2::new(jx, jz).clamp_length_max(self.jitter_offset.max(0.0));

            let (sin, cos) = theta.sin_cos();
            let position = Vec3::new(
                sin * self.field_radius + planar.x,
                jy * self.height_jitter_scale,
                cos * self.field_radius + planar.y,
            );

            let scale = rng.gen_range(0..20u32) as f32 / 100.0 + 0.05;
            let tumble = rng.gen_range(0..360u32) as f32;

            out.push(compose(
                position,
                Vec3::splat(scale),
                tumble.to_radians(),
                TUMBLE_AXIS,
            ));
        }
    }

    /// Convenience wrapper around [`ScatterField::generate`].
    pub fn transforms(&self, elapsed: f32) -> Vec<Mat4> {
        let mut out = Vec::new();
        self.generate(elapsed, &mut out);
        out
    }

    fn jitter(&self, rng: &mut StdRng, steps: u32) -> f32 {
        if steps == 0 {
            return 0.0;
        }
        rng.gen_range(0..steps) as f32 / 100.0 - self.jitter_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn belt(count: u32) -> ScatterField {
        ScatterField {
            instance_count: count,
            field_radius: 150.0,
            jitter_offset: 2.5,
            height_jitter_scale: 2.0,
            drift: Drift::Differential { rate: 0.001 },
            seed: SeedPolicy::WholeSeconds,
        }
    }

    fn shell(count: u32) -> ScatterField {
        ScatterField {
            instance_count: count,
            field_radius: 300.0,
            jitter_offset: 2.5,
            height_jitter_scale: 200.0,
            drift: Drift::None,
            seed: SeedPolicy::Fixed(42),
        }
    }

    fn uniform_scale(m: &Mat4) -> f32 {
        m.x_axis.truncate().length()
    }

    // ── counts ────────────────────────────────────────────────────────────

    #[test]
    fn produces_exactly_instance_count() {
        for count in [0, 1, 7, 3000] {
            assert_eq!(shell(count).transforms(0.0).len(), count as usize);
            assert_eq!(belt(count).transforms(12.3).len(), count as usize);
        }
    }

    #[test]
    fn zero_instances_clears_output() {
        let mut out = vec![Mat4::IDENTITY; 4];
        belt(0).generate(5.0, &mut out);
        assert!(out.is_empty());
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn fixed_seed_is_reproducible() {
        let field = shell(500);
        assert_eq!(field.transforms(0.0), field.transforms(99.0));
    }

    #[test]
    fn different_seeds_differ() {
        let a = shell(50).transforms(0.0);
        let b = ScatterField { seed: SeedPolicy::Fixed(43), ..shell(50) }.transforms(0.0);
        assert_ne!(a, b);
    }

    #[test]
    fn whole_second_seed_truncates() {
        assert_eq!(SeedPolicy::WholeSeconds.seed_at(3.99), 3);
        assert_eq!(SeedPolicy::WholeSeconds.seed_at(-1.0), 0);
        assert_eq!(SeedPolicy::Fixed(9).seed_at(3.99), 9);
    }

    #[test]
    fn jitter_is_stable_within_a_second() {
        // No drift, so only the seed can change the output.
        let field = ScatterField { drift: Drift::None, ..belt(100) };
        assert_eq!(field.transforms(4.1), field.transforms(4.8));
        assert_ne!(field.transforms(4.8), field.transforms(5.1));
    }

    // ── bounds ────────────────────────────────────────────────────────────

    #[test]
    fn planar_distance_stays_within_radius_plus_offset() {
        let ring = ScatterField { drift: Drift::None, seed: SeedPolicy::Fixed(1), ..belt(3000) };
        for field in [ring, belt(3000), shell(3000)] {
            let limit = field.field_radius + field.jitter_offset + 1e-3;
            for m in field.transforms(37.0) {
                let r = m.w_axis.x.hypot(m.w_axis.z);
                assert!(r <= limit, "planar distance {r} > {limit}");
            }
        }
    }

    #[test]
    fn planar_distance_never_falls_inside_radius_minus_offset() {
        let field = shell(3000);
        let limit = field.field_radius - field.jitter_offset - 1e-3;
        for m in field.transforms(0.0) {
            assert!(m.w_axis.x.hypot(m.w_axis.z) >= limit);
        }
    }

    #[test]
    fn oversized_field_fails_the_frame_without_generating() {
        use orrery_engine::render::instance::{InstanceBufferError, InstanceStaging};

        let field = ScatterField { instance_count: u32::MAX, ..belt(0) };
        let mut staging = InstanceStaging::new();
        let result = staging.stage(field.instance_count, 1 << 28, |out| field.generate(0.0, out));
        assert!(matches!(result, Err(InstanceBufferError::TooLarge { .. })));
    }

    #[test]
    fn height_is_scaled_jitter() {
        let field = belt(1000);
        let limit = field.jitter_offset * field.height_jitter_scale + 1e-4;
        for m in field.transforms(2.0) {
            assert!(m.w_axis.y.abs() <= limit);
        }
    }

    #[test]
    fn scale_within_range() {
        for m in shell(3000).transforms(0.0) {
            let s = uniform_scale(&m);
            assert!((0.05 - 1e-5..0.25).contains(&s), "scale {s}");
        }
    }

    #[test]
    fn zero_offset_means_no_jitter() {
        let field = ScatterField {
            jitter_offset: 0.0,
            ..shell(8)
        };
        for (i, m) in field.transforms(0.0).iter().enumerate() {
            let theta = (i as f32 / 8.0 * 360.0).to_radians();
            assert!((m.w_axis.x - theta.sin() * 300.0).abs() < 1e-3);
            assert!((m.w_axis.z - theta.cos() * 300.0).abs() < 1e-3);
            assert_eq!(m.w_axis.y, 0.0);
        }
    }

    #[test]
    fn differential_drift_starts_collapsed() {
        // At t = 0 every instance sits at angle 0, i.e. near (0, y, radius).
        let field = belt(200);
        for m in field.transforms(0.0) {
            assert!(m.w_axis.x.abs() <= field.jitter_offset);
            assert!((m.w_axis.z - field.field_radius).abs() <= field.jitter_offset);
        }
    }
}
