//! Scene configuration.

use std::path::PathBuf;

use glam::Vec3;
use orrery_engine::render::mesh::{ModelSource, Procedural};

use crate::camera::CameraConfig;
use crate::transform::{Drift, OrbitingBody, ScatterField, SeedPolicy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Everything the renderer needs to build the scene.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Root for model/texture paths. `None` uses procedural models only.
    pub asset_dir: Option<PathBuf>,

    pub clear_color: wgpu::Color,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,

    pub sun: OrbitingBody,
    pub planets: [OrbitingBody; 8],

    pub asteroids: ScatterField,
    pub asteroid_model: ModelSource,

    pub stars: ScatterField,
    pub star_model: ModelSource,
}

impl SceneConfig {
    /// Resolves a model source against `asset_dir`.
    ///
    /// Without an asset directory, file paths are dropped so the procedural
    /// fallback is used without warnings.
    pub fn model_source(&self, source: &ModelSource) -> ModelSource {
        match self.asset_dir.as_deref() {
            Some(dir) => source.clone().resolved_in(dir),
            None => ModelSource {
                path: None,
                texture: None,
                ..source.clone()
            },
        }
    }
}

/// (name, directory, radius, scale, spin deg/s, orbital speed, tint)
type PlanetRow = (&'static str, &'static str, f32, [f32; 3], f32, f32, [u8; 4]);

const PLANETS: [PlanetRow; 8] = [
    ("mercury", "mer", 60.0, [0.8, 0.8, 0.8], 10.0, 0.2, [153, 138, 117, 255]),
    ("venus", "venus", 75.0, [1.8, 1.8, 1.8], 90.0, 0.3, [237, 214, 158, 255]),
    ("earth", "earth", 100.0, [2.0, 2.0, 2.0], 30.0, 0.5, [64, 140, 71, 255]),
    ("mars", "mars", 115.0, [1.0, 1.0, 0.5], 10.0, 0.6, [199, 107, 71, 255]),
    ("jupiter", "jupyter", 280.0, [4.0, 4.0, 4.0], 10.0, 0.8, [219, 189, 148, 255]),
    ("saturn", "saturn", 495.0, [3.5, 3.5, 3.5], 10.0, 0.9, [235, 219, 184, 255]),
    ("uranus", "uranus", 980.0, [2.0, 2.0, 2.0], 10.0, 1.1, [143, 214, 224, 255]),
    ("neptune", "neptune", 1525.0, [1.9, 1.9, 1.9], 10.0, 1.2, [26, 92, 204, 255]),
];

const PLANET_HEIGHT: f32 = 0.4;

fn asset(dir: &str, file: &str) -> Option<PathBuf> {
    Some(PathBuf::from("objects").join(dir).join(file))
}

fn model(dir: &str, file: &str, fallback: Procedural, tint: [u8; 4]) -> ModelSource {
    ModelSource {
        path: asset(dir, file),
        texture: asset(dir, "diffuse.png"),
        fallback,
        tint,
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        let planets = PLANETS.map(|(name, dir, radius, scale, spin, speed, tint)| OrbitingBody {
            name: name.to_string(),
            orbital_radius: radius,
            height: PLANET_HEIGHT,
            scale: Vec3::from_array(scale),
            spin_degrees_per_sec: spin,
            orbital_speed: speed,
            model: model(dir, "planet.glb", Procedural::Sphere, tint),
        });

        Self {
            asset_dir: None,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),

            sun: OrbitingBody {
                name: "sun".to_string(),
                orbital_radius: 0.0,
                height: 0.0,
                scale: Vec3::splat(7.0),
                spin_degrees_per_sec: 10.0,
                orbital_speed: 0.0,
                model: model("sun", "planet.glb", Procedural::Sphere, [255, 190, 90, 255]),
            },
            planets,

            asteroids: ScatterField {
                instance_count: 3000,
                field_radius: 150.0,
                jitter_offset: 2.5,
                height_jitter_scale: 2.0,
                drift: Drift::Differential { rate: 0.001 },
                seed: SeedPolicy::WholeSeconds,
            },
            asteroid_model: model("rock", "rock.glb", Procedural::Rock, [110, 104, 98, 255]),

            stars: ScatterField {
                instance_count: 3000,
                field_radius: 300.0,
                jitter_offset: 2.5,
                height_jitter_scale: 200.0,
                drift: Drift::None,
                seed: SeedPolicy::Fixed(0x5eed),
            },
            star_model: model("star", "planet.glb", Procedural::Sphere, [255, 250, 230, 255]),
        }
    }
}
