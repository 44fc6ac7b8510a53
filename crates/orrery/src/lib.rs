//! Animated solar system: a spinning sun, eight orbiting planets, an
//! instanced asteroid belt and a static instanced star field.

pub mod app;
pub mod camera;
pub mod config;
pub mod frame;
pub mod renderer;
pub mod transform;

pub use app::SolarApp;
pub use config::SceneConfig;
