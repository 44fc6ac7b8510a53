use orrery::{SceneConfig, SolarApp};
use orrery_engine::device::GpuInit;
use orrery_engine::logging::{LoggingConfig, init_logging};
use orrery_engine::window::{Runtime, RuntimeConfig};

/// Directory holding `objects/<body>/planet.glb` and friends.
const ASSETS_ENV: &str = "ORRERY_ASSETS";

fn main() {
    init_logging(LoggingConfig::default());

    let mut scene = SceneConfig::default();
    match std::env::var_os(ASSETS_ENV) {
        Some(dir) => {
            log::info!("loading assets from {}", dir.to_string_lossy());
            scene.asset_dir = Some(dir.into());
        }
        None => log::info!("{ASSETS_ENV} not set; using procedural models"),
    }

    let config = RuntimeConfig::default();
    let app = SolarApp::new(scene, config.grab_cursor);
    if let Err(e) = Runtime::run(config, GpuInit::default(), app) {
        log::error!("orrery failed: {e:#}");
        std::process::exit(1);
    }
}
