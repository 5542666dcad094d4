//! Teapot demo application
//!
//! Builds a small scene on the headless backend: a camera and one spinning
//! model, loaded from the OBJ file given on the command line or the built-in
//! cube otherwise. Runs a fixed number of frames and logs what happened.
//!
//! Usage: `teapot [model.obj]`. Settings are read from `teapot.toml` when
//! present.

use std::path::Path;

use ecs_engine::prelude::*;
use thiserror::Error;

const FRAME_COUNT: u32 = 120;
const FRAME_TIME: f32 = 1.0 / 60.0;
const CONFIG_PATH: &str = "teapot.toml";

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ecs_engine::config::ConfigError),
}

/// Turns the sibling transform about +Y
struct Spin {
    radians_per_second: f32,
}

impl Lifecycle for Spin {
    fn awake(&mut self, ctx: &mut HookContext<'_>) {
        log::info!("Spin attached to '{}'", ctx.entity_name());
    }

    fn update(&mut self, ctx: &mut HookContext<'_>) {
        let angle = self.radians_per_second * ctx.delta_time();
        if let Some(transform) = ctx.sibling_mut::<TransformComponent>() {
            transform.rotate_by(Vec3::y(), angle);
        }
    }
}

impl Behaviour for Spin {
    fn name(&self) -> &str {
        "spin"
    }
}

fn load_config() -> Result<EngineConfig, AppError> {
    if Path::new(CONFIG_PATH).exists() {
        Ok(EngineConfig::load_from_file(CONFIG_PATH)?)
    } else {
        Ok(EngineConfig::default())
    }
}

fn main() -> Result<(), AppError> {
    let config = load_config()?;
    ecs_engine::foundation::logging::init(&config);
    log::info!("Starting teapot demo...");

    let mut engine = Engine::new(config, HeadlessBackend::new())?;

    let camera = engine.create_camera("Camera", Vec3::new(0.0, 1.0, -5.0))?;
    if let Some(camera) = engine.registry_mut().get_component_mut::<CameraComponent>(camera) {
        camera.look_at(Vec3::zeros());
    }

    let teapot = match std::env::args().nth(1) {
        Some(path) => engine.load_model(&ObjProvider::new(), &path, Vec3::zeros())?,
        None => {
            log::info!("No model given, using the built-in cube");
            engine.spawn_model("Teapot", Model::cube(), Vec3::zeros())?
        }
    };
    engine
        .registry_mut()
        .add_component(teapot, BehaviourComponent::new(Spin { radians_per_second: 1.0 }))
        .map_err(EngineError::from)?;
    engine.awake();

    for frame in 1..=FRAME_COUNT {
        let stats = engine.run_frame(FRAME_TIME);
        if frame % 30 == 0 {
            log::info!(
                "Frame {}: {} draws, {} skipped, {} components updated, {}us",
                stats.frame,
                stats.draw_calls,
                stats.sub_meshes_skipped,
                stats.components_updated,
                stats.total_frame_time_us()
            );
        }
    }

    if let Ok(report) = engine.registry().inspect(teapot) {
        log::info!("Final state:\n{}", report);
    }

    let released = engine.shutdown();
    let backend = engine.backend().stats();
    log::info!(
        "Done: {} frames presented, {} draws, {} renderers released, {} programs still live",
        backend.frames_presented,
        backend.draws,
        released,
        engine.backend().live_programs().len()
    );
    Ok(())
}
