//! tremor - shake a room full of rigid bodies
//!
//! Headless frame loop: loads the configured scene, ticks the world and logs
//! a summary of each render snapshot. Tuning keys are read from stdin.

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use tremor::config::AppConfig;
use tremor::systems::{ConsoleInput, SimulationResult, SimulationSystem};
use tremor_core::{RenderSnapshot, World};

/// Wall-clock pacing between frames when no fixed timestep is set
const FRAME_PACE: Duration = Duration::from_millis(16);

fn main() -> ExitCode {
    let loaded = AppConfig::load();
    let level = loaded
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let mut world = match World::load(
        &config.scene.path,
        config.to_physics_config(),
        config.to_quake_params(),
    ) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Failed to load scene '{}': {}", config.scene.path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if !config.quake.enabled {
        world.toggle_quake();
    }
    world.set_show_bvh(config.debug.show_bvh);

    let mut simulation = SimulationSystem::new()
        .with_fixed_timestep(config.simulation.fixed_timestep)
        .with_tuning_step(config.quake.step);
    let mut console = ConsoleInput::stdin();

    log::info!("keys (then Enter): + - amplitude, ] [ frequency, q quake, b BVH boxes, x exit");

    let log_interval = config.simulation.log_interval;
    let paced = config.simulation.fixed_timestep.is_none();

    'frames: loop {
        for action in console.poll() {
            if !simulation.apply_action(&mut world, action) {
                log::info!("exit requested");
                break 'frames;
            }
        }

        let result = simulation.update(&mut world);
        let snapshot = world.render_snapshot();

        if log_interval > 0 && snapshot.frame % log_interval == 0 {
            log_summary(&result, &snapshot);
        }

        if config.simulation.frame_limit.is_some_and(|limit| snapshot.frame >= limit) {
            log::info!("frame limit reached");
            break;
        }

        if paced {
            thread::sleep(FRAME_PACE);
        }
    }

    log::info!("stopped after {} frames ({:.2}s simulated)", world.frame(), world.integrator().elapsed());
    ExitCode::SUCCESS
}

fn log_summary(result: &SimulationResult, snapshot: &RenderSnapshot) {
    let report = &result.report;
    let debug_boxes: usize = snapshot.models.iter().map(|m| m.bvh_boxes.len()).sum();
    log::info!(
        "frame {} t={:.2}s: {} models ({} moved), {} room corrections, {} contacts, ground velocity {:?}",
        snapshot.frame,
        report.elapsed,
        snapshot.models.len(),
        result.dirty_models,
        report.room_corrections,
        report.contacts,
        report.ground_velocity,
    );
    if debug_boxes > 0 {
        log::info!("{} BVH boxes in snapshot", debug_boxes);
    }
    for model in &snapshot.models {
        let m = &model.matrix;
        log::debug!("  {}: origin ({:.3}, {:.3}, {:.3})", model.name, m[3][0], m[3][1], m[3][2]);
    }
}
