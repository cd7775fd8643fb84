//! Simulation system
//!
//! Manages the frame loop simulation including:
//! - Delta time calculation (wall clock or fixed timestep)
//! - Live tuning actions
//! - World stepping

use std::time::Instant;

use tremor_core::{FrameReport, World};

use crate::input::InputAction;

/// Longest step taken from the wall clock
const MAX_DT: f32 = 0.25;

/// Result of a simulation update
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// What the integrator did this frame
    pub report: FrameReport,
    /// Number of models whose matrix changed
    pub dirty_models: usize,
}

/// Manages the simulation loop
pub struct SimulationSystem {
    last_frame: Instant,
    fixed_timestep: Option<f32>,
    tuning_step: f32,
}

impl SimulationSystem {
    /// Create a system driven by the wall clock
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            fixed_timestep: None,
            tuning_step: 0.1,
        }
    }

    /// Use a fixed timestep instead of the wall clock
    ///
    /// Non-positive values fall back to the wall clock.
    pub fn with_fixed_timestep(mut self, dt: Option<f32>) -> Self {
        self.fixed_timestep = dt.filter(|dt| *dt > 0.0);
        self
    }

    /// Amount one tuning key changes amplitude or frequency
    pub fn with_tuning_step(mut self, step: f32) -> Self {
        self.tuning_step = step.max(0.0);
        self
    }

    /// Seconds to advance this frame
    pub fn next_dt(&mut self) -> f32 {
        let now = Instant::now();
        let raw_dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        match self.fixed_timestep {
            Some(dt) => dt,
            // Cap dt to prevent a huge step after a stall
            None => raw_dt.min(MAX_DT),
        }
    }

    /// Run one simulation frame
    pub fn update(&mut self, world: &mut World) -> SimulationResult {
        let dt = self.next_dt();
        world.clear_dirty();
        let report = world.update(dt);
        let dirty_models = world.dirty_models().count();
        SimulationResult { report, dirty_models }
    }

    /// Apply a tuning action between frames
    ///
    /// Returns `false` when the action asks the app to exit.
    pub fn apply_action(&self, world: &mut World, action: InputAction) -> bool {
        let step = self.tuning_step;
        match action {
            InputAction::IncreaseAmplitude => world.quake_params_mut().increase_amplitude(step),
            InputAction::DecreaseAmplitude => world.quake_params_mut().decrease_amplitude(step),
            InputAction::IncreaseFrequency => world.quake_params_mut().increase_frequency(step),
            InputAction::DecreaseFrequency => world.quake_params_mut().decrease_frequency(step),
            InputAction::ToggleQuake => {
                let enabled = world.toggle_quake();
                log::info!("quake {}", if enabled { "on" } else { "off" });
            }
            InputAction::ToggleBvh => {
                let shown = world.toggle_bvh();
                log::info!("BVH boxes {}", if shown { "shown" } else { "hidden" });
            }
            InputAction::Exit => return false,
        }

        if matches!(
            action,
            InputAction::IncreaseAmplitude
                | InputAction::DecreaseAmplitude
                | InputAction::IncreaseFrequency
                | InputAction::DecreaseFrequency
        ) {
            let params = world.integrator().quake().params;
            log::info!("quake amplitude {:.2}, frequency {:.2}", params.amplitude(), params.frequency());
        }
        true
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}
