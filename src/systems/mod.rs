//! Application systems
//!
//! Modular systems extracted from main.rs for better organization and testability.

mod console;
mod simulation;

pub use console::ConsoleInput;
pub use simulation::{SimulationResult, SimulationSystem};
