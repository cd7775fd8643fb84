//! tremor application library
//!
//! Configuration, input mapping and frame-loop systems shared by the binary
//! and its integration tests.

pub mod config;
pub mod input;
pub mod systems;
