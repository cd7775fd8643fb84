//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tremor::config::AppConfig;
use tremor_core::World;

fn temp_config_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tremor_config_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_default_file_matches_defaults() {
    std::env::remove_var("TREMOR_QUAKE__AMPLITUDE");
    let config = AppConfig::load().unwrap();
    let defaults = AppConfig::default();

    assert_eq!(config.to_physics_config(), defaults.to_physics_config());
    assert_eq!(config.to_quake_params(), defaults.to_quake_params());
    assert_eq!(config.scene.path, defaults.scene.path);
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("TREMOR_QUAKE__AMPLITUDE", "0.75");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("TREMOR_QUAKE__AMPLITUDE");

    assert_eq!(config.quake.amplitude, 0.75);
    assert_eq!(config.to_quake_params().amplitude(), 0.75);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = temp_config_dir("user");
    fs::write(dir.join("default.toml"), "[physics]\ngravity = -9.81\nfriction = 0.8\n").unwrap();
    fs::write(dir.join("user.toml"), "[physics]\nfriction = 0.3\n\n[simulation]\nframe_limit = 10\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.physics.friction, 0.3);
    assert_eq!(config.physics.gravity, -9.81);
    assert_eq!(config.simulation.frame_limit, Some(10));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("no/such/config/dir").unwrap();
    assert_eq!(config.quake.step, 0.1);
    assert_eq!(config.simulation.log_interval, 120);
}

#[test]
#[serial]
fn test_bad_value_is_an_error() {
    let dir = temp_config_dir("bad");
    fs::write(dir.join("default.toml"), "[quake]\namplitude = \"loud\"\n").unwrap();

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn test_configured_scene_loads() {
    let config = AppConfig::load().unwrap();
    let mut world = World::load(&config.scene.path, config.to_physics_config(), config.to_quake_params())
        .expect("bundled scene should load");

    assert!(world.model("room").is_some());
    assert!(world.models().len() > 1);

    for _ in 0..30 {
        world.update(1.0 / 60.0);
    }
    assert_eq!(world.render_snapshot().models.len(), world.models().len());
}

#[test]
#[serial]
fn test_bundled_bulb_mesh_builds_a_hierarchy() {
    let config = AppConfig::load().unwrap();
    let mut world = World::load(&config.scene.path, config.to_physics_config(), config.to_quake_params()).unwrap();

    let bulb = world.body("bulb").expect("bulb model");
    let meshes = bulb.shape().meshes();
    assert_eq!(meshes.len(), 2);
    assert!(meshes.iter().any(|m| m.bvh.leaf_count() > 1));

    world.set_show_bvh(true);
    world.update(1.0 / 60.0);
    let snapshot = world.render_snapshot();
    let bulb = snapshot.models.iter().find(|m| m.name == "bulb").unwrap();
    assert!(bulb.bvh_boxes.len() > 2);
}
