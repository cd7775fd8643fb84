//! Ground shaking disturbance
//!
//! The displacement is a deterministic sum of sinusoids, so any frame can be
//! reproduced from elapsed time alone. Ground velocity comes from the finite
//! difference of two consecutive samples.

use serde::{Deserialize, Serialize};
use tremor_math::Vec3;

/// Frequency ratio of the vertical and depth components to the lateral one
const CROSS_RATIO: f64 = 1.1;

/// Phase offset of the vertical component (radians)
const VERTICAL_PHASE: f64 = 0.5;

/// Live-tunable shaking parameters, never negative
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuakeParams {
    amplitude: f32,
    frequency: f32,
}

impl Default for QuakeParams {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            frequency: 10.0,
        }
    }
}

impl QuakeParams {
    /// Create parameters; negative values are clamped to zero
    pub fn new(amplitude: f32, frequency: f32) -> Self {
        let mut params = Self::default();
        params.set_amplitude(amplitude);
        params.set_frequency(frequency);
        params
    }

    /// Peak displacement in world units
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Angular frequency in radians per second
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set the amplitude, clamped to non-negative (NaN becomes zero)
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.max(0.0);
    }

    /// Set the frequency, clamped to non-negative (NaN becomes zero)
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.max(0.0);
    }

    pub fn increase_amplitude(&mut self, step: f32) {
        self.set_amplitude(self.amplitude + step);
    }

    pub fn decrease_amplitude(&mut self, step: f32) {
        self.set_amplitude(self.amplitude - step);
    }

    pub fn increase_frequency(&mut self, step: f32) {
        self.set_frequency(self.frequency + step);
    }

    pub fn decrease_frequency(&mut self, step: f32) {
        self.set_frequency(self.frequency - step);
    }
}

/// Disturbance generator
#[derive(Clone, Debug, PartialEq)]
pub struct Quake {
    /// Shaking parameters
    pub params: QuakeParams,
    enabled: bool,
}

impl Default for Quake {
    fn default() -> Self {
        Self::new(QuakeParams::default())
    }
}

impl Quake {
    /// Create an enabled generator
    pub fn new(params: QuakeParams) -> Self {
        Self { params, enabled: true }
    }

    /// Whether the ground is shaking
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn the shaking on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the enabled flag and return the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Ground displacement at elapsed time `t` (seconds)
    ///
    /// `A · (sin(F t), sin(1.1 F t + 0.5), sin(1.1 F t))`, or zero while disabled.
    /// The phase is computed in `f64` so long runs keep their timing.
    pub fn displacement(&self, t: f64) -> Vec3 {
        if !self.enabled {
            return Vec3::ZERO;
        }

        let QuakeParams { amplitude, frequency } = self.params;
        let phase = f64::from(frequency) * t;
        let cross = CROSS_RATIO * phase;

        Vec3::new(
            phase.sin() as f32,
            (cross + VERTICAL_PHASE).sin() as f32,
            cross.sin() as f32,
        ) * amplitude
    }

    /// Finite-difference ground velocity between two samples `dt` apart
    ///
    /// A non-positive `dt` yields zero rather than a division by zero.
    pub fn velocity(previous: Vec3, current: Vec3, dt: f32) -> Vec3 {
        if dt <= 0.0 {
            return Vec3::ZERO;
        }
        (current - previous) / dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = QuakeParams::default();
        assert_eq!(params.amplitude(), 0.3);
        assert_eq!(params.frequency(), 10.0);
    }

    #[test]
    fn test_params_never_negative() {
        let mut params = QuakeParams::new(-1.0, -5.0);
        assert_eq!(params.amplitude(), 0.0);
        assert_eq!(params.frequency(), 0.0);

        params.decrease_amplitude(0.5);
        params.decrease_frequency(0.5);
        assert_eq!(params.amplitude(), 0.0);
        assert_eq!(params.frequency(), 0.0);

        params.increase_amplitude(0.25);
        params.increase_frequency(2.0);
        assert_eq!(params.amplitude(), 0.25);
        assert_eq!(params.frequency(), 2.0);

        params.set_amplitude(f32::NAN);
        assert_eq!(params.amplitude(), 0.0);
    }

    #[test]
    fn test_displacement_is_deterministic() {
        let quake = Quake::default();
        for i in 0..50 {
            let t = i as f64 * 0.017;
            assert_eq!(quake.displacement(t), quake.displacement(t));
        }
    }

    #[test]
    fn test_displacement_formula() {
        let quake = Quake::new(QuakeParams::new(2.0, 3.0));
        let t = 0.4_f32;
        let d = quake.displacement(f64::from(t));
        assert!((d.x - 2.0 * (3.0 * t).sin()).abs() < 1e-6);
        assert!((d.y - 2.0 * (1.1 * 3.0 * t + 0.5).sin()).abs() < 1e-5);
        assert!((d.z - 2.0 * (1.1 * 3.0 * t).sin()).abs() < 1e-5);
    }

    #[test]
    fn test_displacement_late_in_a_long_run() {
        // Ten hours in, the phase must still match the closed form
        let quake = Quake::new(QuakeParams::new(1.0, 10.0));
        let t = 36_000.25_f64;
        let d = quake.displacement(t);
        assert!((f64::from(d.x) - (10.0 * t).sin()).abs() < 1e-6);
        assert!((f64::from(d.z) - (11.0 * t).sin()).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_bounded_by_amplitude() {
        let quake = Quake::new(QuakeParams::new(0.7, 13.0));
        for i in 0..200 {
            let d = quake.displacement(i as f64 * 0.031);
            assert!(d.x.abs() <= 0.7 && d.y.abs() <= 0.7 && d.z.abs() <= 0.7);
        }
    }

    #[test]
    fn test_disabled_is_still() {
        let mut quake = Quake::default();
        assert!(!quake.toggle());
        assert_eq!(quake.displacement(1.234), Vec3::ZERO);
        assert!(quake.toggle());
    }

    #[test]
    fn test_zero_amplitude_is_still() {
        let quake = Quake::new(QuakeParams::new(0.0, 10.0));
        assert_eq!(quake.displacement(0.3), Vec3::ZERO);
    }

    #[test]
    fn test_velocity_finite_difference() {
        let v = Quake::velocity(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 1.0, -0.5), 0.5);
        assert_eq!(v, Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(Quake::velocity(Vec3::ZERO, Vec3::ONE, 0.0), Vec3::ZERO);
        assert_eq!(Quake::velocity(Vec3::ZERO, Vec3::ONE, -1.0), Vec3::ZERO);
    }
}
