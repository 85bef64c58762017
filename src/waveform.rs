use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::noise::PerlinNoise;

/// Per-axis phase offsets (radians) for the sine waveform.
const SINE_AXIS_PHASES: [f32; 3] = [0.0, 2.0, 4.0];

/// Fixed noise rows sampled for the x, y and z axes.
const NOISE_AXIS_ROWS: [f32; 3] = [1.0, 10.0, 100.0];

/// Oscillation applied to the resting position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WaveformKind {
    None,
    #[default]
    Sine,
    RandomJitter,
    PerlinNoise,
}

impl WaveformKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "sine" | "sin" => Some(Self::Sine),
            "random" | "jitter" | "random-jitter" => Some(Self::RandomJitter),
            "perlin" | "noise" | "perlin-noise" => Some(Self::PerlinNoise),
            _ => None,
        }
    }
}

/// Waveform settings that do not depend on the hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformParams {
    /// Sine frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Largest radius the random jitter may reach.
    #[serde(default = "default_jitter_cap")]
    pub jitter_cap: f32,
    /// Largest per-axis offset the noise waveform may reach.
    #[serde(default = "default_noise_cap")]
    pub noise_cap: f32,
    /// Rate at which the noise coordinate advances per second.
    #[serde(default = "default_noise_speed")]
    pub noise_speed: f32,
}

impl Default for WaveformParams {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            jitter_cap: default_jitter_cap(),
            noise_cap: default_noise_cap(),
            noise_speed: default_noise_speed(),
        }
    }
}

fn default_frequency() -> f32 {
    5.0
}

fn default_jitter_cap() -> f32 {
    0.02
}

fn default_noise_cap() -> f32 {
    0.05
}

fn default_noise_speed() -> f32 {
    1.0
}

/// Produces offset vectors for each waveform kind.
///
/// The generator owns the random source used by [`WaveformKind::RandomJitter`]
/// and the noise field used by [`WaveformKind::PerlinNoise`]; it keeps no
/// clock of its own.
#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    rng: StdRng,
    noise: PerlinNoise,
}

impl WaveformGenerator {
    /// Generator seeded from system entropy.
    pub fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        let noise = PerlinNoise::new(rng.gen());
        Self { rng, noise }
    }

    /// Reproducible generator.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: PerlinNoise::new(seed),
        }
    }

    /// Offset for `elapsed` seconds at the given amplitude.
    ///
    /// Returns the zero vector for [`WaveformKind::None`] and for any
    /// amplitude that is not strictly positive.
    pub fn generate(
        &mut self,
        kind: WaveformKind,
        elapsed: f32,
        params: &WaveformParams,
        amplitude: f32,
    ) -> Vec3 {
        if kind == WaveformKind::None || amplitude.is_nan() || amplitude <= 0.0 {
            return Vec3::ZERO;
        }
        match kind {
            WaveformKind::None => Vec3::ZERO,
            WaveformKind::Sine => sine(elapsed, params.frequency, amplitude),
            WaveformKind::RandomJitter => {
                let radius = amplitude.min(params.jitter_cap).max(0.0);
                self.point_in_unit_sphere() * radius
            }
            WaveformKind::PerlinNoise => {
                let scale = amplitude.min(params.noise_cap).max(0.0) * 2.0;
                let t = elapsed * params.noise_speed;
                Vec3::from_array(NOISE_AXIS_ROWS.map(|row| self.noise.sample(row, t) - 0.5))
                    * scale
            }
        }
    }

    fn point_in_unit_sphere(&mut self) -> Vec3 {
        loop {
            let candidate = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if candidate.length_squared() <= 1.0 {
                return candidate;
            }
        }
    }
}

impl Default for WaveformGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn sine(elapsed: f32, frequency: f32, amplitude: f32) -> Vec3 {
    let phase = elapsed * frequency * TAU;
    Vec3::from_array(SINE_AXIS_PHASES.map(|offset| (phase + offset).sin())) * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_non_positive_amplitude_are_silent() {
        let mut generator = WaveformGenerator::with_seed(1);
        let params = WaveformParams::default();
        for kind in [
            WaveformKind::Sine,
            WaveformKind::RandomJitter,
            WaveformKind::PerlinNoise,
        ] {
            assert_eq!(generator.generate(kind, 0.3, &params, 0.0), Vec3::ZERO);
            assert_eq!(generator.generate(kind, 0.3, &params, -1.0), Vec3::ZERO);
            assert_eq!(generator.generate(kind, 0.3, &params, f32::NAN), Vec3::ZERO);
        }
        assert_eq!(
            generator.generate(WaveformKind::None, 0.3, &params, 1.0),
            Vec3::ZERO
        );
    }

    #[test]
    fn sine_repeats_every_period() {
        let mut generator = WaveformGenerator::with_seed(1);
        let params = WaveformParams {
            frequency: 5.0,
            ..WaveformParams::default()
        };
        for i in 0..20 {
            let t = i as f32 * 0.013;
            let a = generator.generate(WaveformKind::Sine, t, &params, 0.5);
            let b = generator.generate(WaveformKind::Sine, t + 1.0 / 5.0, &params, 0.5);
            assert!((a - b).abs().max_element() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn sine_axes_are_phase_shifted() {
        let mut generator = WaveformGenerator::with_seed(1);
        let params = WaveformParams::default();
        let offset = generator.generate(WaveformKind::Sine, 0.0, &params, 1.0);
        assert_eq!(offset.x, 0.0);
        assert!((offset.y - 2.0f32.sin()).abs() < 1e-6);
        assert!((offset.z - 4.0f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn jitter_stays_inside_capped_sphere() {
        let mut generator = WaveformGenerator::with_seed(9);
        let params = WaveformParams {
            jitter_cap: 0.02,
            ..WaveformParams::default()
        };
        for amplitude in [0.005f32, 0.02, 0.5] {
            let radius = amplitude.min(params.jitter_cap);
            for _ in 0..500 {
                let offset = generator.generate(WaveformKind::RandomJitter, 0.0, &params, amplitude);
                assert!(offset.length() <= radius + 1e-7);
            }
        }
    }

    #[test]
    fn noise_axes_stay_within_cap() {
        let mut generator = WaveformGenerator::with_seed(4);
        let params = WaveformParams {
            noise_cap: 0.05,
            noise_speed: 3.0,
            ..WaveformParams::default()
        };
        for amplitude in [0.01f32, 0.05, 2.0] {
            let bound = amplitude.min(params.noise_cap);
            for i in 0..500 {
                let offset = generator.generate(
                    WaveformKind::PerlinNoise,
                    i as f32 * 0.021,
                    &params,
                    amplitude,
                );
                assert!(offset.abs().max_element() <= bound + 1e-7);
            }
        }
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let params = WaveformParams::default();
        let mut a = WaveformGenerator::with_seed(77);
        let mut b = WaveformGenerator::with_seed(77);
        for _ in 0..10 {
            assert_eq!(
                a.generate(WaveformKind::RandomJitter, 0.0, &params, 0.01),
                b.generate(WaveformKind::RandomJitter, 0.0, &params, 0.01)
            );
        }
    }

    #[test]
    fn waveform_names() {
        assert_eq!(WaveformKind::from_name("Perlin"), Some(WaveformKind::PerlinNoise));
        assert_eq!(WaveformKind::from_name("jitter"), Some(WaveformKind::RandomJitter));
        assert_eq!(WaveformKind::from_name("square"), None);
    }
}
