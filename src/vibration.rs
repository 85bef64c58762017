use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hand::HandSample;
use crate::profile::AmplitudeProfile;
use crate::waveform::{WaveformGenerator, WaveformKind, WaveformParams};

/// World axis treated as "height" when reading the palm position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "x" | "X" => Some(Self::X),
            "y" | "Y" => Some(Self::Y),
            "z" | "Z" => Some(Self::Z),
            _ => None,
        }
    }

    pub fn component(self, value: Vec3) -> f32 {
        match self {
            Self::X => value.x,
            Self::Y => value.y,
            Self::Z => value.z,
        }
    }
}

/// How the output position reaches its per-tick target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Smoothing {
    /// Jump straight to `resting + offset`.
    #[default]
    Snap,
    /// Cover `1 - exp(-rate * dt)` of the remaining distance each tick.
    Exponential { rate: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibrationConfig {
    #[serde(default)]
    pub waveform: WaveformKind,
    #[serde(flatten)]
    pub waveform_params: WaveformParams,
    /// Amplitude at unit gain, in world units.
    #[serde(default = "default_base_amplitude")]
    pub base_amplitude: f32,
    /// Hard limit on the distance between output and resting position.
    #[serde(default = "default_amplitude_ceiling")]
    pub amplitude_ceiling: f32,
    #[serde(default)]
    pub profile: AmplitudeProfile,
    #[serde(default)]
    pub height_axis: Axis,
    /// Scale the sine frequency by the (clamped) gain as well.
    #[serde(default)]
    pub frequency_follows_gain: bool,
    #[serde(default)]
    pub smoothing: Smoothing,
}

impl Default for VibrationConfig {
    fn default() -> Self {
        Self {
            waveform: WaveformKind::default(),
            waveform_params: WaveformParams::default(),
            base_amplitude: default_base_amplitude(),
            amplitude_ceiling: default_amplitude_ceiling(),
            profile: AmplitudeProfile::default(),
            height_axis: Axis::default(),
            frequency_follows_gain: false,
            smoothing: Smoothing::default(),
        }
    }
}

fn default_base_amplitude() -> f32 {
    0.01
}

fn default_amplitude_ceiling() -> f32 {
    0.2
}

impl VibrationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("base_amplitude", self.base_amplitude)?;
        ConfigError::check_non_negative("amplitude_ceiling", self.amplitude_ceiling)?;
        ConfigError::check_non_negative("frequency", self.waveform_params.frequency)?;
        ConfigError::check_non_negative("jitter_cap", self.waveform_params.jitter_cap)?;
        ConfigError::check_non_negative("noise_cap", self.waveform_params.noise_cap)?;
        ConfigError::check_finite("noise_speed", self.waveform_params.noise_speed)?;
        if let Smoothing::Exponential { rate } = self.smoothing {
            ConfigError::check_non_negative("smoothing_rate", rate)?;
        }
        self.profile.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VibrationState {
    Idle,
    Active,
}

/// Per-instance state: the rest point and the effect clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectState {
    pub resting_local_position: Vec3,
    pub elapsed: f32,
}

/// Height-modulated vibration around a fixed resting position.
///
/// The clock only runs while a hand is tracked, so the phase picks up where
/// it left off when the hand comes back.
#[derive(Debug, Clone)]
pub struct VibrationEffect {
    config: VibrationConfig,
    state: EffectState,
    generator: WaveformGenerator,
    mode: VibrationState,
    output: Vec3,
    gain: f32,
    amplitude: f32,
}

impl VibrationEffect {
    /// Attaches to an object resting at `resting`, drawing jitter from
    /// system entropy.
    pub fn attach(resting: Vec3, config: VibrationConfig) -> Result<Self, ConfigError> {
        Self::with_generator(resting, config, WaveformGenerator::new())
    }

    /// Attaches with a reproducible random source.
    pub fn attach_seeded(
        resting: Vec3,
        config: VibrationConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_generator(resting, config, WaveformGenerator::with_seed(seed))
    }

    pub fn with_generator(
        resting: Vec3,
        config: VibrationConfig,
        generator: WaveformGenerator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: EffectState {
                resting_local_position: resting,
                elapsed: 0.0,
            },
            generator,
            mode: VibrationState::Idle,
            output: resting,
            gain: 0.0,
            amplitude: 0.0,
        })
    }

    /// Advances the effect by `dt` seconds and returns the position to write.
    pub fn tick(&mut self, sample: &HandSample, dt: f32) -> Vec3 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let resting = self.state.resting_local_position;

        if !sample.tracked {
            if self.mode != VibrationState::Idle {
                debug!("vibration idle: hand lost at t={:.3}", self.state.elapsed);
            }
            self.mode = VibrationState::Idle;
            self.gain = 0.0;
            self.amplitude = 0.0;
            self.output = resting;
            return resting;
        }

        if self.mode != VibrationState::Active {
            debug!("vibration active: hand found at t={:.3}", self.state.elapsed);
        }
        self.mode = VibrationState::Active;

        let ceiling = self.config.amplitude_ceiling;
        let height = self.config.height_axis.component(sample.position);
        self.gain = self.config.profile.gain(height);
        self.amplitude = clamp_amplitude(self.config.base_amplitude * self.gain, ceiling);

        let mut params = self.config.waveform_params;
        if self.config.frequency_follows_gain && self.config.base_amplitude > 0.0 {
            params.frequency *= self.amplitude / self.config.base_amplitude;
        }

        let offset = self
            .generator
            .generate(self.config.waveform, self.state.elapsed, &params, self.amplitude)
            .clamp_length_max(ceiling);
        let offset = if offset.is_finite() { offset } else { Vec3::ZERO };
        let target = resting + offset;

        self.output = match self.config.smoothing {
            Smoothing::Snap => target,
            Smoothing::Exponential { rate } => {
                let blend = 1.0 - (-rate * dt).exp();
                self.output.lerp(target, blend)
            }
        };
        self.state.elapsed += dt;
        self.output
    }

    pub fn state(&self) -> VibrationState {
        self.mode
    }

    pub fn effect_state(&self) -> EffectState {
        self.state
    }

    pub fn resting_position(&self) -> Vec3 {
        self.state.resting_local_position
    }

    pub fn elapsed(&self) -> f32 {
        self.state.elapsed
    }

    /// Gain computed on the last active tick (zero while idle).
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Amplitude handed to the waveform on the last active tick.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn output(&self) -> Vec3 {
        self.output
    }

    pub fn config(&self) -> &VibrationConfig {
        &self.config
    }
}

fn clamp_amplitude(raw: f32, ceiling: f32) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, ceiling)
    }
}
