//! Hand-driven procedural effects.
//!
//! A tracked palm drives two effects on scene objects: a vibration whose
//! amplitude follows the palm height through an amplitude profile, and a
//! region toggle that swaps an object between its captured look and an
//! inverted one while the palm is inside a box. Tracking hardware and
//! rendering stay outside the crate; they are reached through
//! [`HandSignal`] and [`SceneGraph`] so everything here runs headless.

pub mod app;
pub mod data_model;
pub mod error;
pub mod hand;
pub mod noise;
pub mod profile;
pub mod region;
pub mod scene;
pub mod vibration;
pub mod waveform;

pub use app::{print_final_state, EffectRuntime, TickReport};
pub use data_model::{DataModel, SceneGraph};
pub use error::{ConfigError, RegionError};
pub use hand::{
    select_hand, Chirality, HandSample, HandSignal, HandState, TrackedHand, TrackingSpace,
};
pub use noise::PerlinNoise;
pub use profile::{
    gain, AmplitudeProfile, AmplitudeProfileKind, PeakParams, PlateauParams, RampParams,
};
pub use region::{InvertedPalette, RegionBounds, RegionToggle, ToggleState, VisualConfiguration};
pub use scene::{Scene, SceneObject};
pub use vibration::{Axis, EffectState, Smoothing, VibrationConfig, VibrationEffect, VibrationState};
pub use waveform::{WaveformGenerator, WaveformKind, WaveformParams};
