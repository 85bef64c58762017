use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use log::{debug, warn};

use crate::data_model::{DataModel, SceneGraph};
use crate::error::RegionError;
use crate::hand::{HandSample, HandSignal};
use crate::region::{InvertedPalette, RegionToggle, ToggleState};
use crate::scene::Scene;
use crate::vibration::{VibrationConfig, VibrationEffect};
use crate::waveform::WaveformGenerator;

struct AttachedVibration {
    target: String,
    effect: VibrationEffect,
    missing: bool,
}

struct AttachedToggle {
    target: String,
    region: Option<String>,
    palette: InvertedPalette,
    // None until the target's normal look has been captured.
    toggle: Option<RegionToggle>,
    last_error: Option<RegionError>,
}

impl AttachedToggle {
    fn state(&self) -> ToggleState {
        self.toggle
            .as_ref()
            .map_or(ToggleState::Normal, RegionToggle::state)
    }
}

/// Result of one [`EffectRuntime::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub sample: HandSample,
    pub toggles: Vec<ToggleState>,
    pub errors: Vec<RegionError>,
}

/// Drives every attached effect from a single hand sample per tick.
///
/// The hand signal is injected at construction; effects never look it up
/// themselves.
pub struct EffectRuntime<G: SceneGraph = DataModel> {
    signal: Arc<dyn HandSignal>,
    scene: G,
    vibrations: Vec<AttachedVibration>,
    toggles: Vec<AttachedToggle>,
}

impl<G: SceneGraph> EffectRuntime<G> {
    pub fn new(signal: Arc<dyn HandSignal>, scene: G) -> Self {
        Self {
            signal,
            scene,
            vibrations: Vec::new(),
            toggles: Vec::new(),
        }
    }

    pub fn scene(&self) -> &G {
        &self.scene
    }

    /// Attaches a vibration, capturing the target's current position as its
    /// rest point. `seed` makes the random waveforms reproducible.
    pub fn attach_vibration(
        &mut self,
        target: &str,
        config: VibrationConfig,
        seed: Option<u64>,
    ) -> Result<()> {
        let resting = self
            .scene
            .position(target)
            .ok_or_else(|| anyhow!("vibration target `{target}` does not exist"))?;
        let generator = match seed {
            Some(seed) => WaveformGenerator::with_seed(seed),
            None => WaveformGenerator::new(),
        };
        let effect = VibrationEffect::with_generator(resting, config, generator)
            .with_context(|| format!("vibration on `{target}`"))?;
        debug!("attached vibration to {target} at {resting}");
        self.vibrations.push(AttachedVibration {
            target: target.to_string(),
            effect,
            missing: false,
        });
        Ok(())
    }

    /// Attaches a region toggle to `target`, capturing its current look.
    ///
    /// Neither the target nor the region has to exist yet. Until both do,
    /// the toggle stays normal and each tick reports what is missing. The
    /// target's look is captured on the first tick it is found, and region
    /// bounds are re-read from the scene every tick.
    pub fn attach_toggle(
        &mut self,
        target: &str,
        region: Option<&str>,
        palette: &InvertedPalette,
    ) {
        let toggle = self.scene.visual_configuration(target).map(|original| {
            let bounds = region.and_then(|name| self.scene.region_bounds(name));
            RegionToggle::attach(original, bounds, palette)
        });
        if toggle.is_none() {
            debug!("toggle target {target} not in scene yet");
        }
        debug!("attached toggle to {target} (region {region:?})");
        self.toggles.push(AttachedToggle {
            target: target.to_string(),
            region: region.map(str::to_string),
            palette: *palette,
            toggle,
            last_error: None,
        });
    }

    /// Samples the hand once and advances every effect by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let sample = self.signal.sample();

        for attached in &mut self.vibrations {
            let position = attached.effect.tick(&sample, dt);
            let written = self.scene.set_position(&attached.target, position);
            if !written && !attached.missing {
                warn!("vibration target {} disappeared from the scene", attached.target);
            }
            attached.missing = !written;
        }

        let mut states = Vec::with_capacity(self.toggles.len());
        let mut errors = Vec::new();
        for attached in &mut self.toggles {
            let bounds = attached
                .region
                .as_deref()
                .and_then(|name| self.scene.region_bounds(name));
            if attached.toggle.is_none() {
                attached.toggle = self
                    .scene
                    .visual_configuration(&attached.target)
                    .map(|original| RegionToggle::attach(original, bounds, &attached.palette));
            }
            let error = match &mut attached.toggle {
                None => Some(RegionError::MissingTarget(attached.target.clone())),
                Some(toggle) => {
                    toggle.set_region(bounds);
                    let mut error = toggle.tick(&sample).err().map(|err| match err {
                        RegionError::NoRegion => match &attached.region {
                            Some(name) => RegionError::MissingRegionObject(name.clone()),
                            None => RegionError::NoRegion,
                        },
                        other => other,
                    });
                    if !self
                        .scene
                        .set_visual_configuration(&attached.target, toggle.configuration())
                    {
                        error = Some(RegionError::MissingTarget(attached.target.clone()));
                    }
                    error
                }
            };
            if error != attached.last_error {
                match &error {
                    Some(err) => warn!("toggle on {}: {err}", attached.target),
                    None => debug!("toggle on {} recovered", attached.target),
                }
                attached.last_error = error.clone();
            }
            states.push(attached.state());
            errors.extend(error);
        }

        TickReport {
            sample,
            toggles: states,
            errors,
        }
    }

    /// Current output of each vibration, keyed by target.
    pub fn vibration_outputs(&self) -> Vec<(&str, Vec3)> {
        self.vibrations
            .iter()
            .map(|attached| (attached.target.as_str(), attached.effect.output()))
            .collect()
    }

    /// Current state of each toggle, keyed by target.
    pub fn toggle_states(&self) -> Vec<(&str, ToggleState)> {
        self.toggles
            .iter()
            .map(|attached| (attached.target.as_str(), attached.state()))
            .collect()
    }
}

impl EffectRuntime<DataModel> {
    /// Builds a runtime over `model` with every effect the scene declares.
    ///
    /// `seed` overrides the per-effect seeds; each effect still gets its own
    /// stream.
    pub fn from_scene(
        scene: &Scene,
        model: DataModel,
        signal: Arc<dyn HandSignal>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut runtime = Self::new(signal, model);
        for (index, decl) in scene.vibrations.iter().enumerate() {
            let seed = seed
                .map(|seed| seed.wrapping_add(index as u64))
                .or(decl.seed);
            runtime.attach_vibration(&decl.target, decl.config.clone(), seed)?;
        }
        for decl in &scene.toggles {
            runtime.attach_toggle(&decl.target, decl.region.as_deref(), &decl.palette);
        }
        Ok(runtime)
    }
}

pub fn print_final_state(model: &DataModel) {
    println!("Final object states:");
    for object in model.all_objects() {
        println!(
            " - {} pos=({:.3}, {:.3}, {:.3}) color=({:.2}, {:.2}, {:.2}) emission={}",
            object.name,
            object.position.x,
            object.position.y,
            object.position.z,
            object.color.x,
            object.color.y,
            object.color.z,
            if object.emission_enabled { "on" } else { "off" }
        );
    }
    if let Some(background) = model.background() {
        println!(
            "Background color=({:.2}, {:.2}, {:.2})",
            background.x, background.y, background.z
        );
    }
}
