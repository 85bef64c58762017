use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::hand::HandSample;

/// Axis-aligned box; both faces are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RegionBounds {
    /// Box spanning two opposite corners given in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box centred on `center` with full extents `size`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::from_corners(center - half, center + half)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Everything the toggle writes in one go.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualConfiguration {
    pub background_color: Vec3,
    pub object_albedo: Vec3,
    pub emission_enabled: bool,
    pub emission_color: Vec3,
}

/// Colours used while the palm is inside the region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvertedPalette {
    pub background: Vec3,
    pub albedo: Vec3,
}

impl Default for InvertedPalette {
    fn default() -> Self {
        Self {
            background: Vec3::ONE,
            albedo: Vec3::ZERO,
        }
    }
}

impl VisualConfiguration {
    /// Inverted counterpart: palette colours with emission switched off.
    ///
    /// The emission colour is carried over unchanged so that turning
    /// emission back on never needs to look anywhere but the normal
    /// configuration.
    pub fn inverted(&self, palette: &InvertedPalette) -> Self {
        Self {
            background_color: palette.background,
            object_albedo: palette.albedo,
            emission_enabled: false,
            emission_color: self.emission_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToggleState {
    #[default]
    Normal,
    Inverted,
}

/// Flips an object between its captured look and an inverted look while the
/// palm is inside a region.
///
/// There is no hysteresis: a palm sitting on a face of the region may
/// alternate states from tick to tick.
#[derive(Debug, Clone)]
pub struct RegionToggle {
    normal: VisualConfiguration,
    inverted: VisualConfiguration,
    region: Option<RegionBounds>,
    state: ToggleState,
}

impl RegionToggle {
    /// Captures `original` as the normal configuration and derives the
    /// inverted one from `palette`.
    pub fn attach(
        original: VisualConfiguration,
        region: Option<RegionBounds>,
        palette: &InvertedPalette,
    ) -> Self {
        Self {
            normal: original,
            inverted: original.inverted(palette),
            region,
            state: ToggleState::Normal,
        }
    }

    /// Re-evaluates containment for this tick.
    ///
    /// Without a region the toggle settles in [`ToggleState::Normal`] and
    /// reports [`RegionError::NoRegion`]; the configuration returned by
    /// [`RegionToggle::configuration`] is still valid to write.
    pub fn tick(&mut self, sample: &HandSample) -> Result<ToggleState, RegionError> {
        let (next, result) = match self.region {
            None => (ToggleState::Normal, Err(RegionError::NoRegion)),
            Some(bounds) if sample.tracked && bounds.contains(sample.position) => {
                (ToggleState::Inverted, Ok(ToggleState::Inverted))
            }
            Some(_) => (ToggleState::Normal, Ok(ToggleState::Normal)),
        };
        if next != self.state {
            debug!("region toggle: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        result
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Configuration matching the current state.
    pub fn configuration(&self) -> &VisualConfiguration {
        match self.state {
            ToggleState::Normal => &self.normal,
            ToggleState::Inverted => &self.inverted,
        }
    }

    pub fn normal(&self) -> &VisualConfiguration {
        &self.normal
    }

    pub fn inverted(&self) -> &VisualConfiguration {
        &self.inverted
    }

    pub fn region(&self) -> Option<&RegionBounds> {
        self.region.as_ref()
    }

    pub fn set_region(&mut self, region: Option<RegionBounds>) {
        self.region = region;
    }
}
