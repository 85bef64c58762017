use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gain returned for degenerate parameters and for heights outside a
/// profile's support.
pub const MIN_GAIN: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmplitudeProfileKind {
    Peak,
    Plateau,
    Ramp,
}

impl AmplitudeProfileKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "peak" => Some(Self::Peak),
            "plateau" => Some(Self::Plateau),
            "ramp" => Some(Self::Ramp),
            _ => None,
        }
    }
}

/// Bell-shaped response centred on `center`.
///
/// `gain = peak_gain / (1 + ((height - center) / width)^2)`, so the maximum
/// sits exactly at the centre and no term divides by the distance to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    pub center: f32,
    pub width: f32,
    #[serde(default = "default_peak_gain")]
    pub peak_gain: f32,
}

/// Flat-top response: `gain` on `[min, max]`, `baseline` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlateauParams {
    pub min: f32,
    pub max: f32,
    pub gain: f32,
    #[serde(default = "default_baseline")]
    pub baseline: f32,
}

/// Exponential response above `reference`: the gain doubles every
/// `1 / rate` units of height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampParams {
    pub reference: f32,
    pub rate: f32,
}

fn default_peak_gain() -> f32 {
    2.0
}

fn default_baseline() -> f32 {
    1.0
}

/// Maps a height coordinate to a non-negative gain factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AmplitudeProfile {
    Peak(PeakParams),
    Plateau(PlateauParams),
    Ramp(RampParams),
}

impl Default for AmplitudeProfile {
    fn default() -> Self {
        Self::Ramp(RampParams {
            reference: 0.0,
            rate: 1.0,
        })
    }
}

impl AmplitudeProfile {
    pub fn kind(&self) -> AmplitudeProfileKind {
        match self {
            Self::Peak(_) => AmplitudeProfileKind::Peak,
            Self::Plateau(_) => AmplitudeProfileKind::Plateau,
            Self::Ramp(_) => AmplitudeProfileKind::Ramp,
        }
    }

    /// Gain at `height`. Never negative and never NaN.
    pub fn gain(&self, height: f32) -> f32 {
        if height.is_nan() {
            return MIN_GAIN;
        }
        let gain = match self {
            Self::Peak(params) => peak(height, params),
            Self::Plateau(params) => plateau(height, params),
            Self::Ramp(params) => ramp(height, params),
        };
        if gain.is_nan() {
            MIN_GAIN
        } else {
            gain.max(MIN_GAIN)
        }
    }

    /// Rejects parameters that are not finite.
    ///
    /// Degenerate but finite values (zero width, inverted bands) are
    /// accepted; [`AmplitudeProfile::gain`] resolves them to fixed values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Peak(params) => {
                ConfigError::check_finite("peak.center", params.center)?;
                ConfigError::check_finite("peak.width", params.width)?;
                ConfigError::check_non_negative("peak.peak_gain", params.peak_gain)
            }
            Self::Plateau(params) => {
                ConfigError::check_finite("plateau.min", params.min)?;
                ConfigError::check_finite("plateau.max", params.max)?;
                ConfigError::check_non_negative("plateau.gain", params.gain)?;
                ConfigError::check_non_negative("plateau.baseline", params.baseline)
            }
            Self::Ramp(params) => {
                ConfigError::check_finite("ramp.reference", params.reference)?;
                ConfigError::check_finite("ramp.rate", params.rate)
            }
        }
    }
}

/// Free-function form of [`AmplitudeProfile::gain`].
pub fn gain(height: f32, profile: &AmplitudeProfile) -> f32 {
    profile.gain(height)
}

fn peak(height: f32, params: &PeakParams) -> f32 {
    if !(params.width.is_finite() && params.width > 0.0) {
        return MIN_GAIN;
    }
    let distance = (height - params.center) / params.width;
    params.peak_gain / (1.0 + distance * distance)
}

fn plateau(height: f32, params: &PlateauParams) -> f32 {
    if params.min <= height && height <= params.max {
        params.gain
    } else {
        params.baseline
    }
}

fn ramp(height: f32, params: &RampParams) -> f32 {
    if height <= params.reference {
        return MIN_GAIN;
    }
    ((height - params.reference) * params.rate).exp2()
}
