use anyhow::{anyhow, bail, Context, Result};
use glam::{Affine3A, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::hand::{Chirality, TrackedHand, TrackingSpace};
use crate::profile::{AmplitudeProfile, AmplitudeProfileKind, PeakParams, PlateauParams, RampParams};
use crate::region::InvertedPalette;
use crate::vibration::{Axis, Smoothing, VibrationConfig};
use crate::waveform::WaveformKind;

/// Scene document: objects, the effects attached to them and an optional
/// recorded hand track.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub vibrations: Vec<VibrationDecl>,
    pub toggles: Vec<ToggleDecl>,
    pub hand: HandDecl,
    /// One entry per tick; an empty frame means no hand was seen.
    pub track: Vec<Vec<TrackedHand>>,
}

impl Scene {
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        let mut scene = Scene::default();

        for node in root.children().filter(|n| n.has_tag_name("object")) {
            scene.objects.push(parse_object(&node)?);
        }
        for node in root.children().filter(|n| n.has_tag_name("vibration")) {
            scene.vibrations.push(parse_vibration(&node)?);
        }
        for node in root.children().filter(|n| n.has_tag_name("toggle")) {
            scene.toggles.push(parse_toggle(&node)?);
        }
        if let Some(node) = root.children().find(|n| n.has_tag_name("hand")) {
            scene.hand = parse_hand(&node)?;
        }
        if let Some(node) = root.children().find(|n| n.has_tag_name("track")) {
            scene.track = parse_track(&node)?;
        }

        Ok(scene)
    }
}

/// Scene object as described by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default)]
    pub emission_enabled: bool,
    #[serde(default)]
    pub emission_color: Vec3,
    /// Clear colour; only meaningful for cameras.
    #[serde(default)]
    pub background: Vec3,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            position: Vec3::ZERO,
            scale: default_scale(),
            color: default_color(),
            emission_enabled: false,
            emission_color: Vec3::ZERO,
            background: Vec3::ZERO,
        }
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, PartialEq)]
pub struct VibrationDecl {
    pub target: String,
    pub seed: Option<u64>,
    pub config: VibrationConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleDecl {
    pub target: String,
    pub region: Option<String>,
    pub palette: InvertedPalette,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandDecl {
    pub preference: Chirality,
    pub space: TrackingSpace,
}

fn parse_object(node: &Node<'_, '_>) -> Result<SceneObject> {
    let mut object = SceneObject::default();
    object.name = required_text(node, "name")?;
    object.object_type = optional_text(node, "type").unwrap_or_else(|| "mesh".to_string());
    object.position = parse_vec3(optional_text(node, "position"), object.position)?;
    object.scale = parse_vec3(optional_text(node, "scale"), object.scale)?;
    object.color = parse_color(optional_text(node, "color"), object.color)?;
    if let Some(emission) = optional_text(node, "emission") {
        object.emission_enabled = true;
        object.emission_color = parse_color(Some(emission), object.emission_color)?;
    }
    object.background = parse_color(optional_text(node, "background"), object.background)?;
    Ok(object)
}

fn parse_vibration(node: &Node<'_, '_>) -> Result<VibrationDecl> {
    let target = required_attribute(node, "target")?;
    let seed = node
        .attribute("seed")
        .map(|seed| seed.trim().parse::<u64>())
        .transpose()
        .with_context(|| format!("invalid seed on vibration for {target}"))?;

    let mut config = VibrationConfig::default();
    if let Some(name) = optional_text(node, "waveform") {
        config.waveform =
            WaveformKind::from_name(&name).ok_or_else(|| anyhow!("unknown waveform `{name}`"))?;
    }
    let params = &mut config.waveform_params;
    params.frequency = parse_f32(optional_text(node, "frequency"), params.frequency)?;
    params.jitter_cap = parse_f32(optional_text(node, "jitter-cap"), params.jitter_cap)?;
    params.noise_cap = parse_f32(optional_text(node, "noise-cap"), params.noise_cap)?;
    params.noise_speed = parse_f32(optional_text(node, "noise-speed"), params.noise_speed)?;
    config.base_amplitude = parse_f32(optional_text(node, "amplitude"), config.base_amplitude)?;
    config.amplitude_ceiling =
        parse_f32(optional_text(node, "ceiling"), config.amplitude_ceiling)?;
    if let Some(axis) = optional_text(node, "height-axis") {
        config.height_axis =
            Axis::from_name(&axis).ok_or_else(|| anyhow!("unknown height axis `{axis}`"))?;
    }
    config.frequency_follows_gain =
        parse_bool(optional_text(node, "follow-gain"), config.frequency_follows_gain)?;
    if let Some(smoothing) = child(node, "smoothing") {
        let rate = parse_f32(smoothing.attribute("rate").map(str::to_string), 5.0)?;
        config.smoothing = Smoothing::Exponential { rate };
    }
    if let Some(profile) = child(node, "profile") {
        config.profile = parse_profile(&profile)?;
    }
    config
        .validate()
        .with_context(|| format!("invalid vibration for {target}"))?;

    Ok(VibrationDecl {
        target,
        seed,
        config,
    })
}

fn parse_profile(node: &Node<'_, '_>) -> Result<AmplitudeProfile> {
    let kind = required_attribute(node, "kind")?;
    let kind = AmplitudeProfileKind::from_name(&kind)
        .ok_or_else(|| anyhow!("unknown profile kind `{kind}`"))?;
    let attr = |name: &str| node.attribute(name).map(str::to_string);
    let profile = match kind {
        AmplitudeProfileKind::Peak => AmplitudeProfile::Peak(PeakParams {
            center: parse_f32(attr("center"), 0.0)?,
            width: parse_f32(attr("width"), 1.0)?,
            peak_gain: parse_f32(attr("gain"), 2.0)?,
        }),
        AmplitudeProfileKind::Plateau => AmplitudeProfile::Plateau(PlateauParams {
            min: parse_f32(attr("min"), 0.0)?,
            max: parse_f32(attr("max"), 1.0)?,
            gain: parse_f32(attr("gain"), 2.0)?,
            baseline: parse_f32(attr("baseline"), 1.0)?,
        }),
        AmplitudeProfileKind::Ramp => AmplitudeProfile::Ramp(RampParams {
            reference: parse_f32(attr("reference"), 0.0)?,
            rate: parse_f32(attr("rate"), 1.0)?,
        }),
    };
    Ok(profile)
}

fn parse_toggle(node: &Node<'_, '_>) -> Result<ToggleDecl> {
    let target = required_attribute(node, "target")?;
    let region = node.attribute("region").map(str::to_string);
    let defaults = InvertedPalette::default();
    let palette = InvertedPalette {
        background: parse_color(optional_text(node, "inverted-background"), defaults.background)?,
        albedo: parse_color(optional_text(node, "inverted-albedo"), defaults.albedo)?,
    };
    Ok(ToggleDecl {
        target,
        region,
        palette,
    })
}

fn parse_hand(node: &Node<'_, '_>) -> Result<HandDecl> {
    let preference = match node.attribute("preference") {
        Some(name) => {
            Chirality::from_name(name).ok_or_else(|| anyhow!("unknown hand preference `{name}`"))?
        }
        None => Chirality::default(),
    };
    let units = parse_f32(node.attribute("units").map(str::to_string), 1.0)?;
    let origin = parse_vec3(node.attribute("origin").map(str::to_string), Vec3::ZERO)?;
    Ok(HandDecl {
        preference,
        space: TrackingSpace::new(Affine3A::from_translation(origin), units),
    })
}

fn parse_track(node: &Node<'_, '_>) -> Result<Vec<Vec<TrackedHand>>> {
    let mut frames = Vec::new();
    for (index, frame) in node
        .children()
        .filter(|n| n.has_tag_name("frame"))
        .enumerate()
    {
        let mut hands = Vec::new();
        for hand in frame.children().filter(|n| n.has_tag_name("hand")) {
            let chirality = match hand.attribute("side") {
                Some(side) => Chirality::from_name(side)
                    .ok_or_else(|| anyhow!("frame {index}: unknown hand side `{side}`"))?,
                None => Chirality::default(),
            };
            let palm = parse_vec3(hand.text().map(str::to_string), Vec3::ZERO)
                .with_context(|| format!("frame {index}: invalid palm position"))?;
            hands.push(TrackedHand { chirality, palm });
        }
        frames.push(hands);
    }
    Ok(frames)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn required_attribute(node: &Node<'_, '_>, name: &str) -> Result<String> {
    node.attribute(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("<{}> is missing the `{name}` attribute", node.tag_name().name()))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components(value: &str, what: &str) -> Result<[f32; 3]> {
    let mut numbers = value.split_whitespace().map(str::parse::<f32>);
    let mut out = [0.0; 3];
    for slot in &mut out {
        *slot = numbers
            .next()
            .ok_or_else(|| anyhow!("{what} is missing components"))?
            .map_err(|err| anyhow!("invalid {what} component: {err}"))?;
    }
    if numbers.next().is_some() {
        bail!("{what} has more than three components");
    }
    Ok(out)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from_array(parse_components(&value, "vector")?))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    Ok(Vec3::from_array(parse_components(&value, "color")?) / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .trim()
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float `{value}`: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true" | "yes" | "1") => Ok(true),
        Some("false" | "no" | "0") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse boolean `{other}`")),
        None => Ok(default),
    }
}
