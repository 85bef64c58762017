use std::sync::Arc;

use glam::{Affine3A, Vec3};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Palm position and tracking flag for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HandSample {
    pub position: Vec3,
    pub tracked: bool,
}

impl HandSample {
    pub const UNTRACKED: Self = Self {
        position: Vec3::ZERO,
        tracked: false,
    };

    pub const fn tracked(position: Vec3) -> Self {
        Self {
            position,
            tracked: true,
        }
    }
}

/// Source of the palm sample consumed by the effects once per tick.
pub trait HandSignal: Send + Sync {
    fn sample(&self) -> HandSample;
}

impl<T> HandSignal for Arc<T>
where
    T: HandSignal + ?Sized,
{
    fn sample(&self) -> HandSample {
        (**self).sample()
    }
}

/// Which hand a tracker reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Chirality {
    Left,
    #[default]
    Right,
}

impl Chirality {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One hand as reported by the tracker, still in tracker space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedHand {
    pub chirality: Chirality,
    pub palm: Vec3,
}

/// Picks the first hand of the preferred chirality, falling back to the
/// first hand reported.
pub fn select_hand(hands: &[TrackedHand], preference: Chirality) -> Option<&TrackedHand> {
    hands
        .iter()
        .find(|hand| hand.chirality == preference)
        .or_else(|| hands.first())
}

/// Placement and unit scale of the tracker relative to the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSpace {
    pub transform: Affine3A,
    pub units_to_world: f32,
}

impl Default for TrackingSpace {
    fn default() -> Self {
        Self {
            transform: Affine3A::IDENTITY,
            units_to_world: 1.0,
        }
    }
}

impl TrackingSpace {
    pub fn new(transform: Affine3A, units_to_world: f32) -> Self {
        Self {
            transform,
            units_to_world,
        }
    }

    /// Converts a raw tracker coordinate into world units.
    ///
    /// This is the only place tracker units are rescaled; everything
    /// downstream works in world units.
    pub fn to_world(&self, raw: Vec3) -> Vec3 {
        self.transform.transform_point3(raw * self.units_to_world)
    }
}

/// Latest palm sample shared between the tracker thread and the effects.
#[derive(Debug, Default)]
pub struct HandState {
    preference: Chirality,
    space: TrackingSpace,
    sample: RwLock<HandSample>,
}

impl HandState {
    pub fn new(preference: Chirality, space: TrackingSpace) -> Self {
        Self {
            preference,
            space,
            sample: RwLock::new(HandSample::UNTRACKED),
        }
    }

    pub fn preference(&self) -> Chirality {
        self.preference
    }

    /// Stores the palm of the selected hand, or marks the hand missing when
    /// the frame is empty.
    pub fn submit_frame(&self, hands: &[TrackedHand]) {
        let next = match select_hand(hands, self.preference) {
            Some(hand) => HandSample::tracked(self.space.to_world(hand.palm)),
            None => HandSample::UNTRACKED,
        };
        *self.sample.write() = next;
    }

    pub fn clear(&self) {
        *self.sample.write() = HandSample::UNTRACKED;
    }
}

impl HandSignal for HandState {
    fn sample(&self) -> HandSample {
        *self.sample.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(chirality: Chirality, x: f32) -> TrackedHand {
        TrackedHand {
            chirality,
            palm: Vec3::new(x, 0.0, 0.0),
        }
    }

    #[test]
    fn preferred_hand_wins_over_order() {
        let hands = [hand(Chirality::Left, 1.0), hand(Chirality::Right, 2.0)];
        let picked = select_hand(&hands, Chirality::Right).unwrap();
        assert_eq!(picked.palm.x, 2.0);
    }

    #[test]
    fn falls_back_to_first_hand() {
        let hands = [hand(Chirality::Left, 1.0), hand(Chirality::Left, 3.0)];
        let picked = select_hand(&hands, Chirality::Right).unwrap();
        assert_eq!(picked.palm.x, 1.0);
        assert!(select_hand(&[], Chirality::Left).is_none());
    }

    #[test]
    fn tracking_space_scales_before_placing() {
        let space = TrackingSpace::new(
            Affine3A::from_translation(Vec3::new(0.0, 0.0, 1.0)),
            0.001,
        );
        let world = space.to_world(Vec3::new(100.0, 0.0, 500.0));
        assert!((world - Vec3::new(0.1, 0.0, 1.5)).length() < 1e-6);
    }

    #[test]
    fn hand_state_tracks_frames() {
        let state = HandState::new(Chirality::Left, TrackingSpace::default());
        assert_eq!(state.sample(), HandSample::UNTRACKED);
        state.submit_frame(&[hand(Chirality::Left, 0.5)]);
        let sample = state.sample();
        assert!(sample.tracked);
        assert_eq!(sample.position, Vec3::new(0.5, 0.0, 0.0));
        state.submit_frame(&[]);
        assert!(!state.sample().tracked);
    }

    #[test]
    fn chirality_names() {
        assert_eq!(Chirality::from_name("Left"), Some(Chirality::Left));
        assert_eq!(Chirality::from_name("r"), Some(Chirality::Right));
        assert_eq!(Chirality::from_name("both"), None);
    }
}
