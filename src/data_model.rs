use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::region::{RegionBounds, VisualConfiguration};
use crate::scene::SceneObject;

const CAMERA_TYPE: &str = "camera";
const REGION_TYPE: &str = "region";

/// What the effects need from the scene graph.
///
/// Writers return `false` when the named object does not exist. Two effects
/// writing the same property of the same object are not ordered by the
/// scene graph; callers that attach them must serialize the writes.
pub trait SceneGraph {
    fn position(&self, name: &str) -> Option<Vec3>;
    fn region_bounds(&self, name: &str) -> Option<RegionBounds>;
    fn visual_configuration(&self, name: &str) -> Option<VisualConfiguration>;
    fn set_position(&self, name: &str, position: Vec3) -> bool;
    fn set_visual_configuration(&self, name: &str, configuration: &VisualConfiguration) -> bool;
}

/// Thread-safe container mirroring the mutable state of the scene graph.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl DataModel {
    /// Creates an empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data model from an initial set of objects.
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
        }
    }

    /// Replaces the stored objects with a new snapshot.
    pub fn replace_objects(&self, objects: Vec<SceneObject>) {
        *self.objects.write() = objects;
    }

    /// Returns a snapshot of all stored objects.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    /// Returns a clone of the requested object.
    pub fn get(&self, name: &str) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .cloned()
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.name == name)?;
        Some(updater(object))
    }

    /// Background of the first camera, if the scene has one.
    pub fn background(&self) -> Option<Vec3> {
        self.objects
            .read()
            .iter()
            .find(|object| object.object_type == CAMERA_TYPE)
            .map(|camera| camera.background)
    }
}

impl SceneGraph for DataModel {
    fn position(&self, name: &str) -> Option<Vec3> {
        self.get(name).map(|object| object.position)
    }

    fn region_bounds(&self, name: &str) -> Option<RegionBounds> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name && object.object_type == REGION_TYPE)
            .map(|region| RegionBounds::from_center_size(region.position, region.scale))
    }

    fn visual_configuration(&self, name: &str) -> Option<VisualConfiguration> {
        let background = self.background().unwrap_or(Vec3::ZERO);
        self.get(name).map(|object| VisualConfiguration {
            background_color: background,
            object_albedo: object.color,
            emission_enabled: object.emission_enabled,
            emission_color: object.emission_color,
        })
    }

    fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |obj| obj.position = position).is_some()
    }

    /// Writes the object material and the camera background under a single
    /// lock so readers never observe half of a configuration.
    fn set_visual_configuration(&self, name: &str, configuration: &VisualConfiguration) -> bool {
        let mut guard = self.objects.write();
        let Some(index) = guard.iter().position(|object| object.name == name) else {
            return false;
        };
        let target = &mut guard[index];
        target.color = configuration.object_albedo;
        target.emission_enabled = configuration.emission_enabled;
        target.emission_color = configuration.emission_color;
        if let Some(camera) = guard
            .iter_mut()
            .find(|object| object.object_type == CAMERA_TYPE)
        {
            camera.background = configuration.background_color;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;

    fn make_object(name: &str, object_type: &str) -> SceneObject {
        SceneObject {
            name: name.to_string(),
            object_type: object_type.to_string(),
            ..SceneObject::default()
        }
    }

    #[test]
    fn update_modifies_object() {
        let model = DataModel::from_objects(vec![make_object("Sphere", "mesh")]);
        assert!(model.set_position("Sphere", Vec3::X));
        assert_eq!(model.position("Sphere"), Some(Vec3::X));
    }

    #[test]
    fn update_returns_false_for_missing_object() {
        let model = DataModel::new();
        assert!(model.update("Unknown", |obj| obj.color = Vec3::ONE).is_none());
        assert!(!model.set_position("Unknown", Vec3::ONE));
    }

    #[test]
    fn region_bounds_come_from_region_objects_only() {
        let mut region = make_object("Region", "region");
        region.position = Vec3::new(0.0, 0.0, 1.0);
        region.scale = Vec3::splat(0.5);
        let model = DataModel::from_objects(vec![region, make_object("Sphere", "mesh")]);
        let bounds = model.region_bounds("Region").unwrap();
        assert!(bounds.contains(Vec3::new(0.2, -0.2, 1.2)));
        assert!(!bounds.contains(Vec3::ZERO));
        assert!(model.region_bounds("Sphere").is_none());
    }

    #[test]
    fn visual_configuration_round_trips_through_camera_and_object() {
        let mut camera = make_object("Camera", "camera");
        camera.background = Vec3::new(0.1, 0.2, 0.3);
        let mut sphere = make_object("Sphere", "mesh");
        sphere.color = Vec3::new(0.9, 0.5, 0.1);
        sphere.emission_enabled = true;
        sphere.emission_color = Vec3::new(1.0, 0.0, 0.5);
        let model = DataModel::from_objects(vec![camera, sphere]);

        let captured = model.visual_configuration("Sphere").unwrap();
        assert_eq!(captured.background_color, Vec3::new(0.1, 0.2, 0.3));

        let inverted = VisualConfiguration {
            background_color: Vec3::ONE,
            object_albedo: Vec3::ZERO,
            emission_enabled: false,
            emission_color: captured.emission_color,
        };
        assert!(model.set_visual_configuration("Sphere", &inverted));
        assert_eq!(model.background(), Some(Vec3::ONE));
        assert!(model.set_visual_configuration("Sphere", &captured));
        assert_eq!(model.visual_configuration("Sphere"), Some(captured));
    }
}
