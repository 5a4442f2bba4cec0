//! Geometry model
//!
//! The project-wide object store. Objects are kept in insertion order so that
//! picking can walk them topmost-first; replacing an object under an existing
//! id keeps its position in that order.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::geometry::{GeometryObject, ObjectId};
use crate::notify::{ListenerId, Observers};

/// Change notifications fired by [`GeometryModel`]
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// A new object was stored
    Added(ObjectId),
    /// An existing object was replaced by a new value
    Replaced(ObjectId),
    /// An object was removed
    Removed(ObjectId),
    /// All objects were removed
    Cleared,
    /// The store was replaced wholesale
    Loaded,
}

/// Object store keyed by id, plus the set of layer ids objects refer to
#[derive(Debug, Default)]
pub struct GeometryModel {
    objects: IndexMap<ObjectId, GeometryObject>,
    known_layers: BTreeSet<String>,
    observers: Observers<ModelEvent>,
}

impl GeometryModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ============== Mutation ==============

    /// Store an object. If the id already exists the stored value is replaced
    /// and the previous one returned.
    pub fn insert(&mut self, object: GeometryObject) -> Option<GeometryObject> {
        let id = object.id.clone();
        self.known_layers.insert(object.layer_id.clone());
        let previous = self.objects.insert(id.clone(), object);
        let event = if previous.is_some() {
            ModelEvent::Replaced(id)
        } else {
            ModelEvent::Added(id)
        };
        self.observers.notify(&event);
        previous
    }

    /// Replace an existing object. Returns false (and stores nothing) if no
    /// object with that id exists.
    pub fn replace(&mut self, object: GeometryObject) -> bool {
        if !self.objects.contains_key(&object.id) {
            debug!("Replace ignored, object not found: {}", object.id);
            return false;
        }
        self.insert(object);
        true
    }

    /// Remove an object, preserving the order of the rest
    pub fn remove(&mut self, id: &ObjectId) -> Option<GeometryObject> {
        let removed = self.objects.shift_remove(id)?;
        self.observers.notify(&ModelEvent::Removed(id.clone()));
        Some(removed)
    }

    /// Remove every object. Known layers are kept.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.observers.notify(&ModelEvent::Cleared);
    }

    /// Replace the whole store (used on load/import)
    pub fn load(&mut self, objects: impl IntoIterator<Item = GeometryObject>) {
        self.objects.clear();
        self.known_layers.clear();
        for object in objects {
            self.known_layers.insert(object.layer_id.clone());
            self.objects.insert(object.id.clone(), object);
        }
        self.observers.notify(&ModelEvent::Loaded);
    }

    /// Move every object on `from` onto `to`, replacing each under its id.
    /// Returns how many objects moved.
    pub fn reassign_layer(&mut self, from: &str, to: &str) -> usize {
        let ids: Vec<ObjectId> = self.objects_on_layer(from).map(|o| o.id.clone()).collect();
        for id in &ids {
            if let Some(object) = self.objects.get(id) {
                let mut moved = object.clone();
                moved.layer_id = to.to_string();
                self.insert(moved);
            }
        }
        if !ids.is_empty() {
            debug!("Reassigned {} objects from layer {} to {}", ids.len(), from, to);
        }
        ids.len()
    }

    // ============== Queries ==============

    /// Get an object by id
    pub fn get(&self, id: &ObjectId) -> Option<&GeometryObject> {
        self.objects.get(id)
    }

    /// Check whether an object exists
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Iterate in insertion order (bottom to top)
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GeometryObject> {
        self.objects.values()
    }

    /// Iterate most-recently-added first
    pub fn iter_topmost(&self) -> impl Iterator<Item = &GeometryObject> {
        self.objects.values().rev()
    }

    /// Objects assigned to a layer, in insertion order
    pub fn objects_on_layer<'a>(
        &'a self,
        layer_id: &'a str,
    ) -> impl Iterator<Item = &'a GeometryObject> + 'a {
        self.objects.values().filter(move |o| o.layer_id == layer_id)
    }

    /// Every layer id any stored object has referred to
    pub fn known_layers(&self) -> &BTreeSet<String> {
        &self.known_layers
    }

    /// Record a layer id as known even if no object uses it yet
    pub fn register_layer(&mut self, layer_id: impl Into<String>) {
        self.known_layers.insert(layer_id.into());
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // ============== Notification ==============

    /// Subscribe to change events
    pub fn on_change(&mut self, listener: impl FnMut(&ModelEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    /// Drop a subscription
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Style};
    use glam::DVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn point(layer: &str, x: f64, y: f64) -> GeometryObject {
        GeometryObject::new(
            layer,
            Geometry::Point {
                position: DVec2::new(x, y),
            },
            Style::default(),
        )
    }

    #[test]
    fn test_insert_tracks_layers() {
        let mut model = GeometryModel::new();
        model.insert(point("vegetation", 0.0, 0.0));
        model.insert(point("custom", 1.0, 1.0));

        assert_eq!(model.len(), 2);
        assert!(model.known_layers().contains("vegetation"));
        assert!(model.known_layers().contains("custom"));
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut model = GeometryModel::new();
        let a = point("property", 0.0, 0.0);
        let b = point("property", 1.0, 0.0);
        let c = point("property", 2.0, 0.0);
        let (a_id, b_id, c_id) = (a.id.clone(), b.id.clone(), c.id.clone());
        model.insert(a);
        model.insert(b.clone());
        model.insert(c);

        let moved = b.with_geometry(Geometry::Point {
            position: DVec2::new(50.0, 50.0),
        });
        assert!(model.replace(moved));

        let order: Vec<&ObjectId> = model.iter().map(|o| &o.id).collect();
        assert_eq!(order, vec![&a_id, &b_id, &c_id]);
        let top: Vec<&ObjectId> = model.iter_topmost().map(|o| &o.id).collect();
        assert_eq!(top, vec![&c_id, &b_id, &a_id]);
    }

    #[test]
    fn test_replace_missing_is_noop() {
        let mut model = GeometryModel::new();
        assert!(!model.replace(point("property", 0.0, 0.0)));
        assert!(model.is_empty());
    }

    #[test]
    fn test_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut model = GeometryModel::new();
        let sink = events.clone();
        model.on_change(move |e| sink.borrow_mut().push(e.clone()));

        let obj = point("property", 0.0, 0.0);
        let id = obj.id.clone();
        model.insert(obj.clone());
        model.insert(obj);
        model.remove(&id);
        assert!(model.remove(&id).is_none());
        model.clear();

        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::Added(id.clone()),
                ModelEvent::Replaced(id.clone()),
                ModelEvent::Removed(id),
                ModelEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_load_replaces_everything() {
        let mut model = GeometryModel::new();
        model.insert(point("old", 0.0, 0.0));
        model.load(vec![point("new", 1.0, 1.0), point("new", 2.0, 2.0)]);

        assert_eq!(model.len(), 2);
        assert!(!model.known_layers().contains("old"));
        assert_eq!(model.objects_on_layer("new").count(), 2);
    }

    #[test]
    fn test_reassign_layer_keeps_ids_and_order() {
        let mut model = GeometryModel::new();
        let a = point("buildings", 0.0, 0.0);
        let b = point("hardscape", 1.0, 0.0);
        let c = point("buildings", 2.0, 0.0);
        let ids = vec![a.id.clone(), b.id.clone(), c.id.clone()];
        model.insert(a);
        model.insert(b);
        model.insert(c);

        assert_eq!(model.reassign_layer("buildings", "default"), 2);
        assert_eq!(model.objects_on_layer("buildings").count(), 0);
        assert_eq!(model.objects_on_layer("default").count(), 2);
        assert!(model.known_layers().contains("default"));

        let order: Vec<ObjectId> = model.iter().map(|o| o.id.clone()).collect();
        assert_eq!(order, ids);
        assert_eq!(model.reassign_layer("missing", "default"), 0);
    }
}
