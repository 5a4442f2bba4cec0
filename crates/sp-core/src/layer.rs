//! Layer registry
//!
//! Layers decide draw order, visibility, locking and opacity for both
//! geometry and measurement overlays. One layer is active at a time and
//! receives newly drawn objects.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{ListenerId, Observers};

/// Id of the protected fallback layer. It is created on demand and can never
/// be removed.
pub const BASE_LAYER_ID: &str = "default";

/// Id of the layer measurement overlays are drawn on
pub const MEASUREMENT_LAYER_ID: &str = "measurements";

/// Layers seeded into a new registry, as `(id, name)` in draw order
pub const DEFAULT_LAYERS: [(&str, &str); 7] = [
    ("property", "Property"),
    ("buildings", "Buildings"),
    ("hardscape", "Hardscape"),
    ("vegetation", "Vegetation"),
    ("utilities", "Utilities"),
    ("reference", "Reference"),
    (MEASUREMENT_LAYER_ID, "Measurements"),
];

/// Layer-related errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("Layer is protected and cannot be removed: {0}")]
    ProtectedLayer(String),

    #[error("Layer not found: {0}")]
    UnknownLayer(String),

    #[error("Invalid opacity: {0}")]
    InvalidOpacity(f64),
}

/// A drawing layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Opacity in `[0, 1]`, clamped on write
    pub opacity: f64,
    /// Draw order; lower values are drawn first
    pub order: i32,
}

impl Layer {
    /// Create a visible, unlocked, opaque layer
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            locked: false,
            opacity: 1.0,
            order,
        }
    }
}

/// Change notifications fired by [`LayerRegistry`]
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    Added(String),
    /// A layer was removed; `active` is the active layer afterwards, which
    /// differs from before only if the removed layer was active
    Removed { id: String, active: Option<String> },
    Updated(String),
    ActiveChanged(Option<String>),
    /// The whole layer set was replaced
    Reset,
}

/// Ordered collection of layers with an active layer
#[derive(Debug)]
pub struct LayerRegistry {
    /// Layers in insertion order; draw order is derived by a stable sort
    layers: Vec<Layer>,
    active: Option<String>,
    observers: Observers<LayerEvent>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    /// Create a registry seeded with [`DEFAULT_LAYERS`], the first one active
    pub fn new() -> Self {
        let layers: Vec<Layer> = DEFAULT_LAYERS
            .iter()
            .zip(0..)
            .map(|((id, name), order)| Layer::new(*id, *name, order))
            .collect();
        let active = layers.first().map(|l| l.id.clone());
        Self {
            layers,
            active,
            observers: Observers::new(),
        }
    }

    /// Create a registry with no layers and no active layer
    pub fn empty() -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            observers: Observers::new(),
        }
    }

    // ============== CRUD ==============

    /// Add a layer. Fails if the id is taken. The first layer added to an
    /// empty registry becomes active.
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<(), LayerError> {
        if self.contains(&layer.id) {
            warn!("Refused duplicate layer: {}", layer.id);
            return Err(LayerError::DuplicateLayer(layer.id));
        }
        if layer.opacity.is_nan() {
            return Err(LayerError::InvalidOpacity(layer.opacity));
        }
        layer.opacity = layer.opacity.clamp(0.0, 1.0);

        let id = layer.id.clone();
        self.layers.push(layer);
        if self.active.is_none() {
            self.active = Some(id.clone());
        }
        info!("Added layer: {}", id);
        self.observers.notify(&LayerEvent::Added(id));
        Ok(())
    }

    /// Remove a layer. The base layer is refused. If the removed layer was
    /// active, the lowest-order remaining layer becomes active (or none).
    pub fn remove_layer(&mut self, id: &str) -> Result<Layer, LayerError> {
        if id == BASE_LAYER_ID {
            warn!("Refused to remove protected layer: {}", id);
            return Err(LayerError::ProtectedLayer(id.to_string()));
        }
        let pos = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))?;

        let removed = self.layers.remove(pos);
        if self.active.as_deref() == Some(id) {
            self.active = self.sorted().first().map(|l| l.id.clone());
            info!(
                "Removed active layer {}, new active: {:?}",
                id, self.active
            );
        } else {
            info!("Removed layer: {}", id);
        }
        self.observers.notify(&LayerEvent::Removed {
            id: removed.id.clone(),
            active: self.active.clone(),
        });
        Ok(removed)
    }

    /// Make sure a layer with this id exists, creating it after every other
    /// layer in draw order if needed. Returns true if it was created.
    pub fn ensure_layer(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        let order = self.layers.iter().map(|l| l.order).max().map_or(0, |o| o + 1);
        let name = if id == BASE_LAYER_ID { "Default" } else { id };
        debug!("Creating implicit layer: {}", id);
        self.add_layer(Layer::new(id, name, order)).is_ok()
    }

    /// Replace every layer at once (document load). Duplicate ids are
    /// rejected before anything changes. The active layer is kept if it still
    /// exists, otherwise the lowest-order layer becomes active.
    pub fn replace_all(&mut self, layers: Vec<Layer>) -> Result<(), LayerError> {
        for (i, layer) in layers.iter().enumerate() {
            if layers[..i].iter().any(|l| l.id == layer.id) {
                return Err(LayerError::DuplicateLayer(layer.id.clone()));
            }
            if layer.opacity.is_nan() {
                return Err(LayerError::InvalidOpacity(layer.opacity));
            }
        }

        self.layers = layers
            .into_iter()
            .map(|mut l| {
                l.opacity = l.opacity.clamp(0.0, 1.0);
                l
            })
            .collect();
        let keep_active = self.active.as_deref().is_some_and(|a| self.contains(a));
        if !keep_active {
            self.active = self.sorted().first().map(|l| l.id.clone());
        }
        self.observers.notify(&LayerEvent::Reset);
        Ok(())
    }

    // ============== Property setters ==============

    /// Show or hide a layer
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), LayerError> {
        self.update(id, |l| l.visible = visible)
    }

    /// Lock or unlock a layer
    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), LayerError> {
        self.update(id, |l| l.locked = locked)
    }

    /// Set opacity, clamped to `[0, 1]`. NaN is rejected.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> Result<(), LayerError> {
        if opacity.is_nan() {
            return Err(LayerError::InvalidOpacity(opacity));
        }
        let clamped = opacity.clamp(0.0, 1.0);
        self.update(id, |l| l.opacity = clamped)
    }

    /// Change the draw order of a layer
    pub fn set_order(&mut self, id: &str, order: i32) -> Result<(), LayerError> {
        self.update(id, |l| l.order = order)
    }

    /// Rename a layer
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), LayerError> {
        let name = name.into();
        self.update(id, |l| l.name = name)
    }

    /// Make a layer the target for newly drawn objects
    pub fn set_active(&mut self, id: &str) -> Result<(), LayerError> {
        if !self.contains(id) {
            return Err(LayerError::UnknownLayer(id.to_string()));
        }
        self.active = Some(id.to_string());
        self.observers
            .notify(&LayerEvent::ActiveChanged(self.active.clone()));
        Ok(())
    }

    fn update(&mut self, id: &str, apply: impl FnOnce(&mut Layer)) -> Result<(), LayerError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))?;
        apply(layer);
        self.observers.notify(&LayerEvent::Updated(id.to_string()));
        Ok(())
    }

    // ============== Queries ==============

    /// Get a layer by id
    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Returns true if a layer with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    /// All layers sorted by `order` ascending; ties keep insertion order
    pub fn all_layers(&self) -> Vec<&Layer> {
        self.sorted()
    }

    /// Visible layers in draw order
    pub fn visible_layers(&self) -> Vec<&Layer> {
        self.sorted().into_iter().filter(|l| l.visible).collect()
    }

    /// Id of the active layer, if any
    pub fn active_layer_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active layer, if any
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// Returns true if the layer exists and is locked
    pub fn is_locked(&self, id: &str) -> bool {
        self.get(id).is_some_and(|l| l.locked)
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if there are no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn sorted(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        // sort_by_key is stable, so equal orders keep insertion order
        layers.sort_by_key(|l| l.order);
        layers
    }

    // ============== Notification ==============

    /// Subscribe to change events
    pub fn on_change(&mut self, listener: impl FnMut(&LayerEvent) + 'static) -> ListenerId {
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
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_seeded_defaults() {
        let registry = LayerRegistry::new();
        let ids: Vec<&str> = registry.all_layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "property",
                "buildings",
                "hardscape",
                "vegetation",
                "utilities",
                "reference",
                "measurements"
            ]
        );
        assert_eq!(registry.active_layer_id(), Some("property"));
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut registry = LayerRegistry::new();
        let before = registry.len();
        let err = registry.add_layer(Layer::new("buildings", "Again", 99));
        assert_eq!(err, Err(LayerError::DuplicateLayer("buildings".into())));
        assert_eq!(registry.len(), before);
        assert_eq!(registry.get("buildings").map(|l| l.order), Some(1));
    }

    #[test]
    fn test_protected_base_layer() {
        let mut registry = LayerRegistry::new();
        assert!(registry.ensure_layer(BASE_LAYER_ID));
        assert!(!registry.ensure_layer(BASE_LAYER_ID));
        assert_eq!(
            registry.remove_layer(BASE_LAYER_ID),
            Err(LayerError::ProtectedLayer(BASE_LAYER_ID.into()))
        );
        assert!(registry.contains(BASE_LAYER_ID));
    }

    #[test]
    fn test_remove_active_promotes_another() {
        let mut registry = LayerRegistry::new();
        registry.set_active("hardscape").unwrap();
        registry.remove_layer("hardscape").unwrap();

        let active = registry.active_layer_id().unwrap();
        assert_ne!(active, "hardscape");
        assert!(registry.contains(active));
        assert_eq!(active, "property");
    }

    #[test]
    fn test_remove_last_layer_clears_active() {
        let mut registry = LayerRegistry::empty();
        registry.add_layer(Layer::new("only", "Only", 0)).unwrap();
        assert_eq!(registry.active_layer_id(), Some("only"));

        registry.remove_layer("only").unwrap();
        assert_eq!(registry.active_layer_id(), None);
        assert!(registry.active_layer().is_none());
    }

    #[test]
    fn test_set_active_unknown() {
        let mut registry = LayerRegistry::new();
        assert_eq!(
            registry.set_active("nope"),
            Err(LayerError::UnknownLayer("nope".into()))
        );
        assert_eq!(registry.active_layer_id(), Some("property"));
    }

    #[test]
    fn test_opacity_clamped() {
        let mut registry = LayerRegistry::new();
        registry.set_opacity("vegetation", 1.7).unwrap();
        assert_eq!(registry.get("vegetation").unwrap().opacity, 1.0);
        registry.set_opacity("vegetation", -0.3).unwrap();
        assert_eq!(registry.get("vegetation").unwrap().opacity, 0.0);
        assert!(registry.set_opacity("vegetation", f64::NAN).is_err());
    }

    #[test]
    fn test_equal_order_is_stable() {
        let mut registry = LayerRegistry::empty();
        registry.add_layer(Layer::new("b", "B", 1)).unwrap();
        registry.add_layer(Layer::new("a", "A", 1)).unwrap();
        registry.add_layer(Layer::new("c", "C", 0)).unwrap();

        let ids: Vec<&str> = registry.all_layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_visible_layers_filter() {
        let mut registry = LayerRegistry::new();
        registry.set_visible("utilities", false).unwrap();
        assert!(registry.visible_layers().iter().all(|l| l.id != "utilities"));
    }

    #[test]
    fn test_single_notification_per_mutation() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = LayerRegistry::new();
        let sink = events.clone();
        registry.on_change(move |e| sink.borrow_mut().push(e.clone()));

        registry.set_opacity("property", 0.5).unwrap();
        registry.remove_layer("reference").unwrap();
        let _ = registry.add_layer(Layer::new("property", "Dup", 0));

        assert_eq!(
            *events.borrow(),
            vec![
                LayerEvent::Updated("property".into()),
                LayerEvent::Removed {
                    id: "reference".into(),
                    active: Some("property".into()),
                },
            ]
        );
    }

    #[test]
    fn test_removed_event_names_promoted_layer() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = LayerRegistry::new();
        registry.set_active("hardscape").unwrap();
        let sink = events.clone();
        registry.on_change(move |e| sink.borrow_mut().push(e.clone()));

        registry.remove_layer("hardscape").unwrap();
        assert_eq!(
            *events.borrow(),
            vec![LayerEvent::Removed {
                id: "hardscape".into(),
                active: Some("property".into()),
            }]
        );
    }

    #[test]
    fn test_replace_all_rejects_duplicates_without_mutation() {
        let mut registry = LayerRegistry::new();
        let err = registry.replace_all(vec![Layer::new("x", "X", 0), Layer::new("x", "X2", 1)]);
        assert_eq!(err, Err(LayerError::DuplicateLayer("x".into())));
        assert_eq!(registry.len(), DEFAULT_LAYERS.len());
    }
}
