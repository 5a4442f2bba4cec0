//! Single-object selection

use tracing::debug;

use crate::geometry::{GeometryObject, ObjectId};
use crate::model::GeometryModel;
use crate::notify::{ListenerId, Observers};

/// Change notifications fired by [`Selection`]
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Selected(ObjectId),
    Cleared,
}

/// Holds at most one selected object id
///
/// The selection may go stale when its object is removed from the model.
/// Lookups through [`Selection::resolve`] treat a stale id as nothing selected.
#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<ObjectId>,
    observers: Observers<SelectionEvent>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with exactly this id
    pub fn select(&mut self, id: ObjectId) {
        debug!("Selected {}", id);
        self.selected = Some(id.clone());
        self.observers.notify(&SelectionEvent::Selected(id));
    }

    /// Clear the selection
    pub fn deselect(&mut self) {
        self.selected = None;
        self.observers.notify(&SelectionEvent::Cleared);
    }

    /// The raw selected id, which may be stale
    pub fn selected(&self) -> Option<&ObjectId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &ObjectId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// The selected object, or `None` if nothing is selected or the id no
    /// longer exists
    pub fn resolve<'a>(&self, model: &'a GeometryModel) -> Option<&'a GeometryObject> {
        self.selected.as_ref().and_then(|id| model.get(id))
    }

    /// Drop a stale id. Returns true if the selection changed.
    pub fn reconcile(&mut self, model: &GeometryModel) -> bool {
        match &self.selected {
            Some(id) if !model.contains(id) => {
                debug!("Dropping stale selection {}", id);
                self.deselect();
                true
            }
            _ => false,
        }
    }

    /// Subscribe to change events
    pub fn on_change(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    /// Drop a subscription
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }
}
