//! Measurements
//!
//! Distance, path and area records. They live in their own store with a
//! lifecycle separate from the geometry model and are never edited in place.

use std::fmt;

use chrono::{DateTime, Utc};
use glam::DVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::geometry::{path_length, polygon_area};
use crate::notify::{ListenerId, Observers};

/// Measurement errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementError {
    #[error("{kind} measurement needs at least {required} points, got {got}")]
    TooFewPoints {
        kind: MeasurementKind,
        required: usize,
        got: usize,
    },

    #[error("{kind} measurement needs exactly {expected} points, got {got}")]
    WrongPointCount {
        kind: MeasurementKind,
        expected: usize,
        got: usize,
    },

    #[error("{kind} measurement has non-finite coordinates")]
    NonFinite { kind: MeasurementKind },
}

/// Unique identifier of a measurement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementId(String);

impl MeasurementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MeasurementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MeasurementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a measurement measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Straight distance between two points (cm)
    Distance,
    /// Length along an open path (cm)
    Path,
    /// Enclosed area (cm²)
    Area,
}

impl MeasurementKind {
    /// Minimum number of points this kind needs
    pub fn min_points(&self) -> usize {
        match self {
            MeasurementKind::Distance | MeasurementKind::Path => 2,
            MeasurementKind::Area => 3,
        }
    }

    /// Unit suffix for display
    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementKind::Distance | MeasurementKind::Path => "cm",
            MeasurementKind::Area => "cm²",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasurementKind::Distance => "Distance",
            MeasurementKind::Path => "Path",
            MeasurementKind::Area => "Area",
        };
        f.write_str(name)
    }
}

/// An immutable measurement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    #[serde(rename = "type")]
    pub kind: MeasurementKind,
    pub points: Vec<DVec2>,
    /// Length in cm or area in cm²
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Straight-line distance between two points
    pub fn distance(a: DVec2, b: DVec2) -> Self {
        Self::build(MeasurementKind::Distance, vec![a, b], a.distance(b))
    }

    /// Length along an open path of at least two points
    pub fn path(points: Vec<DVec2>) -> Result<Self, MeasurementError> {
        Self::check(MeasurementKind::Path, &points)?;
        let value = path_length(&points);
        Ok(Self::build(MeasurementKind::Path, points, value))
    }

    /// Unsigned shoelace area of a ring of at least three points
    pub fn area(points: Vec<DVec2>) -> Result<Self, MeasurementError> {
        Self::check(MeasurementKind::Area, &points)?;
        let value = polygon_area(&points);
        Ok(Self::build(MeasurementKind::Area, points, value))
    }

    /// Build a measurement of any kind from a point list. Distance requires
    /// exactly two points.
    pub fn from_points(kind: MeasurementKind, points: Vec<DVec2>) -> Result<Self, MeasurementError> {
        match kind {
            MeasurementKind::Distance => match points.as_slice() {
                [a, b] => Ok(Self::distance(*a, *b)),
                _ => Err(MeasurementError::WrongPointCount {
                    kind,
                    expected: 2,
                    got: points.len(),
                }),
            },
            MeasurementKind::Path => Self::path(points),
            MeasurementKind::Area => Self::area(points),
        }
    }

    /// Check a record that did not come from a constructor (document load)
    pub fn check_points(&self) -> Result<(), MeasurementError> {
        if self.kind == MeasurementKind::Distance && self.points.len() != 2 {
            return Err(MeasurementError::WrongPointCount {
                kind: self.kind,
                expected: 2,
                got: self.points.len(),
            });
        }
        Self::check(self.kind, &self.points)?;
        if self.points.iter().all(|p| p.is_finite()) && self.value.is_finite() {
            Ok(())
        } else {
            Err(MeasurementError::NonFinite { kind: self.kind })
        }
    }

    /// Human readable value, e.g. `"2000.00 cm"`
    pub fn label(&self) -> String {
        format!("{:.2} {}", self.value, self.kind.unit())
    }

    fn check(kind: MeasurementKind, points: &[DVec2]) -> Result<(), MeasurementError> {
        let required = kind.min_points();
        if points.len() < required {
            return Err(MeasurementError::TooFewPoints {
                kind,
                required,
                got: points.len(),
            });
        }
        Ok(())
    }

    fn build(kind: MeasurementKind, points: Vec<DVec2>, value: f64) -> Self {
        Self {
            id: MeasurementId::new(),
            kind,
            points,
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Change notifications fired by [`MeasurementStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementEvent {
    Added(MeasurementId),
    Removed(MeasurementId),
    Cleared,
    Loaded,
}

/// Insertion-ordered store of measurements
#[derive(Debug, Default)]
pub struct MeasurementStore {
    records: IndexMap<MeasurementId, Measurement>,
    observers: Observers<MeasurementEvent>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, returning its id
    pub fn add(&mut self, measurement: Measurement) -> MeasurementId {
        let id = measurement.id.clone();
        self.records.insert(id.clone(), measurement);
        self.observers.notify(&MeasurementEvent::Added(id.clone()));
        id
    }

    pub fn remove(&mut self, id: &MeasurementId) -> Option<Measurement> {
        let removed = self.records.shift_remove(id)?;
        self.observers.notify(&MeasurementEvent::Removed(id.clone()));
        Some(removed)
    }

    pub fn get(&self, id: &MeasurementId) -> Option<&Measurement> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.records.values()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.observers.notify(&MeasurementEvent::Cleared);
    }

    /// Replace every record (document load)
    pub fn load(&mut self, measurements: impl IntoIterator<Item = Measurement>) {
        self.records = measurements
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        self.observers.notify(&MeasurementEvent::Loaded);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subscribe to change events
    pub fn on_change(&mut self, listener: impl FnMut(&MeasurementEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    /// Drop a subscription
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }
}
