//! Project document
//!
//! The persisted, JSON-compatible form of a project: metadata, layers,
//! objects and measurements. Raw documents are validated and migrated to the
//! current schema before they are typed.

mod migrate;

pub use migrate::migrate_document;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::geometry::GeometryObject;
use crate::layer::{Layer, LayerError, LayerRegistry};
use crate::measurement::{Measurement, MeasurementError, MeasurementStore};
use crate::model::GeometryModel;

/// Current schema version written by [`serialize_project`]
pub const SCHEMA_VERSION: u32 = 2;

/// The only supported unit
pub const UNITS_CM: &str = "cm";

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Missing or invalid field: {0}")]
    MissingField(&'static str),

    #[error("Malformed objects: {0}")]
    MalformedObjects(String),

    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unsupported units: {0}")]
    UnsupportedUnits(String),

    #[error("Invalid geometry for object {id}: {reason}")]
    InvalidGeometry { id: String, reason: &'static str },

    #[error("Invalid measurement {id}: {source}")]
    InvalidMeasurement {
        id: String,
        #[source]
        source: MeasurementError,
    },

    #[error("JSON error: {0}")]
    Json(String),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        DocumentError::Json(err.to_string())
    }
}

/// Project metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

fn default_name() -> String {
    "Untitled".to_string()
}

impl ProjectMetadata {
    /// Fresh metadata with both timestamps set to now
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created: now,
            modified: now,
        }
    }

    /// Mark as modified now
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// A complete project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub schema_version: u32,
    pub project_id: String,
    pub metadata: ProjectMetadata,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
    pub objects: Vec<GeometryObject>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

fn default_units() -> String {
    UNITS_CM.to_string()
}

impl ProjectDocument {
    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every object and measurement against the data model rules
    pub fn check(&self) -> Result<(), DocumentError> {
        for object in &self.objects {
            object
                .geometry
                .check()
                .map_err(|reason| DocumentError::InvalidGeometry {
                    id: object.id.to_string(),
                    reason,
                })?;
        }
        for measurement in &self.measurements {
            measurement
                .check_points()
                .map_err(|source| DocumentError::InvalidMeasurement {
                    id: measurement.id.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Write this document into the live components
    ///
    /// The document is checked first, then layers are replaced; if either
    /// fails nothing is touched. An
    /// empty `layers` array keeps the current registry. Every layer an object
    /// refers to is created if it does not exist.
    pub fn apply(
        self,
        model: &mut GeometryModel,
        layers: &mut LayerRegistry,
        measurements: &mut MeasurementStore,
    ) -> Result<(), DocumentError> {
        if self.units != UNITS_CM {
            return Err(DocumentError::UnsupportedUnits(self.units));
        }
        self.check()?;
        if !self.layers.is_empty() {
            layers.replace_all(self.layers)?;
        }
        for object in &self.objects {
            if layers.ensure_layer(&object.layer_id) {
                warn!("Created missing layer '{}' referenced by object {}", object.layer_id, object.id);
            }
        }

        info!(
            "Loaded project {} ({} objects, {} measurements)",
            self.project_id,
            self.objects.len(),
            self.measurements.len()
        );
        model.load(self.objects);
        measurements.load(self.measurements);
        Ok(())
    }
}

/// Capture the live components as a document
pub fn serialize_project(
    project_id: Option<&str>,
    metadata: ProjectMetadata,
    model: &GeometryModel,
    layers: &LayerRegistry,
    measurements: &MeasurementStore,
) -> ProjectDocument {
    ProjectDocument {
        schema_version: SCHEMA_VERSION,
        project_id: project_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        metadata,
        units: UNITS_CM.to_string(),
        layers: layers.all_layers().into_iter().cloned().collect(),
        objects: model.iter().cloned().collect(),
        measurements: measurements.iter().cloned().collect(),
    }
}

/// Check the structural shape of a raw document and return its version
pub fn validate_document(document: &Value) -> Result<u32, DocumentError> {
    let root = document
        .as_object()
        .ok_or(DocumentError::MissingField("schemaVersion"))?;

    let version = root
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .ok_or(DocumentError::MissingField("schemaVersion"))?;
    let version = u32::try_from(version).map_err(|_| DocumentError::UnsupportedVersion(u32::MAX))?;
    if version == 0 || version > SCHEMA_VERSION {
        return Err(DocumentError::UnsupportedVersion(version));
    }

    if !root.get("projectId").is_some_and(Value::is_string) {
        return Err(DocumentError::MissingField("projectId"));
    }
    if !root.get("metadata").is_some_and(Value::is_object) {
        return Err(DocumentError::MissingField("metadata"));
    }

    let objects = root
        .get("objects")
        .and_then(Value::as_array)
        .ok_or(DocumentError::MissingField("objects"))?;
    for (i, entry) in objects.iter().enumerate() {
        let Some(object) = entry.as_object() else {
            return Err(DocumentError::MalformedObjects(format!("entry {} is not an object", i)));
        };
        for key in ["id", "layerId", "type"] {
            if !object.get(key).is_some_and(Value::is_string) {
                return Err(DocumentError::MalformedObjects(format!(
                    "entry {} has no string '{}'",
                    i, key
                )));
            }
        }
    }

    Ok(version)
}

/// Parse, validate and migrate a JSON document
pub fn deserialize_project(json: &str) -> Result<ProjectDocument, DocumentError> {
    let raw: Value = serde_json::from_str(json)?;
    deserialize_value(raw)
}

/// Same as [`deserialize_project`] for an already parsed value
pub fn deserialize_value(raw: Value) -> Result<ProjectDocument, DocumentError> {
    let version = validate_document(&raw)?;
    let raw = if version < SCHEMA_VERSION {
        migrate_document(raw, version, SCHEMA_VERSION)?
    } else {
        raw
    };

    let document: ProjectDocument = serde_json::from_value(raw)?;
    if document.units != UNITS_CM {
        return Err(DocumentError::UnsupportedUnits(document.units));
    }
    document.check()?;
    Ok(document)
}
