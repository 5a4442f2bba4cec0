//! Schema migrations for project documents
//!
//! Each step upgrades a raw JSON document by exactly one version.

use serde_json::{Value, json};
use tracing::info;

use super::{DocumentError, SCHEMA_VERSION};

/// Upgrade a raw document from version `from` to version `to`
pub fn migrate_document(mut document: Value, from: u32, to: u32) -> Result<Value, DocumentError> {
    if from == 0 || to > SCHEMA_VERSION || from > to {
        return Err(DocumentError::UnsupportedVersion(from.max(to)));
    }

    for version in from..to {
        document = match version {
            1 => v1_to_v2(document)?,
            other => return Err(DocumentError::UnsupportedVersion(other)),
        };
        info!("Migrated project document v{} -> v{}", version, version + 1);
    }
    Ok(document)
}

/// Version 1 predates layers, measurements and explicit units
fn v1_to_v2(mut document: Value) -> Result<Value, DocumentError> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| DocumentError::MalformedObjects("document is not an object".into()))?;

    root.entry("layers").or_insert_with(|| json!([]));
    root.entry("measurements").or_insert_with(|| json!([]));
    root.entry("units").or_insert_with(|| json!("cm"));
    root.insert("schemaVersion".into(), json!(2));
    Ok(document)
}
