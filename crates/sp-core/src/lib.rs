//! Site Plan Core
//!
//! Data model and leaf components of the site plan drafting engine:
//! - Geometry: typed shapes stored in centimeter world space
//! - GeometryModel: project-wide object store keyed by id
//! - LayerRegistry: draw order, visibility, lock and opacity
//! - MeasurementStore: distance, path and area records
//! - ViewportTransform: world/screen mapping with anchored zoom
//! - SnapEngine: grid quantization of pointer positions
//! - Selection and HitTester: single-object picking
//! - Document: the persisted project schema and its migrations
//!
//! Nothing in this crate performs filesystem or network I/O.

pub mod config;
pub mod document;
pub mod geometry;
pub mod hit;
pub mod layer;
pub mod measurement;
pub mod model;
pub mod notify;
pub mod selection;
pub mod snap;
pub mod viewport;

pub use config::*;
pub use document::*;
pub use geometry::*;
pub use hit::*;
pub use layer::*;
pub use measurement::*;
pub use model::*;
pub use notify::*;
pub use selection::*;
pub use snap::*;
pub use viewport::*;

pub use glam::DVec2;
