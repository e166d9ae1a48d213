//! geosketch Library.
//! Kern des Karten-Annotations-Layers als Library exportiert für Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    AppCommand, AppController, AppIntent, AppState, ApplyOutcome, LayerSession, StateReport,
    ToolResult,
};
pub use core::{
    DrawKind, Feature, FeatureCollection, FeatureHandle, GeoJson, Geometry, IdMinter, IdSource,
    StableId, STABLE_ID_KEY,
};
pub use core::{BoundingBox, MemorySurface, RenderSurface, SpatialIndex, SpatialMatch};
pub use shared::SessionOptions;
