//! Core-Domänentypen: IDs, GeoJSON, Features, Geometrie, Render-Surface.

pub mod feature;
pub mod geojson;
pub mod geometry;
pub mod memory_surface;
pub mod spatial;
pub mod stable_id;
pub mod surface;

pub use feature::{DrawKind, FeatureHandle, FeatureRecord, ParameterSnapshot, ToolMetadata};
pub use geojson::{
    Feature, FeatureCollection, GeoJson, GeoJsonError, Geometry, Position, STABLE_ID_KEY,
    TOOL_METADATA_KEY,
};
pub use geometry::{BoundingBox, DistanceUnit};
pub use memory_surface::{MemorySurface, SurfaceFaults};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use stable_id::{IdMinter, IdSource, StableId};
pub use surface::{RenderSurface, SurfaceError, SurfaceEvent, SurfaceTarget};
