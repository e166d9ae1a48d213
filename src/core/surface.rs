//! Schnittstelle zum Render-/Zeichen-Surface (Karte + editierbare Gruppe).

use super::feature::FeatureHandle;
use super::geojson::{Feature, GeoJsonError};
use super::geometry::BoundingBox;
use serde_json::Value;
use thiserror::Error;

/// Fehler eines Surface-Aufrufs.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("GeoJSON konnte nicht materialisiert werden: {0}")]
    Materialize(#[from] GeoJsonError),
    #[error("{target} hat das Feature abgelehnt: {reason}")]
    Rejected {
        target: SurfaceTarget,
        reason: String,
    },
}

/// Container innerhalb des Surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTarget {
    /// Die sichtbare Karte
    Map,
    /// Die Feature-Gruppe, auf der die Zeichenwerkzeuge arbeiten
    Editable,
}

impl std::fmt::Display for SurfaceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceTarget::Map => f.write_str("Karte"),
            SurfaceTarget::Editable => f.write_str("Zeichen-Gruppe"),
        }
    }
}

/// Benachrichtigung des Surface über Änderungen an der Karte.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    LayerAdded(FeatureHandle),
    LayerRemoved(FeatureHandle),
}

/// Render-Surface, gegen das die Session arbeitet.
///
/// Events werden gepuffert und von der Session über `drain_events` abgeholt,
/// damit Listener nie in eine laufende Mutation hineinfeuern.
pub trait RenderSurface {
    /// Wandelt Feature, FeatureCollection oder nackte Geometrie in Live-Handles.
    fn materialize(&mut self, geojson: &Value) -> Result<Vec<FeatureHandle>, SurfaceError>;

    fn attach_to_map(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError>;
    fn detach_from_map(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError>;
    fn attach_to_editable(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError>;
    fn detach_from_editable(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError>;

    fn has_on_map(&self, handle: &FeatureHandle) -> bool;
    fn has_in_editable(&self, handle: &FeatureHandle) -> bool;

    /// Serialisiert ein Handle zurück nach GeoJSON.
    fn to_geojson(&self, handle: &FeatureHandle) -> Feature {
        handle.to_feature()
    }

    /// Aktueller Kartenausschnitt.
    fn view_bounds(&self) -> Option<BoundingBox>;

    /// Holt alle seit dem letzten Aufruf aufgelaufenen Events ab.
    fn drain_events(&mut self) -> Vec<SurfaceEvent>;
}
