//! In-Memory-Surface: Karte, Zeichen-Gruppe und Event-Queue ohne Rendering.

use super::feature::{FeatureHandle, FeatureRecord};
use super::geojson::{Feature, GeoJson, GeoJsonError};
use super::geometry::BoundingBox;
use super::surface::{RenderSurface, SurfaceError, SurfaceEvent, SurfaceTarget};
use serde_json::Value;
use std::collections::VecDeque;

/// Schaltbare Fehler für Tests der Best-Effort-Pfade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceFaults {
    pub map_attach: bool,
    pub editable_attach: bool,
    pub map_detach: bool,
    pub editable_detach: bool,
}

/// Surface, das Features nur in Listen hält.
#[derive(Debug, Default)]
pub struct MemorySurface {
    map: Vec<FeatureHandle>,
    editable: Vec<FeatureHandle>,
    events: VecDeque<SurfaceEvent>,
    view: Option<BoundingBox>,
    /// Aktive Fehlerinjektion
    pub faults: SurfaceFaults,
}

impl MemorySurface {
    /// Leeres Surface ohne Kartenausschnitt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leeres Surface mit Kartenausschnitt.
    pub fn with_view(view: BoundingBox) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    /// Setzt den Kartenausschnitt.
    pub fn set_view(&mut self, view: BoundingBox) {
        self.view = Some(view);
    }

    /// Features auf der Karte (Anhänge-Reihenfolge).
    pub fn map_layers(&self) -> &[FeatureHandle] {
        &self.map
    }

    /// Features in der Zeichen-Gruppe.
    pub fn editable_layers(&self) -> &[FeatureHandle] {
        &self.editable
    }

    /// Anzahl wartender Events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn materialize_feature(feature: Feature) -> Result<FeatureHandle, GeoJsonError> {
        let geometry = feature.geometry.as_ref().ok_or(GeoJsonError::MissingGeometry)?;
        geometry.validate()?;
        Ok(FeatureHandle::new(FeatureRecord::from_feature(feature)))
    }

    fn reject(target: SurfaceTarget, reason: &str) -> SurfaceError {
        SurfaceError::Rejected {
            target,
            reason: reason.to_owned(),
        }
    }
}

fn position(list: &[FeatureHandle], handle: &FeatureHandle) -> Option<usize> {
    list.iter().position(|h| h.ptr_eq(handle))
}

impl RenderSurface for MemorySurface {
    fn materialize(&mut self, geojson: &Value) -> Result<Vec<FeatureHandle>, SurfaceError> {
        let features = GeoJson::from_value(geojson)?.into_features();
        // Collection ist atomar: erst alles prüfen, dann erst Handles liefern
        let handles = features
            .into_iter()
            .map(Self::materialize_feature)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(handles)
    }

    fn attach_to_map(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError> {
        if self.faults.map_attach {
            return Err(Self::reject(SurfaceTarget::Map, "Anhängen deaktiviert"));
        }
        if position(&self.map, handle).is_none() {
            self.map.push(handle.clone());
            self.events.push_back(SurfaceEvent::LayerAdded(handle.clone()));
        }
        Ok(())
    }

    fn detach_from_map(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError> {
        if self.faults.map_detach {
            return Err(Self::reject(SurfaceTarget::Map, "Entfernen deaktiviert"));
        }
        if let Some(index) = position(&self.map, handle) {
            self.map.remove(index);
            self.events.push_back(SurfaceEvent::LayerRemoved(handle.clone()));
        }
        Ok(())
    }

    fn attach_to_editable(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError> {
        if self.faults.editable_attach {
            return Err(Self::reject(SurfaceTarget::Editable, "Anhängen deaktiviert"));
        }
        if position(&self.editable, handle).is_none() {
            self.editable.push(handle.clone());
        }
        Ok(())
    }

    fn detach_from_editable(&mut self, handle: &FeatureHandle) -> Result<(), SurfaceError> {
        if self.faults.editable_detach {
            return Err(Self::reject(SurfaceTarget::Editable, "Entfernen deaktiviert"));
        }
        if let Some(index) = position(&self.editable, handle) {
            self.editable.remove(index);
        }
        Ok(())
    }

    fn has_on_map(&self, handle: &FeatureHandle) -> bool {
        position(&self.map, handle).is_some()
    }

    fn has_in_editable(&self, handle: &FeatureHandle) -> bool {
        position(&self.editable, handle).is_some()
    }

    fn view_bounds(&self) -> Option<BoundingBox> {
        self.view
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.events.drain(..).collect()
    }
}
