//! Inhaltsverzeichnis (TOC): geordnete Liste der Workspace-Features.

use super::registry::FeatureRegistry;
use crate::core::{FeatureHandle, StableId};
use serde::Serialize;

/// Lese-Modell eines TOC-Eintrags (Dropdowns, Listen).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: StableId,
    #[serde(rename = "geometryType")]
    pub geometry_type: Option<String>,
    pub label: String,
}

impl TocEntry {
    /// `true` für Polygon und MultiPolygon.
    pub fn is_polygon(&self) -> bool {
        matches!(
            self.geometry_type.as_deref(),
            Some("Polygon") | Some("MultiPolygon")
        )
    }
}

/// Features in Einfüge-Reihenfolge; Mitgliedschaft per Identität.
#[derive(Debug, Default)]
pub struct TableOfContents {
    entries: Vec<FeatureHandle>,
}

impl TableOfContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hängt ein Handle an, sofern es noch nicht enthalten ist.
    pub fn append(&mut self, handle: FeatureHandle) -> bool {
        if self.contains(&handle) {
            return false;
        }
        self.entries.push(handle);
        true
    }

    /// Entfernt das erste Vorkommen.
    pub fn remove(&mut self, handle: &FeatureHandle) -> bool {
        match self.entries.iter().position(|h| h.ptr_eq(handle)) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: &FeatureHandle) -> bool {
        self.entries.iter().any(|h| h.ptr_eq(handle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn handles(&self) -> &[FeatureHandle] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Baut das Lese-Modell in TOC-Reihenfolge.
    ///
    /// Jedes Handle wird dabei (mit seiner eingehenden `__id`) registriert,
    /// falls das noch nicht geschehen ist.
    pub fn list(&self, registry: &mut FeatureRegistry) -> Vec<TocEntry> {
        self.entries
            .iter()
            .map(|handle| {
                let preferred = handle.record().incoming_id();
                let id = registry.register_layer(handle, preferred.as_ref().map(StableId::as_str));
                let geometry_type = handle.record().geometry_type();
                let label = match &geometry_type {
                    Some(kind) => format!("{} ({})", kind, id),
                    None => id.to_string(),
                };
                TocEntry {
                    id,
                    geometry_type,
                    label,
                }
            })
            .collect()
    }
}
