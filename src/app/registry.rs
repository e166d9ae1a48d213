//! Feature-Registry: StableId → Live-Handle.

use crate::core::{FeatureHandle, IdMinter, StableId};
use indexmap::IndexMap;

/// Verweis auf einen Registry-Eintrag, per Handle oder per ID.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    Handle(&'a FeatureHandle),
    Id(&'a str),
}

impl<'a> From<&'a FeatureHandle> for LayerRef<'a> {
    fn from(handle: &'a FeatureHandle) -> Self {
        LayerRef::Handle(handle)
    }
}

impl<'a> From<&'a StableId> for LayerRef<'a> {
    fn from(id: &'a StableId) -> Self {
        LayerRef::Id(id.as_str())
    }
}

impl<'a> From<&'a str> for LayerRef<'a> {
    fn from(id: &'a str) -> Self {
        LayerRef::Id(id)
    }
}

/// Einzige Quelle dafür, welche ID auf welches Feature zeigt.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    entries: IndexMap<StableId, FeatureHandle>,
    minter: IdMinter,
}

impl FeatureRegistry {
    /// Leere Registry mit dem angegebenen ID-Minter.
    pub fn new(minter: IdMinter) -> Self {
        Self {
            entries: IndexMap::new(),
            minter,
        }
    }

    /// Garantiert, dass das Handle eine StableId trägt, ohne es zu registrieren.
    ///
    /// Vorhandene IDs bleiben unverändert; sonst wird `preferred` übernommen
    /// (leer zählt als fehlend) oder eine neue ID erzeugt. Die ID wird immer
    /// nach `properties.__id` gespiegelt.
    pub fn ensure_stable_id(&self, handle: &FeatureHandle, preferred: Option<&str>) -> StableId {
        let mut record = handle.record_mut();
        let existing = record.stable_id().cloned();
        let id = match existing {
            Some(existing) => existing,
            None => {
                let fresh = preferred
                    .and_then(StableId::parse)
                    .unwrap_or_else(|| self.minter.mint());
                record.assign_stable_id(fresh)
            }
        };
        record.mirror_stable_id();
        id
    }

    /// `ensure_stable_id` + Eintrag anlegen bzw. überschreiben.
    pub fn register_layer(&mut self, handle: &FeatureHandle, preferred: Option<&str>) -> StableId {
        let id = self.ensure_stable_id(handle, preferred);
        if let Some(previous) = self.entries.insert(id.clone(), handle.clone()) {
            if !previous.ptr_eq(handle) {
                log::warn!("Registry: ID {} zeigt jetzt auf ein anderes Feature", id);
            }
        }
        id
    }

    /// Sucht das Live-Handle zu einer ID.
    pub fn get_layer(&self, id: &str) -> Option<FeatureHandle> {
        self.entries.get(id).cloned()
    }

    /// Entfernt einen Eintrag. Unbekannte IDs sind kein Fehler.
    ///
    /// Per Handle wird nur entfernt, wenn der Eintrag noch auf genau dieses
    /// Handle zeigt.
    pub fn unregister_layer<'a>(&mut self, layer: impl Into<LayerRef<'a>>) -> Option<FeatureHandle> {
        match layer.into() {
            LayerRef::Id(id) => self.entries.shift_remove(id),
            LayerRef::Handle(handle) => {
                let id = handle.stable_id()?;
                let still_points_here = self
                    .entries
                    .get(id.as_str())
                    .is_some_and(|current| current.ptr_eq(handle));
                if still_points_here {
                    self.entries.shift_remove(id.as_str())
                } else {
                    None
                }
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registrierte IDs in Registrierungs-Reihenfolge.
    pub fn ids(&self) -> impl Iterator<Item = &StableId> {
        self.entries.keys()
    }

    /// Entfernt alle Einträge (Session-Reset). Der Minter-Zähler läuft weiter.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn minter(&self) -> &IdMinter {
        &self.minter
    }
}
