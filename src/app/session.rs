//! Session-Kontext: bündelt Registry, TOC, Render-Surface und Diagnose-Senke.
//!
//! Wird beim Session-Start angelegt und mit `reset()` geleert. Tools und
//! Handler bekommen den Kontext übergeben, es gibt keinen globalen Zustand.

use super::diagnostics::{DiagnosticSink, ItemStep, LogDiagnostics};
use super::registry::{FeatureRegistry, LayerRef};
use super::toc::{TableOfContents, TocEntry};
use super::tool_result::{ApplyOutcome, ToolResult};
use super::use_cases;
use crate::core::{FeatureHandle, IdMinter, MemorySurface, RenderSurface, StableId, SurfaceEvent};
use serde::Serialize;
use serde_json::Value;

/// Momentaufnahme für Agenten und Treiber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    #[serde(rename = "layerCount")]
    pub layer_count: usize,
    pub layers: Vec<TocEntry>,
    /// Kartenausschnitt `[west, south, east, north]`
    pub bounds: Option<[f64; 4]>,
}

/// Layer-Zustand einer Session.
pub struct LayerSession<S: RenderSurface = MemorySurface> {
    pub(crate) registry: FeatureRegistry,
    pub(crate) toc: TableOfContents,
    pub(crate) surface: S,
    pub(crate) diagnostics: Box<dyn DiagnosticSink>,
}

impl Default for LayerSession<MemorySurface> {
    fn default() -> Self {
        Self::new(
            MemorySurface::new(),
            IdMinter::default(),
            Box::new(LogDiagnostics::default()),
        )
    }
}

impl<S: RenderSurface> LayerSession<S> {
    /// Startet eine Session auf dem angegebenen Surface.
    pub fn new(surface: S, minter: IdMinter, diagnostics: Box<dyn DiagnosticSink>) -> Self {
        Self {
            registry: FeatureRegistry::new(minter),
            toc: TableOfContents::new(),
            surface,
            diagnostics,
        }
    }

    /// Entfernt alle Workspace-Features vom Surface und leert Registry + TOC.
    pub fn reset(&mut self) {
        let handles: Vec<FeatureHandle> = self.toc.handles().to_vec();
        for handle in &handles {
            self.detach(handle);
        }
        self.toc.clear();
        self.registry.clear();
        // Benachrichtigungen betreffen nur noch entfernte Features
        let dropped = self.surface.drain_events().len();
        log::info!(
            "Session zurückgesetzt: {} Features entfernt, {} Events verworfen",
            handles.len(),
            dropped
        );
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn toc(&self) -> &TableOfContents {
        &self.toc
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn diagnostics(&self) -> &dyn DiagnosticSink {
        self.diagnostics.as_ref()
    }

    /// Tauscht die Diagnose-Senke (z.B. nach geänderten Optionen).
    pub fn set_diagnostics(&mut self, diagnostics: Box<dyn DiagnosticSink>) {
        self.diagnostics = diagnostics;
    }

    /// Siehe [`FeatureRegistry::ensure_stable_id`].
    pub fn ensure_stable_id(&self, handle: &FeatureHandle, preferred: Option<&str>) -> StableId {
        self.registry.ensure_stable_id(handle, preferred)
    }

    /// Siehe [`FeatureRegistry::register_layer`].
    pub fn register_layer(&mut self, handle: &FeatureHandle, preferred: Option<&str>) -> StableId {
        self.registry.register_layer(handle, preferred)
    }

    pub fn get_layer(&self, id: &str) -> Option<FeatureHandle> {
        self.registry.get_layer(id)
    }

    pub fn unregister_layer<'a>(&mut self, layer: impl Into<LayerRef<'a>>) -> Option<FeatureHandle> {
        self.registry.unregister_layer(layer)
    }

    /// Entfernt ein Feature vollständig: Surface, TOC und Registry.
    ///
    /// Gibt `false` zurück, wenn die ID unbekannt ist. Fehler beim Lösen vom
    /// Surface werden gemeldet, die Buchführung läuft trotzdem weiter.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let Some(handle) = self.registry.get_layer(id) else {
            return false;
        };
        self.detach(&handle);
        self.toc.remove(&handle);
        self.registry.unregister_layer(LayerRef::Id(id));
        log::debug!("Layer {} entfernt", id);
        true
    }

    /// TOC-Lese-Modell (registriert dabei fehlende IDs).
    pub fn list_layers(&mut self) -> Vec<TocEntry> {
        self.toc.list(&mut self.registry)
    }

    /// Layer-Anzahl, Layer-Liste und Kartenausschnitt.
    pub fn state(&mut self) -> SessionSnapshot {
        let layers = self.list_layers();
        SessionSnapshot {
            layer_count: layers.len(),
            layers,
            bounds: self.surface.view_bounds().map(|b| b.to_array()),
        }
    }

    /// Wendet ein Tool-Ergebnis an.
    pub fn apply_result(&mut self, result: &ToolResult) -> ApplyOutcome {
        use_cases::apply_result::apply_result(self, result)
    }

    /// Wendet ein Tool-Ergebnis in JSON-Form an; ungültige Eingaben werden
    /// ohne Mutation abgelehnt.
    pub fn apply_result_value(&mut self, payload: &Value) -> ApplyOutcome {
        use_cases::apply_result::apply_result_value(self, payload)
    }

    /// Verarbeitet alle aufgelaufenen Surface-Benachrichtigungen.
    pub fn sync_surface(&mut self) -> usize {
        let events = self.surface.drain_events();
        let count = events.len();
        for event in events {
            match event {
                SurfaceEvent::LayerAdded(handle) => {
                    use_cases::surface_sync::on_layer_added(self, &handle)
                }
                SurfaceEvent::LayerRemoved(handle) => {
                    use_cases::surface_sync::on_layer_removed(self, &handle)
                }
            }
        }
        count
    }

    /// Löst ein Handle von Zeichen-Gruppe und Karte (best effort).
    pub(crate) fn detach(&mut self, handle: &FeatureHandle) {
        if self.surface.has_in_editable(handle) {
            if let Err(e) = self.surface.detach_from_editable(handle) {
                self.report(ItemStep::EditableDetach, &e.to_string());
            }
        }
        if let Err(e) = self.surface.detach_from_map(handle) {
            self.report(ItemStep::MapDetach, &e.to_string());
        }
    }

    pub(crate) fn report(&self, step: ItemStep, detail: &str) {
        self.diagnostics.report(step, detail);
    }
}
