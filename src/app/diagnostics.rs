//! Diagnose-Senke für Best-Effort-Schritte und die Entscheidungstabelle,
//! welche Fehler ein Element abbrechen.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Teilschritt beim Anwenden bzw. Entfernen eines Features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStep {
    /// GeoJSON → Live-Handle
    Materialize,
    /// Tool-Provenienz anhängen
    ToolMetadata,
    MapAttach,
    EditableAttach,
    MapDetach,
    EditableDetach,
}

impl ItemStep {
    /// Bricht ein Fehler in diesem Schritt das ganze Element ab?
    ///
    /// | Schritt        | Abbruch | in `errors` |
    /// |----------------|---------|-------------|
    /// | Materialize    | ja      | ja          |
    /// | ToolMetadata   | nein    | nein        |
    /// | Map-/Editable-Attach/Detach | nein | nein |
    pub fn aborts_item(self) -> bool {
        matches!(self, ItemStep::Materialize)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStep::Materialize => "materialize",
            ItemStep::ToolMetadata => "toolMetadata",
            ItemStep::MapAttach => "map-attach",
            ItemStep::EditableAttach => "editable-attach",
            ItemStep::MapDetach => "map-detach",
            ItemStep::EditableDetach => "editable-detach",
        }
    }
}

impl fmt::Display for ItemStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nimmt Fehler aus Teilschritten entgegen.
pub trait DiagnosticSink {
    fn report(&self, step: ItemStep, detail: &str);
}

/// Schreibt über die `log`-Fassade: ausführlich als Warnung, sonst auf Debug-Level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics {
    pub verbose: bool,
}

impl LogDiagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticSink for LogDiagnostics {
    fn report(&self, step: ItemStep, detail: &str) {
        if self.verbose {
            log::warn!("apply_result: {} fehlgeschlagen: {}", step, detail);
        } else {
            log::debug!("apply_result: {} fehlgeschlagen: {}", step, detail);
        }
    }
}

/// Gemeldeter Diagnose-Eintrag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub step: ItemStep,
    pub detail: String,
}

/// Sammelt Meldungen im Speicher; Klone teilen sich denselben Puffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Anzahl der Meldungen für einen Schritt.
    pub fn count(&self, step: ItemStep) -> usize {
        self.entries.borrow().iter().filter(|d| d.step == step).count()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&self, step: ItemStep, detail: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            step,
            detail: detail.to_owned(),
        });
    }
}
