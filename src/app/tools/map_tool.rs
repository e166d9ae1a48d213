//! MapTool-Trait — gemeinsame Schnittstelle aller Karten-Tools.

use super::{ToolContext, ToolExecution, ToolForm, ToolKey, ToolSpec};
use super::params::ParamValues;
use crate::app::toc::TocEntry;

/// Schnittstelle für alle Karten-Tools (Puffer, Zufallspunkte, Export, …).
///
/// Tools lesen den Workspace nur und liefern ihr Ergebnis als reine Daten
/// (`ToolOutput`); angewendet wird zentral über `apply_result`.
pub trait MapTool {
    /// Schlüssel, über den das Tool ausgewählt wird
    fn key(&self) -> ToolKey;

    /// Maschinenlesbare Beschreibung (Name, Beschreibung, Parameter)
    fn spec(&self) -> ToolSpec;

    /// Formular-Modell; Layer-Dropdowns werden aus `layers` befüllt.
    fn form(&self, layers: &[TocEntry]) -> ToolForm {
        ToolForm::build(&self.spec(), layers)
    }

    /// Führt das Tool mit den übergebenen Werten aus.
    fn execute(&self, ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution;
}
