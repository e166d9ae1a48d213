use crate::app::tools::{ParamValues, ToolKey};
use crate::core::{DrawKind, Geometry};
use crate::shared::SessionOptions;
use serde::Deserialize;
use serde_json::Value;

/// App-Intents: Eingaben aus Oberfläche, Agent oder Treiber ohne direkte
/// Mutationslogik. Als JSON über das Feld `intent` unterschieden.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "intent")]
pub enum AppIntent {
    /// Tool im Panel auswählen
    ToolSelected { key: ToolKey },
    /// Tool-Panel schließen
    ToolClosed,
    /// Tool ausführen (`None` = aktives Tool)
    ToolExecuteRequested {
        #[serde(default)]
        key: Option<ToolKey>,
        #[serde(default)]
        params: ParamValues,
    },
    /// Fertiges Tool-Ergebnis anwenden (z.B. vom Agenten)
    ApplyResultRequested { result: Value },
    /// Layer per ID entfernen
    RemoveLayerRequested { id: String },
    /// Feature von Hand gezeichnet
    FeatureDrawn { kind: DrawKind, geometry: Geometry },
    /// Gezeichnetes Feature bearbeitet
    FeatureEdited { id: String, geometry: Geometry },
    /// Gezeichnetes Feature gelöscht
    FeatureDeleted { id: String },
    /// Kartenausschnitt geändert `[west, south, east, north]`
    ViewChanged { bounds: [f64; 4] },
    /// Alle Layer verwerfen
    SessionResetRequested,
    /// Optionen wurden geändert (sofortige Anwendung)
    OptionsChanged { options: SessionOptions },
    /// Optionen auf Standardwerte zurücksetzen
    ResetOptionsRequested,
    /// Anwendung beenden
    ExitRequested,
}
