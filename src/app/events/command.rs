use crate::app::ai_client::AiReply;
use crate::app::tools::{ParamValues, ToolKey};
use crate::core::{DrawKind, Geometry};
use crate::shared::SessionOptions;
use serde_json::Value;

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Tool aktivieren
    ActivateTool { key: ToolKey },
    /// Aktives Tool deaktivieren
    DeactivateTool,
    /// Tool mit Parametern ausführen
    ExecuteTool { key: ToolKey, params: ParamValues },
    /// Tool-Ergebnis (JSON-Form) anwenden
    ApplyToolResult { payload: Value },
    /// Antwort des KI-Endpunkts anwenden
    ApplyAiReply { reply: AiReply },
    /// Layer entfernen
    RemoveLayer { id: String },
    /// Gezeichnetes Feature übernehmen
    CreateDrawnFeature { kind: DrawKind, geometry: Geometry },
    /// Geometrie eines Features ersetzen
    EditDrawnFeature { id: String, geometry: Geometry },
    /// Gezeichnetes Feature löschen
    DeleteDrawnFeature { id: String },
    /// Kartenausschnitt setzen
    SetView { bounds: [f64; 4] },
    /// Session leeren
    ResetSession,
    /// Optionen anwenden und speichern
    ApplyOptions { options: SessionOptions },
    /// Optionen auf Standardwerte zurücksetzen
    ResetOptions,
    /// Anwendung beenden
    RequestExit,
}
