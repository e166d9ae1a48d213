//! Geschlossenes Tool-System: jedes Karten-Tool implementiert `MapTool`
//! und wird über seinen `ToolKey` beim `ToolManager` ausgewählt.
//!
//! Tools erzeugen reine Daten (`ToolOutput`), die Mutation erfolgt zentral
//! in `apply_result`.

/// Daten importieren (GeoJSON, CSV).
pub mod add_data;
/// Puffer um einen Layer.
pub mod buffer;
/// Layer oder Workspace als GeoJSON exportieren.
pub mod export;
/// Features per KI-Endpunkt erzeugen.
pub mod generate_ai;
/// Nahe Features gruppieren.
pub mod group;
mod map_tool;
/// Parameter-Beschreibungen und -Werte.
pub mod params;
/// Zufallspunkte im Kartenausschnitt oder Polygon.
pub mod random_points;

pub use map_tool::MapTool;
pub use params::{LayerFilter, ParamKind, ParamValues, ParameterSpec};

use super::session::LayerSession;
use super::toc::TocEntry;
use super::tool_result::ToolResult;
use crate::core::{BoundingBox, DistanceUnit, ToolMetadata};
use rand::rngs::StdRng;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

// ── Typen ────────────────────────────────────────────────────────

/// Schlüssel der verfügbaren Tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
pub enum ToolKey {
    AddDataTool,
    BufferTool,
    ExportTool,
    #[serde(rename = "GenerateAIFeatures")]
    GenerateAiFeatures,
    GroupTool,
    RandomPointsTool,
}

impl ToolKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKey::AddDataTool => "AddDataTool",
            ToolKey::BufferTool => "BufferTool",
            ToolKey::ExportTool => "ExportTool",
            ToolKey::GenerateAiFeatures => "GenerateAIFeatures",
            ToolKey::GroupTool => "GroupTool",
            ToolKey::RandomPointsTool => "RandomPointsTool",
        }
    }
}

/// Status-Codes wie sie die Oberfläche anzeigt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatusCode {
    Success = 0,
    GeneralError = 1,
    InvalidInput = 2,
    ExecutionFailed = 3,
    ResourceNotFound = 4,
    PermissionDenied = 5,
    Timeout = 6,
    ExternalDependencyError = 7,
}

impl StatusCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == StatusCode::Success
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Status nach einer Tool-Ausführung.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub code: StatusCode,
    pub message: String,
}

impl ToolStatus {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Success, message)
    }
}

/// Was ein Tool erzeugt hat — reine Daten, keine Mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Über `apply_result` anzuwenden
    Apply(ToolResult),
    /// Datei zum Herunterladen
    Export { file_name: String, contents: Value },
    /// Anfrage an den KI-Endpunkt (Antwort kommt asynchron)
    AiRequest { prompt: String },
    None,
}

/// Ergebnis von `MapTool::execute`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    pub status: ToolStatus,
    pub output: ToolOutput,
}

impl ToolExecution {
    pub fn new(status: ToolStatus, output: ToolOutput) -> Self {
        Self { status, output }
    }

    /// Fehlschlag ohne Ausgabe.
    pub fn failed(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::new(code, message),
            output: ToolOutput::None,
        }
    }
}

/// Laufzeit-Einstellungen der Tools (aus den Session-Optionen).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSettings {
    /// Kreis-Stützpunkte pro Vertex beim Puffern
    pub buffer_steps: u32,
    /// Obergrenze der Versuche pro Zufallspunkt im Polygon
    pub random_points_max_attempts: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            buffer_steps: 32,
            random_points_max_attempts: 10_000,
        }
    }
}

/// Lesender Zugriff eines Tools auf den Workspace.
pub struct ToolContext<'a> {
    pub session: &'a LayerSession,
    /// TOC-Lese-Modell zum Ausführungszeitpunkt
    pub layers: &'a [TocEntry],
    pub view: Option<BoundingBox>,
    pub rng: &'a mut StdRng,
    pub settings: ToolSettings,
}

/// Maschinenlesbare Tool-Beschreibung (`/api/tools`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub key: ToolKey,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    /// Provenienz für erzeugte Features.
    pub fn metadata(&self, params: &ParamValues) -> ToolMetadata {
        ToolMetadata {
            name: self.name.to_owned(),
            parameters: params.snapshot(&self.parameters),
        }
    }
}

/// Auswahlwert eines Dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Ein Formularfeld mit Vorbelegung und ggf. Auswahlwerten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub value: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

/// Formular-Modell eines Tools (was die Oberfläche rendert).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolForm {
    pub tool: ToolKey,
    pub name: &'static str,
    pub fields: Vec<FormField>,
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ToolForm {
    /// Baut das Formular: Layer-Dropdowns aus dem TOC, feste Optionen mit
    /// großgeschriebenem Label.
    pub fn build(spec: &ToolSpec, layers: &[TocEntry]) -> Self {
        let fields = spec
            .parameters
            .iter()
            .map(|param| {
                let choices = match (param.layer_filter, &param.options) {
                    (Some(filter), _) => layers
                        .iter()
                        .filter(|entry| filter == LayerFilter::Any || entry.is_polygon())
                        .map(|entry| Choice {
                            value: entry.id.to_string(),
                            label: entry.label.clone(),
                        })
                        .collect(),
                    (None, Some(options)) => options
                        .iter()
                        .map(|option| Choice {
                            value: (*option).to_owned(),
                            label: capitalize(option),
                        })
                        .collect(),
                    (None, None) => Vec::new(),
                };
                let value = match (param.layer_filter, choices.first()) {
                    (Some(_), Some(first)) => Value::String(first.value.clone()),
                    _ => param.default_value.clone(),
                };
                FormField {
                    name: param.name,
                    kind: param.kind,
                    value,
                    choices,
                }
            })
            .collect();

        Self {
            tool: spec.key,
            name: spec.name,
            fields,
        }
    }
}

/// Gemeinsamer Parameter "Units".
pub(crate) fn units_parameter() -> ParameterSpec {
    let options: Vec<&'static str> = DistanceUnit::ALL.iter().map(|u| u.as_str()).collect();
    ParameterSpec::new(
        "Units",
        "The units for the distance",
        ParamKind::Dropdown,
        DistanceUnit::default().as_str(),
    )
    .with_options(&options)
}

/// Liest Distanz + Einheit und rechnet in Bogengrad um.
pub(crate) fn distance_in_degrees(params: &ParamValues) -> Result<f64, ToolExecution> {
    let distance = params
        .float("Distance")
        .ok_or_else(|| ToolExecution::failed(StatusCode::InvalidInput, "Keine Distanz angegeben."))?;
    let units_raw = params.text("Units");
    if units_raw.trim().is_empty() {
        return Ok(DistanceUnit::default().to_degrees(distance));
    }
    let units = DistanceUnit::parse(&units_raw).ok_or_else(|| {
        ToolExecution::failed(
            StatusCode::InvalidInput,
            format!("Unbekannte Einheit: {}", units_raw),
        )
    })?;
    Ok(units.to_degrees(distance))
}

// ── ToolManager ──────────────────────────────────────────────────

/// Verwaltet die registrierten Tools und das aktive Tool.
pub struct ToolManager {
    tools: Vec<Box<dyn MapTool>>,
    active: Option<ToolKey>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    /// Erstellt einen ToolManager mit allen Standard-Tools.
    pub fn new() -> Self {
        let mut manager = Self {
            tools: Vec::new(),
            active: None,
        };
        manager.register(Box::new(random_points::RandomPointsTool::new()));
        manager.register(Box::new(buffer::BufferTool::new()));
        manager.register(Box::new(export::ExportTool::new()));
        manager.register(Box::new(generate_ai::GenerateAiFeaturesTool::new()));
        manager.register(Box::new(group::GroupTool::new()));
        manager.register(Box::new(add_data::AddDataTool::new()));
        manager
    }

    /// Registriert ein Tool; ein vorhandenes mit gleichem Schlüssel wird ersetzt.
    pub fn register(&mut self, tool: Box<dyn MapTool>) {
        let key = tool.key();
        match self.tools.iter().position(|t| t.key() == key) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn get(&self, key: ToolKey) -> Option<&dyn MapTool> {
        self.tools.iter().find(|t| t.key() == key).map(|t| t.as_ref())
    }

    /// Schlüssel und Name aller Tools in Registrierungs-Reihenfolge.
    pub fn tool_entries(&self) -> Vec<(ToolKey, &'static str)> {
        self.tools
            .iter()
            .map(|t| {
                let spec = t.spec();
                (spec.key, spec.name)
            })
            .collect()
    }

    /// Aktiviert ein Tool. Unbekannte Schlüssel werden ignoriert.
    pub fn set_active(&mut self, key: ToolKey) -> bool {
        if self.get(key).is_some() {
            self.active = Some(key);
            true
        } else {
            false
        }
    }

    pub fn active_key(&self) -> Option<ToolKey> {
        self.active
    }

    pub fn active_tool(&self) -> Option<&dyn MapTool> {
        self.active.and_then(|key| self.get(key))
    }

    /// Deaktiviert das aktive Tool.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Nutzlast für `/api/tools`.
    pub fn specs_json(&self) -> Value {
        json!({ "ok": true, "tools": self.specs() })
    }
}
