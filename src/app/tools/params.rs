//! Parameter-Beschreibungen und eingehende Parameterwerte.

use crate::core::ParameterSnapshot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Eingabe-Art eines Parameters (bestimmt das Formularfeld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    File,
    Dropdown,
    Float,
    Int,
    Boolean,
    Text,
}

impl ParamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKind::File => "file",
            ParamKind::Dropdown => "dropdown",
            ParamKind::Float => "float",
            ParamKind::Int => "int",
            ParamKind::Boolean => "boolean",
            ParamKind::Text => "text",
        }
    }
}

/// Welche TOC-Einträge ein Layer-Dropdown anbietet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    Any,
    Polygons,
}

/// Statische Beschreibung eines Tool-Parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(rename = "defaultValue")]
    pub default_value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Dropdown wird aus dem TOC befüllt
    #[serde(skip)]
    pub layer_filter: Option<LayerFilter>,
}

impl ParameterSpec {
    pub fn new(
        name: &'static str,
        description: &'static str,
        kind: ParamKind,
        default_value: impl Into<Value>,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            default_value: default_value.into(),
            options: None,
            min: None,
            max: None,
            layer_filter: None,
        }
    }

    /// Feste Auswahlwerte (Builder).
    pub fn with_options(mut self, options: &[&'static str]) -> Self {
        self.options = Some(options.to_vec());
        self
    }

    /// Dropdown aus dem TOC (Builder).
    pub fn layers(mut self, filter: LayerFilter) -> Self {
        self.layer_filter = Some(filter);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }
}

/// Vom Formular bzw. Agenten übergebene Werte, nach Parametername.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamValues(IndexMap<String, Value>);

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setzt einen Wert (Builder).
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_owned(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Text-Wert; Zahlen und Bools werden als Text gelesen. Fehlend = leer.
    pub fn text(&self, name: &str) -> String {
        match self.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Kommazahl; Strings werden wie `parseFloat` gelesen. Nicht endlich = `None`.
    pub fn float(&self, name: &str) -> Option<f64> {
        let value = match self.get(name)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Ganzzahl; Kommazahlen werden abgeschnitten.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
            }
            _ => None,
        }
    }

    /// Checkbox-Wert: `true`, `"true"`, `"on"`, `"1"`.
    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim(), "true" | "on" | "1"),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            _ => false,
        }
    }

    /// Ergänzt fehlende Werte mit den Defaults der Spezifikation.
    pub fn with_defaults(&self, specs: &[ParameterSpec]) -> ParamValues {
        let mut resolved = self.clone();
        for spec in specs {
            if resolved.get(spec.name).is_none() {
                resolved
                    .0
                    .insert(spec.name.to_owned(), spec.default_value.clone());
            }
        }
        resolved
    }

    /// Momentaufnahme aller Parameter für die Tool-Provenienz.
    pub fn snapshot(&self, specs: &[ParameterSpec]) -> Vec<ParameterSnapshot> {
        specs
            .iter()
            .map(|spec| ParameterSnapshot {
                name: spec.name.to_owned(),
                description: spec.description.to_owned(),
                kind: spec.kind.as_str().to_owned(),
                default_value: spec.default_value.clone(),
                value: self.get(spec.name).cloned(),
            })
            .collect()
    }
}
