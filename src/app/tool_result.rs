//! Protokoll-Nutzdaten: `ToolResult` (Eingabe) und `ApplyOutcome` (Ergebnis).

use crate::core::StableId;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Ungültiges `ToolResult` — wird ohne jede Mutation gemeldet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("invalid toolResult: kein JSON-Objekt")]
    NotAnObject,
    #[error("invalid toolResult: removeLayerIds ist keine Liste")]
    InvalidRemoveList,
    #[error("invalid toolResult: removeLayerIds[{index}] ist keine ID")]
    InvalidRemoveId { index: usize },
}

/// Beschreibung, was ein Tool hinzufügen und entfernen möchte.
///
/// Wird einmal von `apply_result` verbraucht und nicht aufbewahrt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolResult {
    /// Feature- oder FeatureCollection-Objekte (roh, noch ungeprüft)
    pub add_geojson: Vec<Value>,
    pub remove_layer_ids: Vec<StableId>,
}

impl ToolResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt ein GeoJSON-Element hinzu (Builder).
    pub fn add(mut self, geojson: Value) -> Self {
        self.add_geojson.push(geojson);
        self
    }

    /// Fordert das Entfernen einer ID an (Builder).
    pub fn remove(mut self, id: impl Into<StableId>) -> Self {
        self.remove_layer_ids.push(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.add_geojson.is_empty() && self.remove_layer_ids.is_empty()
    }

    /// Liest die JSON-Form `{ addGeojson?, removeLayerIds? }`.
    ///
    /// `addGeojson` darf ein einzelnes Objekt oder eine Liste sein; fehlend,
    /// `null` oder `false` bedeuten "nichts hinzuzufügen".
    pub fn from_value(value: &Value) -> Result<Self, ApplyError> {
        let object = value.as_object().ok_or(ApplyError::NotAnObject)?;

        let remove_layer_ids = match object.get("removeLayerIds") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(ids)) => ids
                .iter()
                .enumerate()
                .map(|(index, id)| {
                    id.as_str()
                        .map(StableId::new)
                        .ok_or(ApplyError::InvalidRemoveId { index })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(ApplyError::InvalidRemoveList),
        };

        let add_geojson = match object.get("addGeojson") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
        };

        Ok(Self {
            add_geojson,
            remove_layer_ids,
        })
    }

    /// JSON-Form für Logs und die Treiber-Schnittstelle.
    pub fn to_value(&self) -> Value {
        json!({
            "addGeojson": self.add_geojson,
            "removeLayerIds": self.remove_layer_ids,
        })
    }
}

/// Ergebnis eines `apply_result`-Aufrufs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    pub ok: bool,
    pub added: Vec<StableId>,
    pub removed: Vec<StableId>,
    pub errors: Vec<String>,
}

impl ApplyOutcome {
    /// Ergebnis für eine abgelehnte Eingabe.
    pub fn rejected(error: &ApplyError) -> Self {
        Self {
            ok: false,
            errors: vec![error.to_string()],
            ..Self::default()
        }
    }
}
