//! Daten-Import: GeoJSON unverändert, CSV als Punkte.

use super::params::{ParamKind, ParamValues, ParameterSpec};
use super::{
    MapTool, StatusCode, ToolContext, ToolExecution, ToolKey, ToolOutput, ToolSpec, ToolStatus,
};
use crate::app::tool_result::ToolResult;
use crate::core::{Feature, FeatureCollection, GeoJson, Geometry};
use serde_json::{Map, Value};
use std::io;
use std::path::Path;

/// Eine Tabellenzeile: Spaltenname → Zellwert.
pub type CsvRow = Map<String, Value>;

/// Importiert Dateien in den Workspace.
#[derive(Debug, Default)]
pub struct AddDataTool;

impl AddDataTool {
    pub fn new() -> Self {
        Self
    }
}

/// Einfacher CSV-Parser: Komma-getrennt, erste Zeile = Kopfzeile, keine Quotes.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let mut lines = text.lines();
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values: Vec<&str> = line.split(',').collect();
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let cell = values.get(i).map_or("", |v| v.trim());
                    ((*header).to_owned(), Value::String(cell.to_owned()))
                })
                .collect()
        })
        .collect()
}

/// Sucht die Spalten, deren Name `lat` bzw. `lon` enthält.
pub fn detect_coordinate_columns(headers: &[&str]) -> (Option<String>, Option<String>) {
    let find = |needle: &str| {
        headers
            .iter()
            .find(|h| h.to_lowercase().contains(needle))
            .map(|h| (*h).to_owned())
    };
    (find("lat"), find("lon"))
}

fn cell_number(row: &CsvRow, column: &str) -> Option<f64> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Wandelt Tabellenzeilen in Punkt-Features; Zeilen ohne gültige Koordinaten entfallen.
pub fn rows_to_points(rows: Vec<CsvRow>, lat_column: &str, lon_column: &str) -> FeatureCollection {
    let features = rows
        .into_iter()
        .filter_map(|row| {
            let lon = cell_number(&row, lon_column)?;
            let lat = cell_number(&row, lat_column)?;
            let mut feature = Feature::new(Geometry::point(lon, lat));
            feature.properties = row;
            Some(feature)
        })
        .collect();
    FeatureCollection::new(features)
}

fn io_failure(path: &Path, err: &io::Error) -> ToolExecution {
    let code = match err.kind() {
        io::ErrorKind::NotFound => StatusCode::ResourceNotFound,
        io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
        _ => StatusCode::GeneralError,
    };
    log::warn!("AddData: {} nicht lesbar: {}", path.display(), err);
    ToolExecution::failed(code, format!("Datei {} nicht lesbar: {}", path.display(), err))
}

impl AddDataTool {
    fn import_geojson(&self, text: &str) -> Result<Value, ToolExecution> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            ToolExecution::failed(StatusCode::InvalidInput, format!("Ungültiges GeoJSON: {}", e))
        })?;
        GeoJson::from_value(&value).map_err(|e| {
            ToolExecution::failed(StatusCode::InvalidInput, format!("Ungültiges GeoJSON: {}", e))
        })?;
        Ok(value)
    }

    fn import_csv(&self, text: &str, params: &ParamValues) -> Result<Value, ToolExecution> {
        let rows = parse_csv(text);
        if rows.is_empty() {
            return Err(ToolExecution::failed(
                StatusCode::InvalidInput,
                "Keine Daten in der Datei.",
            ));
        }

        let (lat, lon) = if params.flag("Override Columns") {
            let lat = params.text("Lat Column");
            let lon = params.text("Long Column");
            (
                (!lat.trim().is_empty()).then_some(lat),
                (!lon.trim().is_empty()).then_some(lon),
            )
        } else {
            let headers: Vec<&str> = text
                .lines()
                .next()
                .map(|line| line.split(',').map(str::trim).collect())
                .unwrap_or_default();
            detect_coordinate_columns(&headers)
        };
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(ToolExecution::failed(
                StatusCode::InvalidInput,
                "Breiten-/Längengrad-Spalten nicht erkennbar.",
            ));
        };

        let total = rows.len();
        let collection = rows_to_points(rows, lat.trim(), lon.trim());
        if collection.features.len() < total {
            log::info!(
                "AddData: {} von {} Zeilen ohne gültige Koordinaten verworfen",
                total - collection.features.len(),
                total
            );
        }
        Ok(collection.to_value())
    }
}

impl MapTool for AddDataTool {
    fn key(&self) -> ToolKey {
        ToolKey::AddDataTool
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::AddDataTool,
            name: "Add Data",
            description: "Upload GeoJSON or tabular data (CSV/XLSX) with coordinates",
            parameters: vec![
                ParameterSpec::new("Input", "data to add", ParamKind::File, ""),
                ParameterSpec::new("Lat Column", "latitude column name", ParamKind::Dropdown, ""),
                ParameterSpec::new("Long Column", "longitude column name", ParamKind::Dropdown, ""),
                ParameterSpec::new(
                    "Override Columns",
                    "manually specify columns",
                    ParamKind::Boolean,
                    false,
                ),
            ],
        }
    }

    fn execute(&self, _ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let input = params.text("Input");
        if input.trim().is_empty() {
            return ToolExecution::failed(StatusCode::InvalidInput, "Keine Datei ausgewählt.");
        }
        let path = Path::new(input.trim());
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if extension == "xlsx" {
            return ToolExecution::failed(
                StatusCode::InvalidInput,
                "XLSX wird nicht unterstützt, bitte als CSV speichern.",
            );
        }
        if !matches!(extension.as_str(), "geojson" | "json" | "csv") {
            return ToolExecution::failed(
                StatusCode::InvalidInput,
                "Nicht unterstützter Dateityp. Erlaubt: .geojson, .json, .csv",
            );
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => return io_failure(path, &err),
        };

        let imported = if extension == "csv" {
            self.import_csv(&text, params)
        } else {
            self.import_geojson(&text)
        };

        match imported {
            Ok(value) => {
                log::info!("AddData: {} importiert", path.display());
                ToolExecution::new(
                    ToolStatus::success(format!("{} hinzugefügt.", path.display())),
                    ToolOutput::Apply(ToolResult::new().add(value)),
                )
            }
            Err(failed) => failed,
        }
    }
}
