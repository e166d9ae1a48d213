//! Export-Tool: Layer oder ganzen Workspace als GeoJSON-Download.

use super::params::{LayerFilter, ParamKind, ParamValues, ParameterSpec};
use super::{
    MapTool, StatusCode, ToolContext, ToolExecution, ToolKey, ToolOutput, ToolSpec, ToolStatus,
};
use crate::app::use_cases::export::{export_layer, export_workspace};

/// Dateiname beim Export des ganzen Workspaces.
pub const WORKSPACE_FILE_NAME: &str = "workspace.geojson";

/// Unterstützte Export-Formate.
const FORMATS: [&str; 1] = ["GeoJSON"];

/// Dateiname aus einer Layer-ID; alles außer `[A-Za-z0-9_-]` wird zu `_`.
fn layer_file_name(layer_id: &str) -> String {
    let stem: String = layer_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.geojson", stem)
}

/// Exportiert Features mit `properties.__id`.
#[derive(Debug, Default)]
pub struct ExportTool;

impl ExportTool {
    pub fn new() -> Self {
        Self
    }
}

impl MapTool for ExportTool {
    fn key(&self) -> ToolKey {
        ToolKey::ExportTool
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::ExportTool,
            name: "Export",
            description: "Export data",
            parameters: vec![
                ParameterSpec::new("Layer", "layer to export", ParamKind::Dropdown, "")
                    .layers(LayerFilter::Any),
                ParameterSpec::new("Format", "format to export", ParamKind::Dropdown, "geojson")
                    .with_options(&FORMATS),
            ],
        }
    }

    fn execute(&self, ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let format = params.text("Format");
        let format = if format.trim().is_empty() { "geojson".to_owned() } else { format };
        if !FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format.trim())) {
            return ToolExecution::failed(
                StatusCode::InvalidInput,
                format!("Format {} wird nicht unterstützt.", format),
            );
        }

        let layer_id = params.text("Layer");
        let (file_name, contents) = if layer_id.is_empty() {
            let collection = export_workspace(ctx.session);
            log::info!("Export: Workspace mit {} Features", collection.features.len());
            (WORKSPACE_FILE_NAME.to_owned(), collection.to_value())
        } else {
            let Some(feature) = export_layer(ctx.session, &layer_id) else {
                return ToolExecution::failed(StatusCode::InvalidInput, "Kein Layer ausgewählt.");
            };
            log::info!("Export: Layer {}", layer_id);
            (layer_file_name(&layer_id), feature.to_value())
        };

        ToolExecution::new(
            ToolStatus::success(format!("{} exportiert.", file_name)),
            ToolOutput::Export { file_name, contents },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::session::LayerSession;
    use crate::app::tool_result::ToolResult;
    use crate::app::tools::ToolSettings;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn run(session: &LayerSession, params: &ParamValues) -> ToolExecution {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctx = ToolContext {
            session,
            layers: &[],
            view: None,
            rng: &mut rng,
            settings: ToolSettings::default(),
        };
        ExportTool::new().execute(&mut ctx, params)
    }

    fn session_with_two() -> (LayerSession, Vec<String>) {
        let mut session = LayerSession::default();
        let outcome = session.apply_result(
            &ToolResult::new()
                .add(json!({ "type": "Point", "coordinates": [1.0, 2.0] }))
                .add(json!({ "type": "Point", "coordinates": [3.0, 4.0] })),
        );
        let ids = outcome.added.iter().map(|id| id.to_string()).collect();
        (session, ids)
    }

    #[test]
    fn single_layer_export_uses_id_as_file_name() {
        let (session, ids) = session_with_two();
        let execution = run(
            &session,
            &ParamValues::new().with("Layer", ids[1].as_str()).with("Format", "GeoJSON"),
        );
        let ToolOutput::Export { file_name, contents } = execution.output else {
            panic!("Export-Ausgabe erwartet");
        };
        assert_eq!(file_name, format!("{}.geojson", ids[1]));
        assert_eq!(contents["properties"]["__id"], json!(ids[1]));
    }

    #[test]
    fn imported_id_with_path_parts_yields_flat_file_name() {
        let mut session = LayerSession::default();
        session.apply_result(&ToolResult::new().add(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "properties": { "__id": "../escaped" }
        })));

        let execution = run(&session, &ParamValues::new().with("Layer", "../escaped"));

        let ToolOutput::Export { file_name, contents } = execution.output else {
            panic!("Export-Ausgabe erwartet");
        };
        assert_eq!(file_name, "___escaped.geojson");
        assert_eq!(contents["properties"]["__id"], "../escaped");
    }

    #[test]
    fn empty_layer_exports_workspace() {
        let (session, ids) = session_with_two();
        let execution = run(&session, &ParamValues::new());
        let ToolOutput::Export { file_name, contents } = execution.output else {
            panic!("Export-Ausgabe erwartet");
        };
        assert_eq!(file_name, WORKSPACE_FILE_NAME);
        assert_eq!(contents["type"], "FeatureCollection");
        assert_eq!(contents["features"][0]["properties"]["__id"], json!(ids[0]));
        assert_eq!(contents["features"][1]["properties"]["__id"], json!(ids[1]));
    }

    #[test]
    fn unknown_format_and_layer_are_invalid_input() {
        let (session, _) = session_with_two();
        let kml = run(&session, &ParamValues::new().with("Format", "kml"));
        assert_eq!(kml.status.code, StatusCode::InvalidInput);

        let missing = run(&session, &ParamValues::new().with("Layer", "fehlt"));
        assert_eq!(missing.status.code, StatusCode::InvalidInput);
    }
}
