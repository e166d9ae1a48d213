use super::{add_points, export_dir, parse_intent, test_state, test_state_with_ai};
use geosketch::app::tools::ParamValues;
use geosketch::app::{AiError, StatusCode, ToolKey};
use geosketch::core::geometry;
use geosketch::{AppCommand, AppController, AppIntent, BoundingBox, RenderSurface};
use serde_json::{json, Value};
use std::time::Duration;

fn execute(
    controller: &mut AppController,
    state: &mut geosketch::AppState,
    key: ToolKey,
    params: ParamValues,
) {
    controller
        .handle_intent(
            state,
            AppIntent::ToolExecuteRequested {
                key: Some(key),
                params,
            },
        )
        .expect("ToolExecuteRequested sollte ohne Fehler durchlaufen");
}

fn status_code(state: &geosketch::AppState) -> StatusCode {
    state.status.as_ref().expect("Status erwartet").code
}

fn read_json(path: &std::path::Path) -> Value {
    let text = std::fs::read_to_string(path).expect("Export-Datei erwartet");
    serde_json::from_str(&text).expect("Export sollte gültiges JSON sein")
}

#[test]
fn test_random_points_on_active_tool_stay_inside_view() {
    let mut controller = AppController::new();
    let mut state = test_state("random-points");
    controller
        .handle_intent(
            &mut state,
            AppIntent::ToolSelected {
                key: ToolKey::RandomPointsTool,
            },
        )
        .expect("ToolSelected sollte ohne Fehler durchlaufen");

    controller
        .handle_intent(
            &mut state,
            parse_intent(r#"{"intent":"ToolExecuteRequested","params":{"Points Count":5}}"#),
        )
        .expect("ToolExecuteRequested sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::Success);
    assert_eq!(state.layer_count(), 5);
    let view = state.session.surface().view_bounds().expect("Ausschnitt erwartet");
    for entry in state.session.list_layers() {
        let handle = state.session.get_layer(entry.id.as_str()).expect("Layer erwartet");
        let record = handle.record();
        let center = record
            .geometry
            .as_ref()
            .and_then(geometry::centroid)
            .expect("Punkt erwartet");
        assert!(view.contains(center));
        assert_eq!(
            record.tool_metadata.as_ref().map(|m| m.name.as_str()),
            Some("Random Points")
        );
    }
}

#[test]
fn test_execute_without_active_tool_is_ignored() {
    let mut controller = AppController::new();
    let mut state = test_state("no-tool");

    controller
        .handle_intent(&mut state, parse_intent(r#"{"intent":"ToolExecuteRequested"}"#))
        .expect("ToolExecuteRequested sollte ohne Fehler durchlaufen");

    assert!(state.command_log.is_empty());
    assert!(state.status.is_none());
}

#[test]
fn test_buffer_from_json_intent_adds_polygon_layer() {
    let mut controller = AppController::new();
    let mut state = test_state("buffer");
    let ids = add_points(&mut controller, &mut state, &[[-110.9, 32.2]]);

    let line = format!(
        r#"{{"intent":"ToolExecuteRequested","key":"BufferTool","params":{{"Input Layer":"{}","Distance":1,"Units":"kilometers"}}}}"#,
        ids[0]
    );
    controller
        .handle_intent(&mut state, parse_intent(&line))
        .expect("ToolExecuteRequested sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::Success);
    let layers = state.session.list_layers();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[1].geometry_type.as_deref(), Some("Polygon"));
    assert_ne!(layers[1].id.as_str(), ids[0]);
}

#[test]
fn test_buffer_without_layer_reports_invalid_input() {
    let mut controller = AppController::new();
    let mut state = test_state("buffer-invalid");

    execute(
        &mut controller,
        &mut state,
        ToolKey::BufferTool,
        ParamValues::new().with("Distance", 1),
    );

    assert_eq!(status_code(&state), StatusCode::InvalidInput);
    assert_eq!(state.layer_count(), 0);
}

#[test]
fn test_export_writes_workspace_with_ids() {
    let mut controller = AppController::new();
    let mut state = test_state("export");
    let ids = add_points(&mut controller, &mut state, &[[1.0, 1.0], [2.0, 2.0]]);

    execute(&mut controller, &mut state, ToolKey::ExportTool, ParamValues::new());

    assert_eq!(status_code(&state), StatusCode::Success);
    let path = state.exports.last().expect("Export-Pfad erwartet");
    assert!(path.ends_with("workspace.geojson"));
    let exported = read_json(path);
    let exported_ids: Vec<&str> = exported["features"]
        .as_array()
        .expect("Feature-Liste erwartet")
        .iter()
        .filter_map(|f| f["properties"]["__id"].as_str())
        .collect();
    assert_eq!(exported_ids, ids.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_export_of_unknown_layer_writes_nothing() {
    let mut controller = AppController::new();
    let mut state = test_state("export-unknown");

    execute(
        &mut controller,
        &mut state,
        ToolKey::ExportTool,
        ParamValues::new().with("Layer", "gibt-es-nicht"),
    );

    assert_eq!(status_code(&state), StatusCode::InvalidInput);
    assert!(state.exports.is_empty());
}

#[test]
fn test_export_write_failure_sets_execution_failed() {
    let mut controller = AppController::new();
    let mut state = test_state("export-blocked");
    add_points(&mut controller, &mut state, &[[1.0, 1.0]]);
    // Export-Verzeichnis ist eine Datei
    let blocker = export_dir("export-blocked-file");
    std::fs::write(&blocker, "kein Verzeichnis").expect("Datei anlegen erwartet");
    state.options.export_dir = blocker.clone();

    execute(&mut controller, &mut state, ToolKey::ExportTool, ParamValues::new());

    assert_eq!(status_code(&state), StatusCode::ExecutionFailed);
    assert!(state.exports.is_empty());
    assert_eq!(state.layer_count(), 1);
    let _ = std::fs::remove_file(blocker);
}

#[test]
fn test_export_of_imported_id_stays_inside_export_dir() {
    let mut controller = AppController::new();
    let mut state = test_state("export-escape");
    controller
        .handle_intent(
            &mut state,
            AppIntent::ApplyResultRequested {
                result: json!({
                    "addGeojson": {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [1, 1] },
                        "properties": { "__id": "../escaped" }
                    }
                }),
            },
        )
        .expect("ApplyResultRequested sollte ohne Fehler durchlaufen");

    execute(
        &mut controller,
        &mut state,
        ToolKey::ExportTool,
        ParamValues::new().with("Layer", "../escaped"),
    );

    assert_eq!(status_code(&state), StatusCode::Success);
    let dir = state.options.export_dir.clone();
    let path = state.exports.last().expect("Export-Pfad erwartet");
    assert_eq!(path.parent(), Some(dir.as_path()));
    let parent = dir.parent().expect("Elternverzeichnis erwartet");
    assert!(!parent.join("escaped.geojson").exists());
    assert_eq!(read_json(path)["properties"]["__id"], json!("../escaped"));
}

#[test]
fn test_group_labels_nearby_features_together() {
    let mut controller = AppController::new();
    let mut state = test_state("group");
    add_points(
        &mut controller,
        &mut state,
        &[[0.0, 0.0], [0.001, 0.0], [5.0, 5.0]],
    );

    execute(
        &mut controller,
        &mut state,
        ToolKey::GroupTool,
        ParamValues::new()
            .with("Distance", 1)
            .with("Units", "kilometers"),
    );

    assert_eq!(status_code(&state), StatusCode::Success);
    let path = state.exports.last().expect("Export-Pfad erwartet");
    assert!(path.ends_with("grouped.geojson"));
    let grouped = read_json(path);
    let groups: Vec<&Value> = grouped["features"]
        .as_array()
        .expect("Feature-Liste erwartet")
        .iter()
        .map(|f| &f["properties"]["group"])
        .collect();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0], groups[1]);
    assert_ne!(groups[0], groups[2]);
    // Gruppieren verändert den Workspace nicht
    assert_eq!(state.layer_count(), 3);
}

#[test]
fn test_add_data_imports_csv_rows_as_points() {
    let mut controller = AppController::new();
    let mut state = test_state("add-data");
    let dir = export_dir("add-data-input");
    std::fs::create_dir_all(&dir).expect("Temp-Verzeichnis erwartet");
    let csv = dir.join("brunnen.csv");
    std::fs::write(&csv, "name,lat,lon\nA,32.2,-110.9\nB,32.3,-111.0\n")
        .expect("CSV-Datei erwartet");

    execute(
        &mut controller,
        &mut state,
        ToolKey::AddDataTool,
        ParamValues::new().with("Input", csv.to_string_lossy().to_string()),
    );

    assert_eq!(status_code(&state), StatusCode::Success);
    let layers = state.session.list_layers();
    assert_eq!(layers.len(), 2);
    assert!(layers.iter().all(|l| l.geometry_type.as_deref() == Some("Point")));
}

#[test]
fn test_ai_reply_is_applied_after_background_drain() {
    let reply = json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 1] }, "properties": {} },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2, 2] }, "properties": {} }
        ]
    });
    let mut controller = AppController::new();
    let mut state = test_state_with_ai("ai", Ok(reply));

    execute(
        &mut controller,
        &mut state,
        ToolKey::GenerateAiFeatures,
        ParamValues::new().with("Prompt", "zwei Punkte"),
    );
    assert_eq!(state.ai.in_flight(), 1);
    assert_eq!(state.layer_count(), 0);

    let applied = controller
        .drain_background_blocking(&mut state, Duration::from_secs(5))
        .expect("Drain sollte ohne Fehler durchlaufen");

    assert_eq!(applied, 1);
    assert_eq!(state.layer_count(), 2);
    assert_eq!(status_code(&state), StatusCode::Success);
    assert!(matches!(
        state.command_log.last(),
        Some(AppCommand::ApplyAiReply { .. })
    ));
}

#[test]
fn test_ai_timeout_sets_timeout_status() {
    let mut controller = AppController::new();
    let mut state =
        test_state_with_ai("ai-timeout", Err(AiError::Timeout(Duration::from_secs(30))));

    execute(
        &mut controller,
        &mut state,
        ToolKey::GenerateAiFeatures,
        ParamValues::new().with("Prompt", "irgendwas"),
    );
    controller
        .drain_background_blocking(&mut state, Duration::from_secs(5))
        .expect("Drain sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::Timeout);
    assert_eq!(state.layer_count(), 0);
}

#[test]
fn test_malformed_ai_feature_is_not_reported_as_success() {
    let reply = json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": "bad" }
    });
    let mut controller = AppController::new();
    let mut state = test_state_with_ai("ai-malformed", Ok(reply));

    execute(
        &mut controller,
        &mut state,
        ToolKey::GenerateAiFeatures,
        ParamValues::new().with("Prompt", "kaputter Punkt"),
    );
    controller
        .drain_background_blocking(&mut state, Duration::from_secs(5))
        .expect("Drain sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::ExecutionFailed);
    assert_eq!(state.layer_count(), 0);
    let outcome = state.last_outcome.as_ref().expect("Ergebnis erwartet");
    assert!(!outcome.ok);
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn test_empty_ai_collection_is_not_reported_as_success() {
    let mut controller = AppController::new();
    let mut state = test_state_with_ai(
        "ai-empty",
        Ok(json!({ "type": "FeatureCollection", "features": [] })),
    );
    add_points(&mut controller, &mut state, &[[1.0, 1.0]]);

    execute(
        &mut controller,
        &mut state,
        ToolKey::GenerateAiFeatures,
        ParamValues::new().with("Prompt", "nichts"),
    );
    controller
        .drain_background_blocking(&mut state, Duration::from_secs(5))
        .expect("Drain sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::ExecutionFailed);
    assert_eq!(state.layer_count(), 1);
}

#[test]
fn test_remove_layer_request_clears_registry_entry() {
    let mut controller = AppController::new();
    let mut state = test_state("remove");
    let ids = add_points(&mut controller, &mut state, &[[1.0, 1.0], [2.0, 2.0]]);

    controller
        .handle_intent(
            &mut state,
            AppIntent::RemoveLayerRequested { id: ids[0].clone() },
        )
        .expect("RemoveLayerRequested sollte ohne Fehler durchlaufen");

    assert_eq!(status_code(&state), StatusCode::Success);
    assert!(state.session.get_layer(&ids[0]).is_none());
    assert_eq!(state.layer_count(), 1);

    controller
        .handle_intent(
            &mut state,
            AppIntent::RemoveLayerRequested { id: ids[0].clone() },
        )
        .expect("RemoveLayerRequested sollte ohne Fehler durchlaufen");
    assert_eq!(status_code(&state), StatusCode::ResourceNotFound);
}

#[test]
fn test_view_change_moves_random_points() {
    let mut controller = AppController::new();
    let mut state = test_state("view");
    controller
        .handle_intent(
            &mut state,
            AppIntent::ViewChanged {
                bounds: [10.0, 50.0, 11.0, 51.0],
            },
        )
        .expect("ViewChanged sollte ohne Fehler durchlaufen");

    execute(
        &mut controller,
        &mut state,
        ToolKey::RandomPointsTool,
        ParamValues::new().with("Points Count", 3),
    );

    let view = BoundingBox::from_array([10.0, 50.0, 11.0, 51.0]);
    let layers = state.session.list_layers();
    assert_eq!(layers.len(), 3);
    for entry in layers {
        let handle = state.session.get_layer(entry.id.as_str()).expect("Layer erwartet");
        let center = handle
            .record()
            .geometry
            .as_ref()
            .and_then(geometry::centroid)
            .expect("Punkt erwartet");
        assert!(view.contains(center));
    }
}
