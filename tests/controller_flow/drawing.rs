use super::{parse_intent, test_state};
use geosketch::app::StatusCode;
use geosketch::{AppController, AppIntent, AppState, DrawKind, Geometry, RenderSurface};

fn draw_square(controller: &mut AppController, state: &mut AppState) -> String {
    controller
        .handle_intent(
            state,
            parse_intent(
                r#"{"intent":"FeatureDrawn","kind":"polygon","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}"#,
            ),
        )
        .expect("FeatureDrawn sollte ohne Fehler durchlaufen");
    state.session.list_layers()[0].id.to_string()
}

#[test]
fn test_drawn_polygon_reports_vertices_and_joins_workspace() {
    let mut controller = AppController::new();
    let mut state = test_state("draw");

    let id = draw_square(&mut controller, &mut state);

    let status = state.status.as_ref().expect("Status erwartet");
    assert_eq!(status.code, StatusCode::Success);
    assert_eq!(status.message, format!("{} polygon (4 vertices)", id));
    let handle = state.session.get_layer(&id).expect("Layer erwartet");
    assert!(state.session.surface().has_on_map(&handle));
    assert!(state.session.surface().has_in_editable(&handle));
}

#[test]
fn test_drawn_marker_message_is_bare_id() {
    let mut controller = AppController::new();
    let mut state = test_state("draw-marker");

    controller
        .handle_intent(
            &mut state,
            AppIntent::FeatureDrawn {
                kind: DrawKind::Marker,
                geometry: Geometry::point(1.0, 2.0),
            },
        )
        .expect("FeatureDrawn sollte ohne Fehler durchlaufen");

    let id = state.session.list_layers()[0].id.to_string();
    let status = state.status.as_ref().expect("Status erwartet");
    assert_eq!(status.message, id);
}

#[test]
fn test_edit_keeps_id_and_replaces_geometry() {
    let mut controller = AppController::new();
    let mut state = test_state("edit");
    let id = draw_square(&mut controller, &mut state);

    controller
        .handle_intent(
            &mut state,
            AppIntent::FeatureEdited {
                id: id.clone(),
                geometry: Geometry::LineString {
                    coordinates: vec![vec![0.0, 0.0], vec![2.0, 2.0], vec![3.0, 1.0]],
                },
            },
        )
        .expect("FeatureEdited sollte ohne Fehler durchlaufen");

    let layers = state.session.list_layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].id.as_str(), id);
    assert_eq!(layers[0].geometry_type.as_deref(), Some("LineString"));
    let status = state.status.as_ref().expect("Status erwartet");
    assert_eq!(status.message, format!("{} (3 vertices)", id));
}

#[test]
fn test_edit_of_unknown_id_is_resource_not_found() {
    let mut controller = AppController::new();
    let mut state = test_state("edit-unknown");

    controller
        .handle_intent(
            &mut state,
            AppIntent::FeatureEdited {
                id: "gibt-es-nicht".into(),
                geometry: Geometry::point(0.0, 0.0),
            },
        )
        .expect("FeatureEdited sollte ohne Fehler durchlaufen");

    let status = state.status.as_ref().expect("Status erwartet");
    assert_eq!(status.code, StatusCode::ResourceNotFound);
    assert_eq!(state.layer_count(), 0);
}

#[test]
fn test_delete_removes_from_map_toc_and_registry() {
    let mut controller = AppController::new();
    let mut state = test_state("delete");
    let id = draw_square(&mut controller, &mut state);
    let handle = state.session.get_layer(&id).expect("Layer erwartet");

    controller
        .handle_intent(&mut state, AppIntent::FeatureDeleted { id: id.clone() })
        .expect("FeatureDeleted sollte ohne Fehler durchlaufen");

    assert!(state.session.get_layer(&id).is_none());
    assert_eq!(state.layer_count(), 0);
    assert!(!state.session.surface().has_on_map(&handle));
    assert!(!state.session.surface().has_in_editable(&handle));

    controller
        .handle_intent(&mut state, AppIntent::FeatureDeleted { id })
        .expect("FeatureDeleted sollte ohne Fehler durchlaufen");
    let status = state.status.as_ref().expect("Status erwartet");
    assert_eq!(status.code, StatusCode::ResourceNotFound);
}
