//! Handler für Zeichen-Ereignisse und den Kartenausschnitt.

use crate::app::tools::{StatusCode, ToolStatus};
use crate::app::use_cases::surface_sync;
use crate::app::AppState;
use crate::core::{BoundingBox, DrawKind, Geometry};

/// Übernimmt ein neu gezeichnetes Feature.
pub fn create(state: &mut AppState, kind: DrawKind, geometry: Geometry) {
    let outcome = surface_sync::on_draw_created(&mut state.session, geometry, kind);
    state.status = Some(ToolStatus::success(outcome.message));
}

/// Ersetzt die Geometrie eines Features.
pub fn edit(state: &mut AppState, id: &str, geometry: Geometry) {
    state.status = Some(match surface_sync::on_draw_edited(&mut state.session, id, geometry) {
        Some(outcome) => ToolStatus::success(outcome.message),
        None => ToolStatus::new(
            StatusCode::ResourceNotFound,
            format!("Layer {} nicht gefunden.", id),
        ),
    });
}

/// Löscht ein gezeichnetes Feature.
pub fn delete(state: &mut AppState, id: &str) {
    state.status = Some(if surface_sync::on_draw_deleted(&mut state.session, id) {
        ToolStatus::success(format!("{} gelöscht.", id))
    } else {
        ToolStatus::new(
            StatusCode::ResourceNotFound,
            format!("Layer {} nicht gefunden.", id),
        )
    });
}

/// Setzt den Kartenausschnitt.
pub fn set_view(state: &mut AppState, bounds: [f64; 4]) {
    state
        .session
        .surface_mut()
        .set_view(BoundingBox::from_array(bounds));
}
