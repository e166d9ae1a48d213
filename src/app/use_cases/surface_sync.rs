//! Use-Case: Registry/TOC mit Ereignissen des Zeichen-Surface abgleichen.

use crate::app::diagnostics::ItemStep;
use crate::app::registry::LayerRef;
use crate::app::session::LayerSession;
use crate::core::{DrawKind, FeatureHandle, FeatureRecord, Geometry, RenderSurface, StableId};

/// Ergebnis eines Zeichen-Ereignisses (für Statuszeile und TOC-Text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub id: StableId,
    pub message: String,
}

/// Ein Feature wurde von der Karte genommen.
///
/// Nur wenn es weder auf der Karte noch in der Zeichen-Gruppe liegt, wird
/// der Registry-Eintrag entfernt; sonst ist es ein Zwischenzustand.
pub fn on_layer_removed<S: RenderSurface>(session: &mut LayerSession<S>, handle: &FeatureHandle) {
    let Some(id) = handle.stable_id() else {
        return;
    };
    if session.surface.has_on_map(handle) || session.surface.has_in_editable(handle) {
        log::debug!("Layer {} noch vorhanden, Entfernen ignoriert", id);
        return;
    }
    if session.unregister_layer(LayerRef::Handle(handle)).is_some() {
        log::debug!("Layer {} nach Entfernen von der Karte abgemeldet", id);
    }
}

/// Ein Feature wurde auf die Karte gelegt. Tool-Ergebnisse kommen in den TOC.
pub fn on_layer_added<S: RenderSurface>(session: &mut LayerSession<S>, handle: &FeatureHandle) {
    let (has_metadata, preferred) = {
        let record = handle.record();
        (
            record.tool_metadata.is_some() || record.source_metadata.is_some(),
            record.incoming_id(),
        )
    };
    if !has_metadata {
        return;
    }
    let id = session.register_layer(handle, preferred.as_ref().map(StableId::as_str));
    if session.toc.append(handle.clone()) {
        log::debug!("Tool-Layer {} in den TOC aufgenommen", id);
    }
}

/// Eckpunkte, wie sie die Zeichensteuerung zählt (Ringe ohne Schlusspunkt).
fn drawn_vertex_count(geometry: &Geometry) -> usize {
    match geometry {
        Geometry::Polygon { coordinates } => coordinates.first().map_or(0, |ring| {
            let closed = ring.len() > 1 && ring.first() == ring.last();
            ring.len() - usize::from(closed)
        }),
        other => other.vertex_count(),
    }
}

/// Neues, von Hand gezeichnetes Feature.
pub fn on_draw_created<S: RenderSurface>(
    session: &mut LayerSession<S>,
    geometry: Geometry,
    kind: DrawKind,
) -> DrawOutcome {
    let vertices = drawn_vertex_count(&geometry);
    let handle = FeatureHandle::new(FeatureRecord::drawn(geometry, kind));

    let attached = session.surface.attach_to_editable(&handle);
    if let Err(e) = attached {
        session.report(ItemStep::EditableAttach, &e.to_string());
    }
    let attached = session.surface.attach_to_map(&handle);
    if let Err(e) = attached {
        session.report(ItemStep::MapAttach, &e.to_string());
    }

    let id = session.register_layer(&handle, None);
    session.toc.append(handle);
    session.sync_surface();

    let message = match kind {
        DrawKind::Marker => id.to_string(),
        _ => format!("{} {} ({} vertices)", id, kind.as_str(), vertices),
    };
    log::info!("Gezeichnet: {}", message);
    DrawOutcome { id, message }
}

/// Geometrie eines bestehenden Features wurde bearbeitet. ID bleibt erhalten.
pub fn on_draw_edited<S: RenderSurface>(
    session: &mut LayerSession<S>,
    id: &str,
    geometry: Geometry,
) -> Option<DrawOutcome> {
    let handle = session.get_layer(id)?;
    let vertices = drawn_vertex_count(&geometry);
    handle.set_geometry(geometry);

    let id = session.register_layer(&handle, None);
    session.toc.append(handle);
    session.sync_surface();

    let message = format!("{} ({} vertices)", id, vertices);
    log::info!("Bearbeitet: {}", message);
    Some(DrawOutcome { id, message })
}

/// Feature wurde mit dem Lösch-Werkzeug entfernt.
pub fn on_draw_deleted<S: RenderSurface>(session: &mut LayerSession<S>, id: &str) -> bool {
    let Some(handle) = session.get_layer(id) else {
        log::warn!("Löschen: Layer {} unbekannt", id);
        return false;
    };
    let detached = session.surface.detach_from_editable(&handle);
    if let Err(e) = detached {
        session.report(ItemStep::EditableDetach, &e.to_string());
    }
    let removed = session.remove_layer(id);
    session.sync_surface();
    log::info!("Gelöscht: {}", id);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tool_result::ToolResult;
    use crate::core::MemorySurface;
    use serde_json::json;

    fn square() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0],
            ]],
        }
    }

    #[test]
    fn draw_created_registers_and_lists() {
        let mut session = LayerSession::default();
        let outcome = on_draw_created(&mut session, square(), DrawKind::Polygon);

        assert_eq!(
            outcome.message,
            format!("{} polygon (4 vertices)", outcome.id)
        );
        let handle = session.get_layer(outcome.id.as_str()).expect("Layer erwartet");
        assert!(session.toc().contains(&handle));
        assert!(session.surface().has_in_editable(&handle));
    }

    #[test]
    fn marker_message_is_bare_id() {
        let mut session = LayerSession::default();
        let outcome = on_draw_created(&mut session, Geometry::point(1.0, 1.0), DrawKind::Marker);
        assert_eq!(outcome.message, outcome.id.to_string());
    }

    #[test]
    fn edit_keeps_id_and_toc_entry() {
        let mut session = LayerSession::default();
        let created = on_draw_created(&mut session, square(), DrawKind::Polygon);

        let edited = on_draw_edited(&mut session, created.id.as_str(), Geometry::point(2.0, 2.0))
            .expect("Edit erwartet");

        assert_eq!(edited.id, created.id);
        assert_eq!(session.toc().len(), 1);
        let handle = session.get_layer(created.id.as_str()).expect("Layer erwartet");
        assert_eq!(handle.record().geometry, Some(Geometry::point(2.0, 2.0)));
    }

    #[test]
    fn delete_removes_everywhere() {
        let mut session = LayerSession::default();
        let created = on_draw_created(&mut session, square(), DrawKind::Rectangle);

        assert!(on_draw_deleted(&mut session, created.id.as_str()));

        assert!(session.get_layer(created.id.as_str()).is_none());
        assert!(session.toc().is_empty());
        assert!(session.surface().map_layers().is_empty());
        assert!(!on_draw_deleted(&mut session, created.id.as_str()));
    }

    #[test]
    fn removal_listener_ignores_features_still_in_editable_group() {
        let mut session = LayerSession::default();
        let created = on_draw_created(&mut session, square(), DrawKind::Polygon);
        let handle = session.get_layer(created.id.as_str()).expect("Layer erwartet");

        // Direkt von der Karte genommen, aber noch in der Zeichen-Gruppe
        session.surface_mut().detach_from_map(&handle).expect("Entfernen erwartet");
        session.sync_surface();
        assert!(session.get_layer(created.id.as_str()).is_some());

        session
            .surface_mut()
            .detach_from_editable(&handle)
            .expect("Entfernen erwartet");
        on_layer_removed(&mut session, &handle);
        assert!(session.get_layer(created.id.as_str()).is_none());
    }

    #[test]
    fn layer_added_with_metadata_joins_toc() {
        let mut session = LayerSession::default();
        let feature = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0, 0] },
            "properties": { "__id": "aus-export" },
            "toolMetadata": { "name": "Buffer", "parameters": [] }
        });
        let handle = session
            .surface_mut()
            .materialize(&feature)
            .expect("Handle erwartet")
            .remove(0);

        on_layer_added(&mut session, &handle);

        assert_eq!(session.get_layer("aus-export"), Some(handle.clone()));
        assert!(session.toc().contains(&handle));
        // Zweites Event ist idempotent
        on_layer_added(&mut session, &handle);
        assert_eq!(session.toc().len(), 1);
        assert!(session.apply_result(&ToolResult::new()).ok);
    }
}
