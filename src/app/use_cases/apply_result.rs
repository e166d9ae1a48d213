//! Use-Case: Tool-Ergebnis anwenden (Entfernen, dann Hinzufügen).

use crate::app::diagnostics::ItemStep;
use crate::app::session::LayerSession;
use crate::app::tool_result::{ApplyOutcome, ToolResult};
use crate::core::{FeatureHandle, RenderSurface, StableId, ToolMetadata, TOOL_METADATA_KEY};
use serde_json::Value;

/// Wendet ein JSON-`ToolResult` an. Ungültige Eingaben ändern nichts.
pub fn apply_result_value<S: RenderSurface>(
    session: &mut LayerSession<S>,
    payload: &Value,
) -> ApplyOutcome {
    match ToolResult::from_value(payload) {
        Ok(result) => apply_result(session, &result),
        Err(e) => {
            log::warn!("apply_result abgelehnt: {}", e);
            ApplyOutcome::rejected(&e)
        }
    }
}

/// Wendet ein `ToolResult` auf Registry, TOC und Surface an.
///
/// Entfernungen laufen vor Hinzufügungen, damit ein Feature, das eine
/// gerade entfernte ID wiederverwendet, frisch registriert wird. Ein
/// fehlerhaftes Element landet in `errors`, der Rest des Stapels läuft weiter.
pub fn apply_result<S: RenderSurface>(
    session: &mut LayerSession<S>,
    result: &ToolResult,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    for id in &result.remove_layer_ids {
        // Unbekannte IDs gelten als bereits entfernt
        if session.remove_layer(id.as_str()) {
            outcome.removed.push(id.clone());
        }
    }

    for (index, item) in result.add_geojson.iter().enumerate() {
        match add_item(session, item) {
            Ok(ids) => outcome.added.extend(ids),
            Err(message) => {
                session.report(ItemStep::Materialize, &format!("Element {}: {}", index, message));
                outcome.errors.push(message);
            }
        }
    }

    session.sync_surface();

    outcome.ok = outcome.errors.is_empty();
    if !result.is_empty() {
        log::info!(
            "apply_result: {} hinzugefügt, {} entfernt, {} Fehler",
            outcome.added.len(),
            outcome.removed.len(),
            outcome.errors.len()
        );
    }
    outcome
}

/// Materialisiert ein Element und nimmt jedes entstandene Handle in den Workspace auf.
fn add_item<S: RenderSurface>(
    session: &mut LayerSession<S>,
    item: &Value,
) -> Result<Vec<StableId>, String> {
    let materialized = session.surface.materialize(item);
    let handles = step(session, ItemStep::Materialize, materialized)?.unwrap_or_default();

    let top_level_metadata = item.get(TOOL_METADATA_KEY).filter(|v| !v.is_null());
    let mut ids = Vec::with_capacity(handles.len());

    for handle in handles {
        let preferred = handle.record().incoming_id();
        let id = session.register_layer(&handle, preferred.as_ref().map(StableId::as_str));
        // Deckt Surfaces ab, die eigene Properties beim Import verwerfen
        session.ensure_stable_id(&handle, Some(id.as_str()));

        attach_tool_metadata(session, &handle, top_level_metadata)?;

        let attached = session.surface.attach_to_map(&handle);
        step(session, ItemStep::MapAttach, attached)?;
        let attached = session.surface.attach_to_editable(&handle);
        step(session, ItemStep::EditableAttach, attached)?;

        session.toc.append(handle);
        ids.push(id);
    }

    Ok(ids)
}

/// Provenienz in der Reihenfolge Top-Level → Feature → `properties.toolMetadata`.
fn attach_tool_metadata<S: RenderSurface>(
    session: &LayerSession<S>,
    handle: &FeatureHandle,
    top_level: Option<&Value>,
) -> Result<(), String> {
    let candidate = {
        let record = handle.record();
        top_level
            .cloned()
            .or_else(|| record.source_metadata.clone())
            .or_else(|| {
                record
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(TOOL_METADATA_KEY))
                    .filter(|v| !v.is_null())
                    .cloned()
            })
    };
    let Some(candidate) = candidate else {
        return Ok(());
    };

    let parsed = serde_json::from_value::<ToolMetadata>(candidate);
    if let Some(metadata) = step(session, ItemStep::ToolMetadata, parsed)? {
        handle.record_mut().tool_metadata = Some(metadata);
    }
    Ok(())
}

/// Wendet die Entscheidungstabelle an: abbrechende Schritte liefern `Err`,
/// kosmetische werden gemeldet und ergeben `Ok(None)`.
fn step<S: RenderSurface, T, E: std::fmt::Display>(
    session: &LayerSession<S>,
    kind: ItemStep,
    result: Result<T, E>,
) -> Result<Option<T>, String> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if kind.aborts_item() => Err(e.to_string()),
        Err(e) => {
            session.report(kind, &e.to_string());
            Ok(None)
        }
    }
}
