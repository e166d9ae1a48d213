//! Handler für Tool-Auswahl, Tool-Ausführung und Ergebnis-Anwendung.

use crate::app::ai_client::AiReply;
use crate::app::tool_result::ToolResult;
use crate::app::tools::{ParamValues, StatusCode, ToolContext, ToolKey, ToolOutput, ToolStatus};
use crate::app::use_cases;
use crate::app::AppState;
use crate::core::RenderSurface;
use serde_json::Value;

/// Aktiviert ein Tool.
pub fn activate(state: &mut AppState, key: ToolKey) {
    if state.tools.set_active(key) {
        log::info!("Tool aktiviert: {}", key.as_str());
    }
}

/// Deaktiviert das aktive Tool.
pub fn deactivate(state: &mut AppState) {
    state.tools.reset();
}

/// Führt ein Tool aus und verarbeitet seine Ausgabe.
pub fn execute(state: &mut AppState, key: ToolKey, params: ParamValues) -> anyhow::Result<()> {
    let layers = state.session.list_layers();
    let settings = state.tool_settings();
    let view = state.session.surface().view_bounds();

    let Some(tool) = state.tools.get(key) else {
        anyhow::bail!("Tool {} nicht registriert", key.as_str());
    };
    let mut ctx = ToolContext {
        session: &state.session,
        layers: &layers,
        view,
        rng: &mut state.rng,
        settings,
    };
    let execution = tool.execute(&mut ctx, &params);
    log::info!(
        "Tool {} ausgeführt: [{}] {}",
        key.as_str(),
        execution.status.code.code(),
        execution.status.message
    );
    state.status = Some(execution.status);

    match execution.output {
        ToolOutput::Apply(result) => apply(state, &result),
        ToolOutput::Export {
            file_name,
            contents,
        } => {
            match use_cases::export::write_export(&state.options.export_dir, &file_name, &contents)
            {
                Ok(path) => state.exports.push(path),
                Err(err) => {
                    log::warn!("Export {} fehlgeschlagen: {:#}", file_name, err);
                    state.status = Some(ToolStatus::new(
                        StatusCode::ExecutionFailed,
                        format!("{:#}", err),
                    ));
                }
            }
        }
        ToolOutput::AiRequest { prompt } => state.ai.request(prompt),
        ToolOutput::None => {}
    }
    Ok(())
}

/// Wendet ein Tool-Ergebnis in JSON-Form an (Agent, Treiber).
pub fn apply_payload(state: &mut AppState, payload: &Value) {
    let outcome = state.session.apply_result_value(payload);
    if !outcome.ok {
        state.status = Some(ToolStatus::new(
            StatusCode::InvalidInput,
            outcome.errors.join("; "),
        ));
    }
    state.last_outcome = Some(outcome);
}

/// Übernimmt eine Antwort des KI-Endpunkts.
pub fn apply_ai_reply(state: &mut AppState, reply: AiReply) {
    match reply.result {
        Ok(geojson) => {
            apply(state, &ToolResult::new().add(geojson));
            let status = match state.last_outcome.as_ref() {
                Some(outcome) if outcome.ok && !outcome.added.is_empty() => {
                    ToolStatus::success(format!(
                        "{} KI-Features für \"{}\" hinzugefügt.",
                        outcome.added.len(),
                        reply.prompt
                    ))
                }
                Some(outcome) if !outcome.errors.is_empty() => ToolStatus::new(
                    StatusCode::ExecutionFailed,
                    format!(
                        "{} KI-Features für \"{}\" hinzugefügt, Fehler: {}",
                        outcome.added.len(),
                        reply.prompt,
                        outcome.errors.join("; ")
                    ),
                ),
                _ => ToolStatus::new(
                    StatusCode::ExecutionFailed,
                    format!("KI-Antwort für \"{}\" enthielt keine Features.", reply.prompt),
                ),
            };
            if !status.code.is_success() {
                log::warn!("KI-Antwort unvollständig angewendet: {}", status.message);
            }
            state.status = Some(status);
        }
        Err(err) => {
            log::warn!("KI-Anfrage \"{}\" fehlgeschlagen: {}", reply.prompt, err);
            state.status = Some(ToolStatus::new(err.status_code(), err.to_string()));
        }
    }
}

fn apply(state: &mut AppState, result: &ToolResult) {
    let outcome = state.session.apply_result(result);
    if outcome.added.is_empty() && !outcome.errors.is_empty() {
        state.status = Some(ToolStatus::new(
            StatusCode::ExecutionFailed,
            outcome.errors.join("; "),
        ));
    }
    state.last_outcome = Some(outcome);
}
