//! Handler für Session-Verwaltung und Optionen.

use crate::app::diagnostics::LogDiagnostics;
use crate::app::tools::{StatusCode, ToolStatus};
use crate::app::AppState;
use crate::shared::SessionOptions;

/// Entfernt einen Layer per ID.
pub fn remove_layer(state: &mut AppState, id: &str) {
    let removed = state.session.remove_layer(id);
    state.session.sync_surface();
    state.status = Some(if removed {
        ToolStatus::success(format!("{} entfernt.", id))
    } else {
        ToolStatus::new(
            StatusCode::ResourceNotFound,
            format!("Layer {} nicht gefunden.", id),
        )
    });
}

/// Verwirft alle Layer.
pub fn reset(state: &mut AppState) {
    state.session.reset();
    state.last_outcome = None;
    state.status = None;
}

/// Übernimmt neue Optionen und persistiert sie in der Konfigurationsdatei.
///
/// Endpunkt und Zeitlimit des KI-Clients gelten ab dem nächsten Start.
pub fn apply_options(state: &mut AppState, options: SessionOptions) -> anyhow::Result<()> {
    state.options = options;
    state
        .session
        .set_diagnostics(Box::new(LogDiagnostics::new(state.options.verbose_diagnostics)));
    let path = SessionOptions::config_path();
    state.options.save_to_file(&path)
}

/// Setzt Optionen auf Standardwerte zurück und persistiert sie.
pub fn reset_options(state: &mut AppState) -> anyhow::Result<()> {
    apply_options(state, SessionOptions::default())
}

/// Fordert das Beenden an.
pub fn request_exit(state: &mut AppState) {
    state.should_exit = true;
}
