//! Mapping von Intents auf mutierende App-Commands.

use super::{AppCommand, AppIntent, AppState};

/// Übersetzt einen `AppIntent` in eine Sequenz ausführbarer `AppCommand`s.
pub fn map_intent_to_commands(state: &AppState, intent: AppIntent) -> Vec<AppCommand> {
    match intent {
        AppIntent::ToolSelected { key } => vec![AppCommand::ActivateTool { key }],
        AppIntent::ToolClosed => vec![AppCommand::DeactivateTool],
        AppIntent::ToolExecuteRequested { key, params } => {
            match key.or_else(|| state.tools.active_key()) {
                Some(key) => vec![AppCommand::ExecuteTool { key, params }],
                None => {
                    log::warn!("Tool-Ausführung ohne aktives Tool ignoriert");
                    Vec::new()
                }
            }
        }
        AppIntent::ApplyResultRequested { result } => {
            vec![AppCommand::ApplyToolResult { payload: result }]
        }
        AppIntent::RemoveLayerRequested { id } => vec![AppCommand::RemoveLayer { id }],
        AppIntent::FeatureDrawn { kind, geometry } => {
            vec![AppCommand::CreateDrawnFeature { kind, geometry }]
        }
        AppIntent::FeatureEdited { id, geometry } => {
            vec![AppCommand::EditDrawnFeature { id, geometry }]
        }
        AppIntent::FeatureDeleted { id } => vec![AppCommand::DeleteDrawnFeature { id }],
        AppIntent::ViewChanged { bounds } => vec![AppCommand::SetView { bounds }],
        AppIntent::SessionResetRequested => {
            vec![AppCommand::DeactivateTool, AppCommand::ResetSession]
        }
        AppIntent::OptionsChanged { options } => vec![AppCommand::ApplyOptions { options }],
        AppIntent::ResetOptionsRequested => vec![AppCommand::ResetOptions],
        AppIntent::ExitRequested => vec![AppCommand::RequestExit],
    }
}
