//! Application Controller für zentrale Event-Verarbeitung.

use super::{AppCommand, AppIntent, AppState};
use std::time::{Duration, Instant};

/// Orchestriert Intents, Hintergrund-Antworten und Use-Cases auf den AppState.
#[derive(Default)]
pub struct AppController;

impl AppController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent(&mut self, state: &mut AppState, intent: AppIntent) -> anyhow::Result<()> {
        let commands = self.map_intent_to_commands(state, intent);
        for command in commands {
            self.handle_command(state, command)?;
        }

        Ok(())
    }

    fn map_intent_to_commands(&self, state: &AppState, intent: AppIntent) -> Vec<AppCommand> {
        super::intent_mapping::map_intent_to_commands(state, intent)
    }

    /// Führt mutierende Commands auf dem AppState aus.
    /// Dispatcht an Feature-Handler in `handlers/`.
    pub fn handle_command(
        &mut self,
        state: &mut AppState,
        command: AppCommand,
    ) -> anyhow::Result<()> {
        state.command_log.record(&command);
        use super::handlers;

        match command {
            // === Tools ===
            AppCommand::ActivateTool { key } => handlers::tools::activate(state, key),
            AppCommand::DeactivateTool => handlers::tools::deactivate(state),
            AppCommand::ExecuteTool { key, params } => {
                handlers::tools::execute(state, key, params)?
            }
            AppCommand::ApplyToolResult { payload } => {
                handlers::tools::apply_payload(state, &payload)
            }
            AppCommand::ApplyAiReply { reply } => handlers::tools::apply_ai_reply(state, reply),

            // === Zeichnen & Karte ===
            AppCommand::CreateDrawnFeature { kind, geometry } => {
                handlers::drawing::create(state, kind, geometry)
            }
            AppCommand::EditDrawnFeature { id, geometry } => {
                handlers::drawing::edit(state, &id, geometry)
            }
            AppCommand::DeleteDrawnFeature { id } => handlers::drawing::delete(state, &id),
            AppCommand::SetView { bounds } => handlers::drawing::set_view(state, bounds),

            // === Session & Anwendungssteuerung ===
            AppCommand::RemoveLayer { id } => handlers::session::remove_layer(state, &id),
            AppCommand::ResetSession => handlers::session::reset(state),
            AppCommand::ApplyOptions { options } => {
                handlers::session::apply_options(state, options)?
            }
            AppCommand::ResetOptions => handlers::session::reset_options(state)?,
            AppCommand::RequestExit => handlers::session::request_exit(state),
        }

        Ok(())
    }

    /// Wendet alle bereits eingetroffenen KI-Antworten an. Gibt deren Anzahl zurück.
    pub fn poll_background(&mut self, state: &mut AppState) -> anyhow::Result<usize> {
        let replies = state.ai.try_recv_all();
        let count = replies.len();
        for reply in replies {
            self.handle_command(state, AppCommand::ApplyAiReply { reply })?;
        }
        Ok(count)
    }

    /// Wartet bis `timeout` auf alle offenen KI-Antworten und wendet sie an.
    pub fn drain_background_blocking(
        &mut self,
        state: &mut AppState,
        timeout: Duration,
    ) -> anyhow::Result<usize> {
        let deadline = Instant::now() + timeout;
        let mut count = 0;
        while state.ai.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "{} KI-Anfragen nach {:?} noch offen",
                    state.ai.in_flight(),
                    timeout
                );
                break;
            }
            let Some(reply) = state.ai.recv_timeout(remaining) else {
                continue;
            };
            self.handle_command(state, AppCommand::ApplyAiReply { reply })?;
            count += 1;
        }
        Ok(count)
    }
}
