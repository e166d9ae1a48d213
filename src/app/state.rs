//! Application State — zentrale Datenhaltung.

use super::ai_client::{AiBridge, AiFeatureClient, HttpAiClient};
use super::diagnostics::LogDiagnostics;
use super::session::LayerSession;
use super::toc::TocEntry;
use super::tool_result::ApplyOutcome;
use super::tools::{ToolKey, ToolManager, ToolSettings, ToolStatus};
use super::CommandLog;
use crate::core::MemorySurface;
use crate::shared::SessionOptions;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Antwort an Treiber/Agent nach einem Intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateReport {
    #[serde(rename = "activeTool")]
    pub active_tool: Option<ToolKey>,
    pub status: Option<ToolStatus>,
    pub outcome: Option<ApplyOutcome>,
    pub layers: Vec<TocEntry>,
    #[serde(rename = "pendingAi")]
    pub pending_ai: usize,
}

/// Hauptzustand der Anwendung
pub struct AppState {
    /// Layer-Workspace (Registry, TOC, Surface)
    pub session: LayerSession,
    /// Registrierte Tools und aktives Tool
    pub tools: ToolManager,
    /// Letzte Statusmeldung (Tool, Zeichnen, KI)
    pub status: Option<ToolStatus>,
    /// Ergebnis der letzten Anwendung eines Tool-Ergebnisses
    pub last_outcome: Option<ApplyOutcome>,
    /// Geschriebene Export-Dateien
    pub exports: Vec<PathBuf>,
    /// Verlauf ausgeführter Commands
    pub command_log: CommandLog,
    /// Laufzeit-Optionen
    pub options: SessionOptions,
    /// Hintergrund-Anfragen an den KI-Endpunkt
    pub ai: AiBridge,
    /// Zufallsquelle der Tools
    pub rng: StdRng,
    /// Signalisiert dem Host, die Anwendung kontrolliert zu beenden
    pub should_exit: bool,
}

impl AppState {
    /// Erstellt einen leeren App-State mit Standard-Optionen.
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// Erstellt einen App-State; der KI-Client spricht den konfigurierten Endpunkt an.
    pub fn with_options(options: SessionOptions) -> Self {
        let client = HttpAiClient::new(options.ai_endpoint.clone(), options.ai_timeout());
        Self::with_ai_client(options, Arc::new(client))
    }

    /// Erstellt einen App-State mit eigenem KI-Client.
    pub fn with_ai_client(options: SessionOptions, client: Arc<dyn AiFeatureClient>) -> Self {
        let session = LayerSession::new(
            MemorySurface::with_view(options.initial_bounds()),
            options.id_minter(),
            Box::new(LogDiagnostics::new(options.verbose_diagnostics)),
        );
        let rng = match options.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            session,
            tools: ToolManager::new(),
            status: None,
            last_outcome: None,
            exports: Vec::new(),
            command_log: CommandLog::new(),
            options,
            ai: AiBridge::new(client),
            rng,
            should_exit: false,
        }
    }

    /// Tool-Einstellungen aus den aktuellen Optionen.
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            buffer_steps: self.options.buffer_steps,
            random_points_max_attempts: self.options.random_points_max_attempts,
        }
    }

    /// Anzahl der Layer im TOC (für Anzeige)
    pub fn layer_count(&self) -> usize {
        self.session.toc().len()
    }

    /// Status, letztes Ergebnis und TOC-Liste.
    pub fn report(&mut self) -> StateReport {
        StateReport {
            active_tool: self.tools.active_key(),
            status: self.status.clone(),
            outcome: self.last_outcome.clone(),
            layers: self.session.list_layers(),
            pending_ai: self.ai.in_flight(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
