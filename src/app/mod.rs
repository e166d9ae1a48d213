//! Application-Layer: Session, Controller, State, Events, Tools und Use-Cases.

/// KI-Endpunkt und Hintergrund-Bridge
pub mod ai_client;
pub mod command_log;
pub mod controller;
/// Meldungen über kosmetische Fehlschläge beim Anwenden
pub mod diagnostics;
pub mod events;
pub mod handlers;
mod intent_mapping;
pub mod registry;
/// Layer-Workspace einer Session
///
/// Bündelt Registry, TOC und Render-Surface; Einstiegspunkt für `apply_result`.
pub mod session;
pub mod state;
pub mod toc;
pub mod tool_result;
pub mod tools;
pub mod use_cases;

pub use ai_client::{AiBridge, AiError, AiFeatureClient, AiReply, HttpAiClient};
pub use command_log::CommandLog;
pub use controller::AppController;
pub use diagnostics::{DiagnosticSink, ItemStep, LogDiagnostics, RecordingDiagnostics};
pub use events::{AppCommand, AppIntent};
pub use registry::{FeatureRegistry, LayerRef};
pub use session::{LayerSession, SessionSnapshot};
pub use state::{AppState, StateReport};
pub use toc::{TableOfContents, TocEntry};
pub use tool_result::{ApplyError, ApplyOutcome, ToolResult};
pub use tools::{MapTool, StatusCode, ToolKey, ToolManager, ToolOutput, ToolStatus};
pub use use_cases::surface_sync::DrawOutcome;
