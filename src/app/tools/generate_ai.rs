//! KI-Tool: erzeugt Features aus einem Prompt über den KI-Endpunkt.
//!
//! Das Tool selbst stellt nur die Anfrage zusammen; der HTTP-Aufruf läuft im
//! Hintergrund (`ai_client::AiBridge`), die Antwort wird später über
//! `apply_result` angewendet.

use super::params::{ParamKind, ParamValues, ParameterSpec};
use super::{
    MapTool, StatusCode, ToolContext, ToolExecution, ToolKey, ToolOutput, ToolSpec, ToolStatus,
};

#[derive(Debug, Default)]
pub struct GenerateAiFeaturesTool;

impl GenerateAiFeaturesTool {
    pub fn new() -> Self {
        Self
    }
}

impl MapTool for GenerateAiFeaturesTool {
    fn key(&self) -> ToolKey {
        ToolKey::GenerateAiFeatures
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::GenerateAiFeatures,
            name: "Generate AI Features",
            description: "Generate features from a prompt using the AI endpoint",
            parameters: vec![ParameterSpec::new(
                "Prompt",
                "The prompt to generate AI features",
                ParamKind::Text,
                "",
            )],
        }
    }

    fn execute(&self, _ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let prompt = params.text("Prompt").trim().to_owned();
        if prompt.is_empty() {
            return ToolExecution::failed(StatusCode::InvalidInput, "Kein Prompt angegeben.");
        }
        ToolExecution::new(
            ToolStatus::success("KI-Anfrage gesendet."),
            ToolOutput::AiRequest { prompt },
        )
    }
}
