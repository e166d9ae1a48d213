//! Gemeinsame Hilfen für die Controller-Flow-Tests.

mod drawing;
mod tools;

use geosketch::app::{AiError, AiFeatureClient};
use geosketch::{AppController, AppIntent, AppState, SessionOptions};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// KI-Client mit fester Antwort.
pub struct CannedAi(pub Result<Value, AiError>);

impl AiFeatureClient for CannedAi {
    fn generate(&self, _prompt: &str) -> Result<Value, AiError> {
        self.0.clone()
    }
}

/// Eigenes Export-Verzeichnis pro Test.
pub fn export_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("geosketch-flow-{}-{}", std::process::id(), name))
}

pub fn test_state_with_ai(name: &str, ai: Result<Value, AiError>) -> AppState {
    let options = SessionOptions {
        export_dir: export_dir(name),
        random_seed: Some(7),
        ..SessionOptions::default()
    };
    AppState::with_ai_client(options, Arc::new(CannedAi(ai)))
}

pub fn test_state(name: &str) -> AppState {
    test_state_with_ai(name, Err(AiError::Transport("kein Endpunkt im Test".into())))
}

pub fn parse_intent(line: &str) -> AppIntent {
    serde_json::from_str(line).expect("Gültiger Intent erwartet")
}

/// Fügt Punkte über `ApplyResultRequested` hinzu und liefert deren IDs.
pub fn add_points(
    controller: &mut AppController,
    state: &mut AppState,
    points: &[[f64; 2]],
) -> Vec<String> {
    let features: Vec<Value> = points
        .iter()
        .map(|[lon, lat]| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": {}
            })
        })
        .collect();
    controller
        .handle_intent(
            state,
            AppIntent::ApplyResultRequested {
                result: json!({ "addGeojson": features }),
            },
        )
        .expect("ApplyResultRequested sollte ohne Fehler durchlaufen");
    state
        .last_outcome
        .as_ref()
        .expect("Ergebnis erwartet")
        .added
        .iter()
        .map(|id| id.to_string())
        .collect()
}
