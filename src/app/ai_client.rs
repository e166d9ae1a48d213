//! KI-Endpunkt: HTTP-Client und Hintergrund-Bridge.
//!
//! Anfragen laufen auf eigenen Threads; Antworten landen in einem Channel und
//! werden vom Controller auf dem Session-Thread abgeholt und angewendet.

use super::tools::StatusCode;
use crossbeam_channel::{Receiver, Sender};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Fehler beim Abruf von KI-Features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AiError {
    #[error("Zeitüberschreitung nach {0:?}")]
    Timeout(Duration),
    #[error("KI-Endpunkt nicht erreichbar: {0}")]
    Transport(String),
    #[error("KI-Endpunkt meldet Fehler: {0}")]
    Endpoint(String),
}

impl AiError {
    /// Status-Code für die Oberfläche.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AiError::Timeout(_) => StatusCode::Timeout,
            AiError::Transport(_) | AiError::Endpoint(_) => StatusCode::ExternalDependencyError,
        }
    }
}

/// Quelle für KI-generiertes GeoJSON.
pub trait AiFeatureClient: Send + Sync {
    /// Liefert GeoJSON zum Prompt (blockierend).
    fn generate(&self, prompt: &str) -> Result<Value, AiError>;
}

/// Prüft eine Server-Antwort; ein `error`-Feld gilt als Fehlschlag.
pub fn interpret_reply(body: Value) -> Result<Value, AiError> {
    match body.get("error") {
        Some(Value::String(message)) => Err(AiError::Endpoint(message.clone())),
        Some(other) if !other.is_null() => Err(AiError::Endpoint(other.to_string())),
        _ => Ok(body),
    }
}

/// `POST {endpoint}` mit `{ "prompt": ... }` über reqwest (blocking).
#[derive(Debug, Clone)]
pub struct HttpAiClient {
    endpoint: String,
    timeout: Duration,
}

impl HttpAiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AiFeatureClient for HttpAiClient {
    fn generate(&self, prompt: &str) -> Result<Value, AiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| AiError::Transport(err.to_string()))?;

        let map_send_error = |err: reqwest::Error| {
            if err.is_timeout() {
                AiError::Timeout(self.timeout)
            } else {
                AiError::Transport(err.to_string())
            }
        };

        let response = client
            .post(&self.endpoint)
            .json(&json!({ "prompt": prompt }))
            .send()
            .map_err(map_send_error)?;
        let status = response.status();
        let body: Value = response.json().map_err(map_send_error)?;

        let body = interpret_reply(body)?;
        if !status.is_success() {
            return Err(AiError::Endpoint(format!("HTTP {}", status)));
        }
        Ok(body)
    }
}

/// Antwort einer Hintergrund-Anfrage.
#[derive(Debug, Clone, PartialEq)]
pub struct AiReply {
    pub prompt: String,
    pub result: Result<Value, AiError>,
}

/// Startet KI-Anfragen auf Worker-Threads und sammelt die Antworten ein.
pub struct AiBridge {
    client: Arc<dyn AiFeatureClient>,
    reply_tx: Sender<AiReply>,
    reply_rx: Receiver<AiReply>,
    in_flight: usize,
}

impl AiBridge {
    pub fn new(client: Arc<dyn AiFeatureClient>) -> Self {
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        Self {
            client,
            reply_tx,
            reply_rx,
            in_flight: 0,
        }
    }

    /// Offene Anfragen ohne Antwort.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Startet eine Anfrage im Hintergrund.
    pub fn request(&mut self, prompt: String) {
        let client = Arc::clone(&self.client);
        let reply_tx = self.reply_tx.clone();
        self.in_flight += 1;
        log::info!("KI-Anfrage gestartet: {:?}", prompt);

        std::thread::spawn(move || {
            let result = client.generate(&prompt);
            if reply_tx.send(AiReply { prompt, result }).is_err() {
                log::warn!("KI-Antwort verworfen: Empfänger geschlossen");
            }
        });
    }

    /// Alle bereits eingetroffenen Antworten (nicht blockierend).
    pub fn try_recv_all(&mut self) -> Vec<AiReply> {
        let replies: Vec<AiReply> = self.reply_rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(replies.len());
        replies
    }

    /// Wartet höchstens `timeout` auf die nächste Antwort.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<AiReply> {
        let reply = self.reply_rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(reply)
    }
}
