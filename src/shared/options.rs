//! Zentrale Konfiguration für geosketch.
//!
//! `SessionOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::core::{BoundingBox, IdMinter, IdSource};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ── Session ─────────────────────────────────────────────────────────

/// Dateiname der Konfiguration neben dem Binary.
pub const DEFAULT_SESSION_FILE: &str = "geosketch.toml";
/// Start-Kartenausschnitt `[west, south, east, north]` (Südwesten der USA).
pub const DEFAULT_INITIAL_VIEW: [f64; 4] = [-121.0, 31.0, -113.0, 37.0];

// ── KI-Endpunkt ─────────────────────────────────────────────────────

/// Lokaler KI-Server.
pub const AI_ENDPOINT: &str = "http://127.0.0.1:3000/api/ai_geojson";
/// Zeitlimit pro KI-Anfrage in Sekunden.
pub const AI_TIMEOUT_SECS: u64 = 30;

// ── Tools ───────────────────────────────────────────────────────────

/// Kreis-Stützpunkte pro Vertex beim Puffern.
pub const BUFFER_STEPS: u32 = 32;
/// Obergrenze der Versuche pro Zufallspunkt im Polygon.
pub const RANDOM_POINTS_MAX_ATTEMPTS: u32 = 10_000;

/// Laufzeit-Optionen der Session (persistiert als TOML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Herkunft neuer Feature-IDs
    pub id_source: IdSource,
    /// Kosmetische Fehler beim Anwenden als Warnung statt Debug loggen
    pub verbose_diagnostics: bool,
    pub ai_endpoint: String,
    pub ai_timeout_secs: u64,
    /// Start-Kartenausschnitt `[west, south, east, north]`
    pub initial_view: [f64; 4],
    /// Zielverzeichnis für Exporte
    pub export_dir: PathBuf,
    /// Fester Seed für reproduzierbare Zufallspunkte
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    pub buffer_steps: u32,
    pub random_points_max_attempts: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            id_source: IdSource::default(),
            verbose_diagnostics: false,
            ai_endpoint: AI_ENDPOINT.to_owned(),
            ai_timeout_secs: AI_TIMEOUT_SECS,
            initial_view: DEFAULT_INITIAL_VIEW,
            export_dir: PathBuf::from("exports"),
            random_seed: None,
            buffer_steps: BUFFER_STEPS,
            random_points_max_attempts: RANDOM_POINTS_MAX_ATTEMPTS,
        }
    }
}

impl SessionOptions {
    /// Lädt Optionen aus einer TOML-Datei. Fallback auf Defaults bei Fehler.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert die Optionen als TOML.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Pfad der Konfigurationsdatei neben dem Binary.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| PathBuf::from("geosketch"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join(DEFAULT_SESSION_FILE)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs.max(1))
    }

    /// Start-Kartenausschnitt als Bounding-Box.
    pub fn initial_bounds(&self) -> BoundingBox {
        BoundingBox::from_array(self.initial_view)
    }

    /// ID-Generator gemäß `id_source`.
    pub fn id_minter(&self) -> IdMinter {
        IdMinter::new(self.id_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let opts: SessionOptions = toml::from_str(
            "id_source = \"fallback\"\nverbose_diagnostics = true\nrandom_seed = 7\n",
        )
        .expect("TOML erwartet");
        assert_eq!(opts.id_source, IdSource::Fallback);
        assert!(opts.verbose_diagnostics);
        assert_eq!(opts.random_seed, Some(7));
        assert_eq!(opts.buffer_steps, BUFFER_STEPS);
        assert_eq!(opts.initial_view, DEFAULT_INITIAL_VIEW);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("geosketch-opts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("Temp-Verzeichnis erwartet");
        let path = dir.join(DEFAULT_SESSION_FILE);
        let opts = SessionOptions {
            ai_timeout_secs: 5,
            export_dir: PathBuf::from("/tmp/out"),
            ..SessionOptions::default()
        };

        opts.save_to_file(&path).expect("Speichern erwartet");

        assert_eq!(SessionOptions::load_from_file(&path), opts);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("geosketch-opts-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("Temp-Verzeichnis erwartet");
        let path = dir.join("kaputt.toml");
        std::fs::write(&path, "buffer_steps = \"viele\"").expect("Schreiben erwartet");

        assert_eq!(SessionOptions::load_from_file(&path), SessionOptions::default());
    }
}
