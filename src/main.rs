//! geosketch — Kommandozeilen-Treiber für den Karten-Annotations-Kern.
//!
//! Liest `AppIntent`s als JSON-Zeilen von stdin und schreibt nach jedem Intent
//! eine JSON-Zeile mit Status, letztem Ergebnis und TOC auf stdout.

use geosketch::{AppController, AppIntent, AppState, SessionOptions};
use std::io::{BufRead, Write};

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("geosketch v{} startet...", env!("CARGO_PKG_VERSION"));

    let options = SessionOptions::load_from_file(&SessionOptions::config_path());
    let ai_timeout = options.ai_timeout();
    let mut state = AppState::with_options(options);
    let mut controller = AppController::new();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<AppIntent>(&line) {
            Ok(intent) => {
                if let Err(e) = controller.handle_intent(&mut state, intent) {
                    log::error!("Intent fehlgeschlagen: {:#}", e);
                }
            }
            Err(e) => log::warn!("Ungültiger Intent ignoriert: {}", e),
        }
        controller.poll_background(&mut state)?;

        writeln!(stdout, "{}", serde_json::to_string(&state.report())?)?;
        stdout.flush()?;

        if state.should_exit {
            break;
        }
    }

    // Offene KI-Anfragen noch abholen
    if state.ai.in_flight() > 0 {
        controller.drain_background_blocking(&mut state, ai_timeout)?;
        writeln!(stdout, "{}", serde_json::to_string(&state.report())?)?;
    }

    log::info!("geosketch beendet ({} Layer)", state.layer_count());
    Ok(())
}
