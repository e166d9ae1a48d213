//! Stabile Feature-IDs und deren Erzeugung.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session-weit eindeutige, opake Feature-ID.
///
/// Einmal vergeben, ändert sich die ID eines Features nie und wird in
/// derselben Session nicht für ein anderes Feature wiederverwendet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    /// Übernimmt einen beliebigen String ungeprüft (z.B. für Lookups).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Übernimmt eine bevorzugte ID — leere oder reine Whitespace-Strings zählen als "keine".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_owned()))
        }
    }

    /// Gibt die ID als `&str` zurück.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StableId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for StableId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for StableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Quelle für neue IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    /// UUID v4 aus dem Zufallsgenerator des Betriebssystems
    #[default]
    Uuid,
    /// Zeitstempel + Zufallsanteil + monotoner Zähler
    Fallback,
}

/// Erzeugt kollisionsresistente `StableId`s.
#[derive(Debug, Default)]
pub struct IdMinter {
    source: IdSource,
    counter: AtomicU32,
}

impl IdMinter {
    /// Erstellt einen Minter mit der angegebenen Quelle.
    pub fn new(source: IdSource) -> Self {
        Self {
            source,
            counter: AtomicU32::new(0),
        }
    }

    /// Aktive ID-Quelle.
    pub fn source(&self) -> IdSource {
        self.source
    }

    /// Erzeugt eine neue ID. Schlägt nie fehl.
    pub fn mint(&self) -> StableId {
        match self.source {
            IdSource::Uuid => StableId(uuid::Uuid::new_v4().to_string()),
            IdSource::Fallback => self.mint_fallback(),
        }
    }

    /// Zwei Aufrufe im selben Millisekunden-Tick unterscheiden sich mindestens im Zähler.
    /// `fetch_add` wrappt bei `u32::MAX` auf 0.
    fn mint_fallback(&self) -> StableId {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let random: u64 = rand::random();
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        StableId(format!("id-{millis:x}-{random:x}-{counter:x}"))
    }
}
