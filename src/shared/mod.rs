//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Laufzeit-Konfiguration, die `app` und das Binary gemeinsam nutzen.

pub mod options;

pub use options::SessionOptions;
pub use options::{DEFAULT_INITIAL_VIEW, DEFAULT_SESSION_FILE};
