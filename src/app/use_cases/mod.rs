//! Use-Cases der Application-Layer-Orchestrierung.

pub mod apply_result;
pub mod export;
pub mod surface_sync;
