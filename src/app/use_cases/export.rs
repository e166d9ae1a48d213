//! Use-Case: Features als GeoJSON exportieren (mit `properties.__id`).

use crate::app::session::LayerSession;
use crate::core::{Feature, FeatureCollection, RenderSurface};
use anyhow::Context;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Einzelnes Feature per ID exportieren.
pub fn export_layer<S: RenderSurface>(session: &LayerSession<S>, id: &str) -> Option<Feature> {
    let handle = session.get_layer(id)?;
    session.ensure_stable_id(&handle, None);
    Some(session.surface.to_geojson(&handle))
}

/// Alle TOC-Features in TOC-Reihenfolge exportieren.
pub fn export_workspace<S: RenderSurface>(session: &LayerSession<S>) -> FeatureCollection {
    let features = session
        .toc
        .handles()
        .iter()
        .map(|handle| {
            session.ensure_stable_id(handle, None);
            session.surface.to_geojson(handle)
        })
        .collect();
    FeatureCollection::new(features)
}

/// Schreibt einen Export als formatiertes JSON in `dir/file_name`.
///
/// `file_name` muss ein einzelner, normaler Pfadbestandteil sein.
pub fn write_export(dir: &Path, file_name: &str, contents: &Value) -> anyhow::Result<PathBuf> {
    let mut components = Path::new(file_name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        anyhow::bail!("Ungültiger Export-Dateiname: {:?}", file_name);
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Export-Verzeichnis {} nicht anlegbar", dir.display()))?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(contents)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Export {} nicht schreibbar", path.display()))?;
    log::info!("Export geschrieben: {}", path.display());
    Ok(path)
}
