//! Gruppier-Tool: fasst nahe Features per Single-Linkage zusammen.

use super::params::{ParamKind, ParamValues, ParameterSpec};
use super::{
    distance_in_degrees, units_parameter, MapTool, StatusCode, ToolContext, ToolExecution,
    ToolKey, ToolOutput, ToolSpec, ToolStatus,
};
use crate::app::use_cases::export::export_workspace;
use crate::core::{geometry, FeatureCollection, SpatialIndex};
use glam::DVec2;

/// Dateiname des Gruppier-Downloads.
pub const GROUPED_FILE_NAME: &str = "grouped.geojson";

/// Gruppiert alle Workspace-Features nach Schwerpunkt-Abstand.
#[derive(Debug, Default)]
pub struct GroupTool;

impl GroupTool {
    pub fn new() -> Self {
        Self
    }
}

impl MapTool for GroupTool {
    fn key(&self) -> ToolKey {
        ToolKey::GroupTool
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::GroupTool,
            name: "Group",
            description: "Group nearby features into a single layer",
            parameters: vec![
                ParameterSpec::new("Distance", "distance threshold", ParamKind::Float, 10)
                    .with_min(0.0),
                units_parameter(),
            ],
        }
    }

    fn execute(&self, ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let radius = match distance_in_degrees(params) {
            Ok(radius) => radius,
            Err(failed) => return failed,
        };
        if radius < 0.0 {
            return ToolExecution::failed(StatusCode::InvalidInput, "Distanz darf nicht negativ sein.");
        }

        // Features ohne Schwerpunkt (leere Geometrie) bleiben ungruppiert
        let workspace = export_workspace(ctx.session);
        let (located, unlocated): (Vec<_>, Vec<_>) = workspace
            .features
            .into_iter()
            .map(|feature| {
                let center = feature.geometry.as_ref().and_then(geometry::centroid);
                (feature, center)
            })
            .partition(|(_, center)| center.is_some());

        if located.is_empty() {
            return ToolExecution::failed(StatusCode::InvalidInput, "Keine Features zum Gruppieren.");
        }

        let centers: Vec<DVec2> = located.iter().filter_map(|(_, c)| *c).collect();
        let labels = SpatialIndex::from_points(&centers).clusters(radius);
        let group_count = labels.iter().copied().max().map_or(0, |max| max + 1);

        let mut features = Vec::with_capacity(located.len() + unlocated.len());
        for ((feature, _), label) in located.into_iter().zip(labels) {
            features.push(feature.with_property("group", label));
        }
        features.extend(unlocated.into_iter().map(|(feature, _)| feature));

        log::info!(
            "Group: {} Features in {} Gruppen (Radius {:.6}°)",
            features.len(),
            group_count,
            radius
        );
        ToolExecution::new(
            ToolStatus::success(format!("{} Gruppen gebildet.", group_count)),
            ToolOutput::Export {
                file_name: GROUPED_FILE_NAME.to_owned(),
                contents: FeatureCollection::new(features).to_value(),
            },
        )
    }
}
