//! Puffer-Tool: konvexer Näherungs-Puffer um einen Layer.

use super::params::{LayerFilter, ParamKind, ParamValues, ParameterSpec};
use super::{
    distance_in_degrees, units_parameter, MapTool, StatusCode, ToolContext, ToolExecution,
    ToolKey, ToolOutput, ToolSpec, ToolStatus,
};
use crate::app::tool_result::ToolResult;
use crate::core::{geometry, Feature, RenderSurface, STABLE_ID_KEY, TOOL_METADATA_KEY};

/// Puffert den gewählten Layer um die angegebene Distanz.
#[derive(Debug, Default)]
pub struct BufferTool;

impl BufferTool {
    pub fn new() -> Self {
        Self
    }
}

impl MapTool for BufferTool {
    fn key(&self) -> ToolKey {
        ToolKey::BufferTool
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::BufferTool,
            name: "Buffer",
            description: "Makes a buffer around the input layer",
            parameters: vec![
                ParameterSpec::new(
                    "Input Layer",
                    "The input layer to buffer",
                    ParamKind::Dropdown,
                    "",
                )
                .layers(LayerFilter::Any),
                ParameterSpec::new("Distance", "The distance", ParamKind::Float, 10).with_min(0.0),
                units_parameter(),
            ],
        }
    }

    fn execute(&self, ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let layer_id = params.text("Input Layer");
        let Some(handle) = ctx.session.get_layer(&layer_id) else {
            return ToolExecution::failed(StatusCode::InvalidInput, "Kein Layer ausgewählt.");
        };
        let radius = match distance_in_degrees(params) {
            Ok(radius) => radius,
            Err(failed) => return failed,
        };

        let source = ctx.session.surface().to_geojson(&handle);
        let Some(buffered) = source
            .geometry
            .as_ref()
            .and_then(|g| geometry::buffer(g, radius, ctx.settings.buffer_steps))
        else {
            return ToolExecution::failed(
                StatusCode::ExecutionFailed,
                format!("Puffer für Layer {} nicht berechenbar.", layer_id),
            );
        };

        // Puffer ist ein neues Feature und bekommt eine eigene ID
        let mut feature = Feature::new(buffered);
        feature.properties = source.properties;
        feature.properties.remove(STABLE_ID_KEY);
        feature.properties.remove(TOOL_METADATA_KEY);
        let feature = feature.with_tool_metadata(self.spec().metadata(params).to_value());

        log::info!("Buffer: Layer {} mit Radius {:.6}° gepuffert", layer_id, radius);
        ToolExecution::new(
            ToolStatus::success("Gepufferter Layer zur Karte hinzugefügt."),
            ToolOutput::Apply(ToolResult::new().add(feature.to_value())),
        )
    }
}
