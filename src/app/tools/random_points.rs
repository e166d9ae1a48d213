//! Zufallspunkte-Tool: Punkte im Kartenausschnitt oder innerhalb eines Polygons.

use super::params::{LayerFilter, ParamKind, ParamValues, ParameterSpec};
use super::{
    MapTool, StatusCode, ToolContext, ToolExecution, ToolKey, ToolOutput, ToolSpec, ToolStatus,
};
use crate::app::tool_result::ToolResult;
use crate::core::{geometry, BoundingBox, Feature, FeatureCollection, Geometry};
use glam::DVec2;
use rand::Rng;
use serde_json::Value;

/// Länge der zufälligen Kennung je Punkt.
const RANDOM_TAG_LEN: usize = 5;
/// Obergrenze für "Points Count" pro Ausführung.
pub const MAX_POINTS_COUNT: i64 = 10_000;

/// Erzeugt zufällige Punkte.
#[derive(Debug, Default)]
pub struct RandomPointsTool;

impl RandomPointsTool {
    pub fn new() -> Self {
        Self
    }
}

/// Zufällige Kennung aus Kleinbuchstaben.
fn random_tag<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_TAG_LEN)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect()
}

/// Rejection-Sampling in der Bounding-Box des Polygons.
fn sample_inside<R: Rng + ?Sized>(
    rng: &mut R,
    polygon: &Geometry,
    bounds: &BoundingBox,
    max_attempts: u32,
) -> Option<DVec2> {
    (0..max_attempts)
        .map(|_| geometry::random_point_in(&mut *rng, bounds))
        .find(|candidate| geometry::point_in_polygon(*candidate, polygon))
}

impl MapTool for RandomPointsTool {
    fn key(&self) -> ToolKey {
        ToolKey::RandomPointsTool
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            key: ToolKey::RandomPointsTool,
            name: "Random Points",
            description: "Adds random points within selected polygon",
            parameters: vec![
                ParameterSpec::new(
                    "Points Count",
                    "Number of random points to generate.",
                    ParamKind::Int,
                    10,
                )
                .with_min(0.0)
                .with_max(MAX_POINTS_COUNT as f64),
                ParameterSpec::new(
                    "Inside Polygon",
                    "Generate points inside polygon",
                    ParamKind::Boolean,
                    false,
                ),
                ParameterSpec::new(
                    "Polygon",
                    "Polygon to add random points within.",
                    ParamKind::Dropdown,
                    "",
                )
                .layers(LayerFilter::Polygons),
            ],
        }
    }

    fn execute(&self, ctx: &mut ToolContext<'_>, params: &ParamValues) -> ToolExecution {
        let count = params.int("Points Count").unwrap_or(0).max(0);
        if count > MAX_POINTS_COUNT {
            return ToolExecution::failed(
                StatusCode::InvalidInput,
                format!("Höchstens {} Punkte pro Ausführung.", MAX_POINTS_COUNT),
            );
        }
        let count = count as usize;
        let metadata: Value = self.spec().metadata(params).to_value();
        // Kennung nur für Punkte innerhalb eines Polygons
        let inside = params.flag("Inside Polygon");

        let points: Vec<DVec2> = if inside {
            let polygon_id = params.text("Polygon");
            let polygon = ctx
                .session
                .get_layer(&polygon_id)
                .and_then(|handle| handle.record().geometry.clone())
                .filter(Geometry::is_areal);
            let Some(polygon) = polygon else {
                return ToolExecution::failed(StatusCode::InvalidInput, "Kein Polygon ausgewählt.");
            };
            let Some(bounds) = geometry::bbox(&polygon) else {
                return ToolExecution::failed(StatusCode::InvalidInput, "Polygon ohne Koordinaten.");
            };

            let max_attempts = ctx.settings.random_points_max_attempts;
            let mut points = Vec::with_capacity(count);
            for _ in 0..count {
                match sample_inside(&mut *ctx.rng, &polygon, &bounds, max_attempts) {
                    Some(point) => points.push(point),
                    None => {
                        log::warn!(
                            "RandomPoints: nach {} Versuchen kein Punkt in Polygon {}",
                            max_attempts,
                            polygon_id
                        );
                        return ToolExecution::failed(
                            StatusCode::ExecutionFailed,
                            format!("Kein Punkt innerhalb von Polygon {} gefunden.", polygon_id),
                        );
                    }
                }
            }
            points
        } else {
            let Some(view) = ctx.view else {
                return ToolExecution::failed(
                    StatusCode::ResourceNotFound,
                    "Kein Kartenausschnitt verfügbar.",
                );
            };
            (0..count)
                .map(|_| geometry::random_point_in(&mut *ctx.rng, &view))
                .collect()
        };

        let features: Vec<Feature> = points
            .into_iter()
            .map(|point| {
                let feature = Feature::new(Geometry::point(point.x, point.y));
                let feature = if inside {
                    feature.with_property("random", random_tag(&mut *ctx.rng))
                } else {
                    feature
                };
                feature.with_tool_metadata(metadata.clone())
            })
            .collect();

        log::info!("RandomPoints: {} Punkte erzeugt", features.len());
        ToolExecution::new(
            ToolStatus::success(format!("{} Zufallspunkte hinzugefügt.", features.len())),
            ToolOutput::Apply(ToolResult::new().add(FeatureCollection::new(features).to_value())),
        )
    }
}
