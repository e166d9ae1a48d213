//! Typisiertes GeoJSON-Modell (Feature, FeatureCollection, Geometry).
//!
//! Eingehende Nutzdaten kommen als `serde_json::Value` (Tool-Ergebnisse,
//! KI-Antworten, Importdateien) und werden erst beim Materialisieren geprüft.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Property-Schlüssel, unter dem die `StableId` serialisiert wird.
pub const STABLE_ID_KEY: &str = "__id";
/// Schlüssel für Tool-Provenienz (Top-Level, Feature-Level oder in `properties`).
pub const TOOL_METADATA_KEY: &str = "toolMetadata";

/// Koordinate `[lon, lat]` oder `[lon, lat, alt]`.
pub type Position = Vec<f64>;

/// Fehler beim Lesen von GeoJSON.
#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("ungültiges GeoJSON-Objekt: kein JSON-Objekt")]
    NotAnObject,
    #[error("ungültiges GeoJSON-Objekt: `type` fehlt")]
    MissingType,
    #[error("ungültiges GeoJSON-Objekt: unbekannter Typ `{0}`")]
    UnknownType(String),
    #[error("Feature ohne Geometrie")]
    MissingGeometry,
    #[error("ungültige Koordinate in {geometry_type}")]
    InvalidPosition { geometry_type: &'static str },
    #[error("fehlerhaftes GeoJSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// GeoJSON-Geometrie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Punkt-Geometrie aus Längen-/Breitengrad.
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lon, lat],
        }
    }

    /// GeoJSON-Typname (`"Point"`, `"Polygon"`, …).
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// `true` für Polygon und MultiPolygon.
    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon { .. } | Geometry::MultiPolygon { .. })
    }

    /// Ruft `f` für jede Koordinate auf (in Dokument-Reihenfolge).
    pub fn for_each_position<F: FnMut(&Position)>(&self, f: &mut F) {
        match self {
            Geometry::Point { coordinates } => f(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().for_each(|p| f(p))
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().for_each(|p| f(p))
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(|p| f(p))
            }
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().for_each(|g| g.for_each_position(f))
            }
        }
    }

    /// Anzahl aller Koordinaten.
    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.for_each_position(&mut |_| count += 1);
        count
    }

    /// Prüft, dass jede Koordinate mindestens zwei endliche Werte hat.
    pub fn validate(&self) -> Result<(), GeoJsonError> {
        let mut valid = true;
        self.for_each_position(&mut |p| {
            if p.len() < 2 || !p.iter().all(|v| v.is_finite()) {
                valid = false;
            }
        });
        if valid {
            Ok(())
        } else {
            Err(GeoJsonError::InvalidPosition {
                geometry_type: self.type_name(),
            })
        }
    }
}

/// Typ-Marker `"Feature"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

/// Typ-Marker `"FeatureCollection"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    #[default]
    FeatureCollection,
}

/// GeoJSON-Feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub properties: Map<String, Value>,
    /// Tool-Provenienz auf Feature-Ebene (roh, wird erst beim Anwenden geprüft)
    #[serde(
        rename = "toolMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_metadata: Option<Value>,
}

impl Feature {
    /// Feature mit Geometrie und leeren Properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: FeatureTag::Feature,
            id: None,
            geometry: Some(geometry),
            properties: Map::new(),
            tool_metadata: None,
        }
    }

    /// Setzt eine Property (Builder).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Setzt die Feature-Level-Provenienz (Builder).
    pub fn with_tool_metadata(mut self, metadata: Value) -> Self {
        self.tool_metadata = Some(metadata);
        self
    }

    /// Liest eine serialisierte `__id` aus den Properties.
    pub fn stable_id_property(&self) -> Option<&str> {
        self.properties.get(STABLE_ID_KEY).and_then(Value::as_str)
    }

    /// Serialisiert als `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// GeoJSON-FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionTag,
    pub features: Vec<Feature>,
    #[serde(
        rename = "toolMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tool_metadata: Option<Value>,
}

impl FeatureCollection {
    /// Collection aus einer Liste von Features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionTag::FeatureCollection,
            features,
            tool_metadata: None,
        }
    }

    /// Serialisiert als `serde_json::Value`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Beliebiges GeoJSON-Objekt, wie es ein Tool oder ein Import liefert.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
    Geometry(Geometry),
}

impl GeoJson {
    /// Liest GeoJSON aus einem JSON-Wert; dispatcht über das `type`-Feld.
    pub fn from_value(value: &Value) -> Result<Self, GeoJsonError> {
        let object = value.as_object().ok_or(GeoJsonError::NotAnObject)?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeoJsonError::MissingType)?;

        match kind {
            "Feature" => Ok(GeoJson::Feature(serde_json::from_value(value.clone())?)),
            "FeatureCollection" => Ok(GeoJson::FeatureCollection(serde_json::from_value(
                value.clone(),
            )?)),
            "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon"
            | "MultiPolygon" | "GeometryCollection" => {
                Ok(GeoJson::Geometry(serde_json::from_value(value.clone())?))
            }
            other => Err(GeoJsonError::UnknownType(other.to_owned())),
        }
    }

    /// Liefert die enthaltenen Features; nackte Geometrien werden zu Features.
    pub fn into_features(self) -> Vec<Feature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Geometry(geometry) => vec![Feature::new(geometry)],
        }
    }
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
