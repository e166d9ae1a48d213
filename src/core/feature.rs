//! Live-Features: Datensatz, Handle und Tool-Provenienz.

use super::geojson::{Feature, FeatureTag, Geometry, STABLE_ID_KEY};
use super::stable_id::StableId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Momentaufnahme eines Tool-Parameters zum Ausführungszeitpunkt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "defaultValue", default)]
    pub default_value: Value,
    /// Tatsächlich verwendeter Wert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Welches Tool hat das Feature erzeugt, mit welchen Einstellungen.
///
/// Reine Provenienz — wird nie für Berechnungen verwendet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSnapshot>,
}

impl ToolMetadata {
    /// Serialisiert für GeoJSON-Payloads.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Art, wie ein Feature von Hand gezeichnet wurde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawKind {
    Marker,
    Polyline,
    Polygon,
    Rectangle,
    Circle,
}

impl DrawKind {
    /// Name wie von der Zeichensteuerung gemeldet.
    pub fn as_str(self) -> &'static str {
        match self {
            DrawKind::Marker => "marker",
            DrawKind::Polyline => "polyline",
            DrawKind::Polygon => "polygon",
            DrawKind::Rectangle => "rectangle",
            DrawKind::Circle => "circle",
        }
    }
}

/// Datensatz hinter einem `FeatureHandle`.
#[derive(Debug, Clone, Default)]
pub struct FeatureRecord {
    /// Geometrie (None nur bei Surfaces ohne Geometrie-Introspektion)
    pub geometry: Option<Geometry>,
    /// Serialisierbare Properties; `None` = Container existiert noch nicht
    pub properties: Option<Map<String, Value>>,
    /// Vom Surface deklarierter Typ (z.B. "marker"), Fallback für den TOC-Typ
    pub declared_type: Option<String>,
    /// Angehängte Tool-Provenienz
    pub tool_metadata: Option<ToolMetadata>,
    /// Roh-Provenienz, wie sie am importierten Feature hing
    pub source_metadata: Option<Value>,
    stable_id: Option<StableId>,
}

impl FeatureRecord {
    /// Datensatz aus einem GeoJSON-Feature (Import-Pfad).
    pub fn from_feature(feature: Feature) -> Self {
        Self {
            geometry: feature.geometry,
            properties: Some(feature.properties),
            declared_type: None,
            tool_metadata: None,
            source_metadata: feature.tool_metadata,
            stable_id: None,
        }
    }

    /// Von Hand gezeichneter Datensatz — ohne Properties-Container.
    pub fn drawn(geometry: Geometry, kind: DrawKind) -> Self {
        Self {
            geometry: Some(geometry),
            declared_type: Some(kind.as_str().to_owned()),
            ..Self::default()
        }
    }

    /// Zugewiesene StableId.
    pub fn stable_id(&self) -> Option<&StableId> {
        self.stable_id.as_ref()
    }

    /// Setzt die ID nur, wenn noch keine vergeben ist. Gibt die gültige ID zurück.
    pub(crate) fn assign_stable_id(&mut self, id: StableId) -> StableId {
        self.stable_id.get_or_insert(id).clone()
    }

    /// Spiegelt die ID nach `properties.__id` (legt den Container bei Bedarf an).
    pub(crate) fn mirror_stable_id(&mut self) {
        let Some(id) = self.stable_id.as_ref() else {
            return;
        };
        let properties = self.properties.get_or_insert_with(Map::new);
        let current = properties.get(STABLE_ID_KEY).and_then(Value::as_str);
        if current != Some(id.as_str()) {
            properties.insert(STABLE_ID_KEY.to_owned(), Value::String(id.to_string()));
        }
    }

    /// `__id` aus den eingehenden Properties (Round-Trip-Identität).
    pub fn incoming_id(&self) -> Option<StableId> {
        self.properties
            .as_ref()?
            .get(STABLE_ID_KEY)
            .and_then(Value::as_str)
            .and_then(StableId::parse)
    }

    /// Geometrie-Typ, sonst der deklarierte Typ.
    pub fn geometry_type(&self) -> Option<String> {
        self.geometry
            .as_ref()
            .map(|g| g.type_name().to_owned())
            .or_else(|| self.declared_type.clone())
    }

    /// Serialisiert als GeoJSON-Feature; `properties.__id` entspricht immer der StableId.
    pub fn to_feature(&self) -> Feature {
        let mut properties = self.properties.clone().unwrap_or_default();
        if let Some(id) = &self.stable_id {
            properties.insert(STABLE_ID_KEY.to_owned(), Value::String(id.to_string()));
        }
        Feature {
            kind: FeatureTag::Feature,
            id: None,
            geometry: self.geometry.clone(),
            properties,
            tool_metadata: self.tool_metadata.as_ref().map(ToolMetadata::to_value),
        }
    }
}

/// Referenz auf ein Live-Feature, wie es das Render-Surface hält.
///
/// Gleichheit ist Identität: zwei Handles sind gleich, wenn sie auf
/// denselben Datensatz zeigen — unabhängig von ihrer ID.
#[derive(Clone)]
pub struct FeatureHandle(Rc<RefCell<FeatureRecord>>);

impl FeatureHandle {
    /// Neues Handle für einen Datensatz.
    pub fn new(record: FeatureRecord) -> Self {
        Self(Rc::new(RefCell::new(record)))
    }

    /// Lesender Zugriff auf den Datensatz.
    pub fn record(&self) -> Ref<'_, FeatureRecord> {
        self.0.borrow()
    }

    /// Schreibender Zugriff auf den Datensatz.
    pub fn record_mut(&self) -> RefMut<'_, FeatureRecord> {
        self.0.borrow_mut()
    }

    /// StableId des Features (falls vergeben).
    pub fn stable_id(&self) -> Option<StableId> {
        self.0.borrow().stable_id.clone()
    }

    /// Identitätsvergleich.
    pub fn ptr_eq(&self, other: &FeatureHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Ersetzt die Geometrie in-place (Edit). ID und Registry-Eintrag bleiben unberührt.
    pub fn set_geometry(&self, geometry: Geometry) {
        self.0.borrow_mut().geometry = Some(geometry);
    }

    /// Serialisiert als GeoJSON-Feature.
    pub fn to_feature(&self) -> Feature {
        self.0.borrow().to_feature()
    }
}

impl PartialEq for FeatureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FeatureHandle {}

impl fmt::Debug for FeatureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0.borrow();
        f.debug_struct("FeatureHandle")
            .field("stable_id", &record.stable_id)
            .field("geometry_type", &record.geometry_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mirror_creates_missing_properties_container() {
        let mut record = FeatureRecord::drawn(Geometry::point(1.0, 2.0), DrawKind::Marker);
        assert!(record.properties.is_none());

        record.assign_stable_id(StableId::new("a"));
        record.mirror_stable_id();

        let properties = record.properties.as_ref().expect("Properties erwartet");
        assert_eq!(properties[STABLE_ID_KEY], json!("a"));
    }

    #[test]
    fn assign_keeps_existing_id() {
        let mut record = FeatureRecord::default();
        assert_eq!(record.assign_stable_id(StableId::new("first")), StableId::new("first"));
        assert_eq!(record.assign_stable_id(StableId::new("second")), StableId::new("first"));
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = FeatureHandle::new(FeatureRecord::default());
        let b = FeatureHandle::new(FeatureRecord::default());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn to_feature_writes_id_and_metadata() {
        let mut record = FeatureRecord::drawn(Geometry::point(1.0, 2.0), DrawKind::Marker);
        record.assign_stable_id(StableId::new("x1"));
        record.tool_metadata = Some(ToolMetadata {
            name: "Buffer".into(),
            parameters: Vec::new(),
        });

        let feature = record.to_feature();
        assert_eq!(feature.stable_id_property(), Some("x1"));
        assert_eq!(
            feature.tool_metadata.as_ref().map(|m| m["name"].clone()),
            Some(json!("Buffer"))
        );
    }

    #[test]
    fn geometry_type_falls_back_to_declared_type() {
        let record = FeatureRecord {
            declared_type: Some("marker".into()),
            ..FeatureRecord::default()
        };
        assert_eq!(record.geometry_type().as_deref(), Some("marker"));
    }
}
