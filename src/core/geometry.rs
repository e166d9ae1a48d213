//! Reine Geometrie-Hilfsfunktionen (Bounding-Box, Schwerpunkt, Punkt-in-Polygon,
//! Puffer, Einheiten). Keine Abhängigkeit zu Registry oder Surface.

use super::geojson::{Geometry, Position};
use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Mittlerer Erdradius in Metern.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Breitengrad-Grenze für die Längengrad-Streckung im Puffer.
const MIN_LAT_COS: f64 = 0.01;

/// Längeneinheit für Distanz-Parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Feet,
    #[default]
    Miles,
    Kilometers,
    Degrees,
}

impl DistanceUnit {
    /// Alle Einheiten in Dropdown-Reihenfolge.
    pub const ALL: [DistanceUnit; 4] = [
        DistanceUnit::Feet,
        DistanceUnit::Miles,
        DistanceUnit::Kilometers,
        DistanceUnit::Degrees,
    ];

    /// Name wie im Parameter-Dropdown.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Feet => "feet",
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Degrees => "degrees",
        }
    }

    /// Liest eine Einheit (Groß-/Kleinschreibung egal).
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    /// Erdradius in dieser Einheit (für Grad: Umrechnungsfaktor Radiant→Grad).
    fn earth_radius(self) -> f64 {
        match self {
            DistanceUnit::Feet => EARTH_RADIUS_METERS * 3.28084,
            DistanceUnit::Miles => EARTH_RADIUS_METERS / 1609.344,
            DistanceUnit::Kilometers => EARTH_RADIUS_METERS / 1000.0,
            DistanceUnit::Degrees => 180.0 / PI,
        }
    }

    /// Rechnet eine Distanz in Bogengrad um.
    pub fn to_degrees(self, distance: f64) -> f64 {
        (distance / self.earth_radius()).to_degrees()
    }
}

/// Achsenparallele Bounding-Box in Grad (x = lon, y = lat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// Aus `[west, south, east, north]`.
    pub fn from_array(bbox: [f64; 4]) -> Self {
        Self {
            min: DVec2::new(bbox[0].min(bbox[2]), bbox[1].min(bbox[3])),
            max: DVec2::new(bbox[0].max(bbox[2]), bbox[1].max(bbox[3])),
        }
    }

    /// Als `[west, south, east, north]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Punkt-Box.
    pub fn from_point(point: DVec2) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Erweitert die Box um einen Punkt.
    pub fn extend(&mut self, point: DVec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Liegt der Punkt in der Box (inklusive Rand)?
    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Mittelpunkt.
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

/// Wandelt eine GeoJSON-Position in einen Vektor (fehlende Achsen = 0).
pub fn to_vec(position: &Position) -> DVec2 {
    DVec2::new(
        position.first().copied().unwrap_or(0.0),
        position.get(1).copied().unwrap_or(0.0),
    )
}

/// Wandelt einen Vektor in eine GeoJSON-Position.
pub fn to_position(point: DVec2) -> Position {
    vec![point.x, point.y]
}

/// Alle Vertices einer Geometrie.
pub fn vertices(geometry: &Geometry) -> Vec<DVec2> {
    let mut points = Vec::with_capacity(geometry.vertex_count());
    geometry.for_each_position(&mut |p| points.push(to_vec(p)));
    points
}

/// Bounding-Box einer Geometrie (None ohne Vertices).
pub fn bbox(geometry: &Geometry) -> Option<BoundingBox> {
    let mut iter = vertices(geometry).into_iter();
    let mut bounds = BoundingBox::from_point(iter.next()?);
    iter.for_each(|p| bounds.extend(p));
    Some(bounds)
}

/// Vertex-Mittelwert als einfacher Schwerpunkt.
pub fn centroid(geometry: &Geometry) -> Option<DVec2> {
    let points = vertices(geometry);
    if points.is_empty() {
        return None;
    }
    let sum: DVec2 = points.iter().copied().sum();
    Some(sum / points.len() as f64)
}

/// Ray-Casting gegen einen Ring (Rand zählt nicht sicher als innen).
fn ring_contains(ring: &[Position], point: DVec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = to_vec(&ring[i]);
        let b = to_vec(&ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn polygon_contains(rings: &[Vec<Position>], point: DVec2) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    ring_contains(outer, point) && !holes.iter().any(|hole| ring_contains(hole, point))
}

/// Liegt der Punkt in einem Polygon bzw. MultiPolygon? Andere Typen → `false`.
pub fn point_in_polygon(point: DVec2, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Polygon { coordinates } => polygon_contains(coordinates, point),
        Geometry::MultiPolygon { coordinates } => {
            coordinates.iter().any(|rings| polygon_contains(rings, point))
        }
        _ => false,
    }
}

/// Gleichverteilter Zufallspunkt in einer Bounding-Box.
pub fn random_point_in<R: Rng + ?Sized>(rng: &mut R, bounds: &BoundingBox) -> DVec2 {
    DVec2::new(
        rng.gen_range(bounds.min.x..=bounds.max.x),
        rng.gen_range(bounds.min.y..=bounds.max.y),
    )
}

/// Konvexe Hülle (Andrew's Monotone Chain), gegen den Uhrzeigersinn, ohne Schlusspunkt.
pub fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut sorted: Vec<DVec2> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: DVec2, a: DVec2, b: DVec2| (a - o).perp_dot(b - o);
    let mut hull: Vec<DVec2> = Vec::with_capacity(sorted.len() * 2);

    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Konvexer Näherungs-Puffer: Hülle über Kreise um jeden Vertex.
///
/// `radius_deg` in Bogengrad; die Längengrad-Achse wird mit `1/cos(lat)` gestreckt.
/// Gibt `None` für nicht-positive Radien oder Geometrien ohne Vertices zurück.
pub fn buffer(geometry: &Geometry, radius_deg: f64, steps: u32) -> Option<Geometry> {
    if !(radius_deg.is_finite() && radius_deg > 0.0) {
        return None;
    }
    let steps = steps.max(8);
    let centers = vertices(geometry);
    if centers.is_empty() {
        return None;
    }

    let mut samples = Vec::with_capacity(centers.len() * steps as usize);
    for center in centers {
        let lat_cos = center.y.to_radians().cos().abs().max(MIN_LAT_COS);
        for i in 0..steps {
            let angle = TAU * i as f64 / steps as f64;
            samples.push(DVec2::new(
                center.x + radius_deg * angle.cos() / lat_cos,
                center.y + radius_deg * angle.sin(),
            ));
        }
    }

    let mut ring: Vec<Position> = convex_hull(&samples).into_iter().map(to_position).collect();
    let first = ring.first()?.clone();
    ring.push(first);
    Some(Geometry::Polygon {
        coordinates: vec![ring],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_square() -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0],
            ]],
        }
    }

    #[test]
    fn degrees_unit_is_identity() {
        assert_relative_eq!(DistanceUnit::Degrees.to_degrees(2.5), 2.5);
    }

    #[test]
    fn kilometers_to_degrees_matches_earth_radius() {
        // 1° Bogen ≈ 111.195 km
        assert_relative_eq!(
            DistanceUnit::Kilometers.to_degrees(111.195),
            1.0,
            epsilon = 1e-3
        );
        assert_eq!(DistanceUnit::parse(" Miles "), Some(DistanceUnit::Miles));
        assert_eq!(DistanceUnit::parse("parsec"), None);
    }

    #[test]
    fn point_in_polygon_respects_holes() {
        let with_hole = Geometry::Polygon {
            coordinates: vec![
                vec![
                    vec![0.0, 0.0],
                    vec![10.0, 0.0],
                    vec![10.0, 10.0],
                    vec![0.0, 10.0],
                    vec![0.0, 0.0],
                ],
                vec![
                    vec![4.0, 4.0],
                    vec![6.0, 4.0],
                    vec![6.0, 6.0],
                    vec![4.0, 6.0],
                    vec![4.0, 4.0],
                ],
            ],
        };
        assert!(point_in_polygon(DVec2::new(1.0, 1.0), &with_hole));
        assert!(!point_in_polygon(DVec2::new(5.0, 5.0), &with_hole));
        assert!(!point_in_polygon(DVec2::new(11.0, 5.0), &with_hole));
        assert!(!point_in_polygon(DVec2::new(0.5, 0.5), &Geometry::point(0.5, 0.5)));
    }

    #[test]
    fn bbox_and_centroid_of_square() {
        let bounds = bbox(&unit_square()).expect("Box erwartet");
        assert_eq!(bounds.to_array(), [0.0, 0.0, 1.0, 1.0]);
        let c = centroid(&unit_square()).expect("Schwerpunkt erwartet");
        // Schlusspunkt zählt doppelt
        assert_relative_eq!(c.x, 0.4);
        assert_relative_eq!(c.y, 0.4);
    }

    #[test]
    fn random_points_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = BoundingBox::from_array([-1.0, -2.0, 1.0, 2.0]);
        for _ in 0..200 {
            assert!(bounds.contains(random_point_in(&mut rng, &bounds)));
        }
    }

    #[test]
    fn convex_hull_drops_interior_points() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, 1.0),
        ];
        assert_eq!(convex_hull(&points).len(), 4);
    }

    #[test]
    fn buffer_of_point_is_closed_ring_around_it() {
        let buffered = buffer(&Geometry::point(0.0, 0.0), 1.0, 32).expect("Puffer erwartet");
        let Geometry::Polygon { coordinates } = &buffered else {
            panic!("Polygon erwartet");
        };
        let ring = &coordinates[0];
        assert_eq!(ring.first(), ring.last());
        assert!(point_in_polygon(DVec2::new(0.5, 0.5), &buffered));
        assert!(!point_in_polygon(DVec2::new(1.5, 0.0), &buffered));
    }

    #[test]
    fn buffer_rejects_non_positive_radius() {
        assert!(buffer(&unit_square(), 0.0, 32).is_none());
        assert!(buffer(&unit_square(), f64::NAN, 32).is_none());
    }
}
