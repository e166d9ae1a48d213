//! Spatial-Index (KD-Tree) über Feature-Schwerpunkten.

use glam::DVec2;
use kiddo::{KdTree, SquaredEuclidean};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// Index des Punkts in der Eingabeliste
    pub index: usize,
    /// Euklidische Distanz (in Grad) zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über einer festen Punktliste.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    points: Vec<DVec2>,
}

impl SpatialIndex {
    /// Baut einen Index; die Item-ID entspricht dem Listen-Index.
    pub fn from_points(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: (&entries).into(),
            points: points.to_vec(),
        }
    }

    /// Anzahl indexierter Punkte.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true`, wenn keine Punkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Nächster Punkt zur Query-Position.
    pub fn nearest(&self, query: DVec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let index = result.item as usize;
        (index < self.points.len()).then(|| SpatialMatch {
            index,
            distance: result.distance.sqrt(),
        })
    }

    /// Alle Punkte innerhalb eines Radius, aufsteigend nach Distanz.
    pub fn within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() || !radius.is_finite() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let index = entry.item as usize;
                (index < self.points.len()).then(|| SpatialMatch {
                    index,
                    distance: entry.distance.sqrt(),
                })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    /// Single-Linkage-Clustering: Punkte mit Abstand ≤ `radius` landen
    /// (auch transitiv) in derselben Gruppe.
    ///
    /// Gibt pro Punkt eine Gruppennummer zurück; Nummern sind dicht ab 0 und
    /// folgen der Reihenfolge des ersten Auftretens.
    pub fn clusters(&self, radius: f64) -> Vec<usize> {
        let mut labels: Vec<Option<usize>> = vec![None; self.points.len()];
        let mut next_label = 0;

        for start in 0..self.points.len() {
            if labels[start].is_some() {
                continue;
            }
            labels[start] = Some(next_label);
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                for hit in self.within_radius(self.points[current], radius) {
                    if labels[hit.index].is_none() {
                        labels[hit.index] = Some(next_label);
                        stack.push(hit.index);
                    }
                }
            }
            next_label += 1;
        }

        labels.into_iter().map(|l| l.unwrap_or(0)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpatialIndex {
        SpatialIndex::from_points(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(0.5, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(1.0, 0.0),
        ])
    }

    #[test]
    fn nearest_finds_closest_point() {
        let hit = sample().nearest(DVec2::new(9.0, 9.5)).expect("Treffer erwartet");
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn within_radius_is_sorted_by_distance() {
        let hits = sample().within_radius(DVec2::new(0.0, 0.0), 0.75);
        let indices: Vec<usize> = hits.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn clusters_link_transitively() {
        // 0 — 1 — 3 sind je 0.5 auseinander, 2 liegt weit weg
        assert_eq!(sample().clusters(0.6), vec![0, 0, 1, 0]);
        assert_eq!(sample().clusters(0.1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = SpatialIndex::from_points(&[]);
        assert!(index.nearest(DVec2::ZERO).is_none());
        assert!(index.clusters(1.0).is_empty());
    }
}
