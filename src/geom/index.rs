use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geom::dist::{haversine_km, km_to_lat_deg, km_to_lng_deg};

/// A point in an R-tree, associated with its source record by index.
#[derive(Debug, Clone)]
struct PointEntry {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

impl PointDistance for PointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.lng - point[0];
        let dy = self.lat - point[1];
        dx * dx + dy * dy
    }
}

/// An R-tree over one point dataset, queried by geographic radius.
/// Prunes with a degree-space envelope, then filters by exact haversine
/// distance.
#[derive(Debug)]
pub(crate) struct PointIndex {
    rtree: RTree<PointEntry>,
}

impl PointIndex {
    /// Build an index over `records`, extracting (lat, lng) with `pos`.
    pub(crate) fn build<T>(records: &[T], pos: impl Fn(&T) -> (f64, f64)) -> Self {
        Self {
            rtree: RTree::bulk_load(
                records.iter().enumerate()
                    .map(|(idx, record)| {
                        let (lat, lng) = pos(record);
                        PointEntry { idx, lat, lng }
                    })
                    .collect()
            ),
        }
    }

    /// Get the number of indexed points.
    #[inline] pub(crate) fn len(&self) -> usize { self.rtree.size() }

    /// Check if the index holds no points.
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.rtree.size() == 0 }

    /// Record indices and haversine distances (km) of all points within
    /// `radius_km` of (lat, lng).
    pub(crate) fn within_km(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<(usize, f64)> {
        let dlat = km_to_lat_deg(radius_km);
        let dlng = km_to_lng_deg(radius_km, lat);
        let envelope = AABB::from_corners([lng - dlng, lat - dlat], [lng + dlng, lat + dlat]);

        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|entry| {
                let d = haversine_km(lat, lng, entry.lat, entry.lng);
                (d <= radius_km).then_some((entry.idx, d))
            })
            .collect()
    }

    /// Record index and haversine distance (km) of the nearest point, if any.
    /// Nearest is resolved in degree space; adequate at city scale.
    pub(crate) fn nearest_km(&self, lat: f64, lng: f64) -> Option<(usize, f64)> {
        self.rtree
            .nearest_neighbor(&[lng, lat])
            .map(|entry| (entry.idx, haversine_km(lat, lng, entry.lat, entry.lng)))
    }
}
