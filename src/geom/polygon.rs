use geo::Coord;

use crate::geom::dist::EARTH_RADIUS_KM;

/// Ray-casting parity test for a point against an ordered polygon ring.
///
/// Coordinates follow the geo convention: `x` is longitude, `y` is latitude.
/// The ring need not repeat its first vertex. Results for self-intersecting
/// rings are unspecified.
pub fn point_in_polygon(lat: f64, lng: f64, ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if (yi > lat) != (yj > lat) && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Approximate geodesic area of a polygon ring in km², by spherical excess:
/// sum of (λ2-λ1)·(2 + sin φ1 + sin φ2) over edges, scaled by R²/2.
///
/// Used to pick grid resolution; not accurate enough for survey work.
pub fn polygon_area_km2(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let (lng1, lat1) = (a.x.to_radians(), a.y.to_radians());
        let (lng2, lat2) = (b.x.to_radians(), b.y.to_radians());
        sum += (lng2 - lng1) * (2.0 + lat1.sin() + lat2.sin());
    }
    (sum * EARTH_RADIUS_KM * EARTH_RADIUS_KM / 2.0).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lng: f64, lat: f64) -> Coord<f64> {
        Coord { x: lng, y: lat }
    }

    fn unit_square() -> Vec<Coord<f64>> {
        vec![coord(0.0, 0.0), coord(1.0, 0.0), coord(1.0, 1.0), coord(0.0, 1.0)]
    }

    #[test]
    fn point_inside_square() {
        assert!(point_in_polygon(0.5, 0.5, &unit_square()));
    }

    #[test]
    fn point_outside_square() {
        assert!(!point_in_polygon(1.5, 0.5, &unit_square()));
        assert!(!point_in_polygon(0.5, -0.1, &unit_square()));
    }

    #[test]
    fn point_inside_concave_notch() {
        // L-shape: the notch at the upper right is outside.
        let ring = vec![
            coord(0.0, 0.0), coord(2.0, 0.0), coord(2.0, 1.0),
            coord(1.0, 1.0), coord(1.0, 2.0), coord(0.0, 2.0),
        ];
        assert!(point_in_polygon(0.5, 0.5, &ring));
        assert!(point_in_polygon(1.5, 0.5, &ring));
        assert!(!point_in_polygon(1.5, 1.5, &ring));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        assert!(!point_in_polygon(0.0, 0.0, &[]));
        assert!(!point_in_polygon(0.0, 0.0, &[coord(0.0, 0.0), coord(1.0, 1.0)]));
    }

    #[test]
    fn area_of_small_square_at_the_equator() {
        // Exact spherical area of a lat/lng rectangle is R²·Δλ·(sin φ2 - sin φ1).
        let d = 0.01_f64;
        let ring = vec![coord(0.0, 0.0), coord(d, 0.0), coord(d, d), coord(0.0, d)];
        let expected = EARTH_RADIUS_KM * EARTH_RADIUS_KM
            * d.to_radians()
            * d.to_radians().sin();
        let area = polygon_area_km2(&ring);
        assert!((area - expected).abs() < 1e-6, "area {area}, expected {expected}");
        // Sanity: a ~1.11 km square is about 1.24 km².
        assert!(area > 1.2 && area < 1.3, "area {area}");
    }

    #[test]
    fn area_is_orientation_independent() {
        let mut ring = unit_square();
        let ccw = polygon_area_km2(&ring);
        ring.reverse();
        let cw = polygon_area_km2(&ring);
        assert!((ccw - cw).abs() < 1e-9);
    }

    #[test]
    fn degenerate_ring_has_zero_area() {
        assert_eq!(polygon_area_km2(&[]), 0.0);
        assert_eq!(polygon_area_km2(&[coord(0.0, 0.0), coord(1.0, 0.0)]), 0.0);
    }
}
