use geo::{Coord, Rect};

use crate::geom::{km_to_lat_deg, km_to_lng_deg, point_in_polygon, polygon_area_km2};
use crate::types::{Cell, CellStats, Grid};

/// Cell budget reserved for the buffer band; the band is
/// round(sqrt(budget / 4)) cell layers deep on every side.
const BUFFER_CELL_BUDGET: f64 = 400.0;

/// Resolution tier for a polygon of the given area: nominal cell footprint
/// in m² and the cell-count ceiling. Small polygons get fine cells and a
/// high ceiling; large ones get coarse cells and a low ceiling.
fn resolution_tier(area_km2: f64) -> (f64, usize) {
    if area_km2 <= 10.0 {
        (50.0, 15_000)
    } else if area_km2 <= 50.0 {
        (100.0, 10_000)
    } else if area_km2 <= 100.0 {
        (200.0, 8_000)
    } else {
        (500.0, 5_000)
    }
}

/// Axis-aligned bounding box of a (lat, lng) ring. x = lng, y = lat.
fn bounding_box(ring: &[Coord<f64>]) -> Option<Rect<f64>> {
    let first = *ring.first()?;
    let (min, max) = ring.iter().fold((first, first), |(min, max), c| {
        (
            Coord { x: min.x.min(c.x), y: min.y.min(c.y) },
            Coord { x: max.x.max(c.x), y: max.y.max(c.y) },
        )
    });
    Some(Rect::new(min, max))
}

/// Convert a polygon boundary into a uniform cell lattice with a buffer band.
///
/// Cell size adapts to polygon area (see `resolution_tier`); the side length
/// is 2·√footprint, a deliberate 2x inflation of the nominal footprint. If the
/// projected cell count over the bounding box still exceeds the tier ceiling,
/// the footprint is scaled up once by √(count / ceiling).
///
/// Each lattice cell is marked `in_polygon` by a cheap two-sided intersection
/// test (any cell corner inside the ring, or any ring vertex inside the cell's
/// bounding box), not exact clipping. Cells outside the polygon's bounding box
/// but within the buffer band are marked `is_buffer`; they are scored by the
/// cost layers so edge cells see real neighbors, but are never
/// placement-eligible.
///
/// A ring with fewer than 3 vertices yields an empty grid.
pub fn generate_grid(polygon: &[Coord<f64>]) -> Grid {
    let Some(bounds) = bounding_box(polygon) else {
        return Grid::new(Vec::new(), 0.0, 0.0, 0.0);
    };
    if polygon.len() < 3 {
        return Grid::new(Vec::new(), 0.0, 0.0, 0.0);
    }

    let area_km2 = polygon_area_km2(polygon);
    let (footprint_m2, max_cells) = resolution_tier(area_km2);

    let center_lat = (bounds.min().y + bounds.max().y) / 2.0;
    let mut cell_area_m2 = footprint_m2;
    let mut side_m = 2.0 * cell_area_m2.sqrt();

    // Projected count over the bounding box; one corrective pass keeps the
    // resolution bounded without iterating.
    let bbox_w_km = (bounds.max().x - bounds.min().x) / km_to_lng_deg(1.0, center_lat);
    let bbox_h_km = (bounds.max().y - bounds.min().y) / km_to_lat_deg(1.0);
    let projected = (bbox_w_km * bbox_h_km * 1e6) / (side_m * side_m);
    if projected > max_cells as f64 {
        cell_area_m2 *= (projected / max_cells as f64).sqrt();
        side_m = 2.0 * cell_area_m2.sqrt();
    }

    let lat_step = km_to_lat_deg(side_m / 1000.0);
    let lng_step = km_to_lng_deg(side_m / 1000.0, center_lat);

    let buffer_layers = (BUFFER_CELL_BUDGET / 4.0).sqrt().round() as i32;

    // Global lattice indices: row = floor(lat / step), col = floor(lng / step).
    let row_min = (bounds.min().y / lat_step).floor() as i32 - buffer_layers;
    let row_max = (bounds.max().y / lat_step).ceil() as i32 + buffer_layers;
    let col_min = (bounds.min().x / lng_step).floor() as i32 - buffer_layers;
    let col_max = (bounds.max().x / lng_step).ceil() as i32 + buffer_layers;

    let mut cells = Vec::new();
    for row in row_min..row_max {
        for col in col_min..col_max {
            let min_lat = row as f64 * lat_step;
            let max_lat = (row + 1) as f64 * lat_step;
            let min_lng = col as f64 * lng_step;
            let max_lng = (col + 1) as f64 * lng_step;
            let center_lat = min_lat + lat_step / 2.0;
            let center_lng = min_lng + lng_step / 2.0;

            let corner_inside = [
                (min_lat, min_lng), (min_lat, max_lng),
                (max_lat, min_lng), (max_lat, max_lng),
            ]
            .iter()
            .any(|&(lat, lng)| point_in_polygon(lat, lng, polygon));
            let vertex_inside = polygon.iter().any(|v| {
                v.y >= min_lat && v.y <= max_lat && v.x >= min_lng && v.x <= max_lng
            });

            let is_buffer = center_lat < bounds.min().y || center_lat > bounds.max().y
                || center_lng < bounds.min().x || center_lng > bounds.max().x;

            cells.push(Cell {
                row,
                col,
                center_lat,
                center_lng,
                min_lat,
                max_lat,
                min_lng,
                max_lng,
                size_m: side_m,
                in_polygon: corner_inside || vertex_inside,
                is_buffer,
                cost: 0.0,
                stats: CellStats::default(),
            });
        }
    }

    let grid = Grid::new(cells, side_m, lat_step, lng_step);
    log::debug!(
        "generated grid: {} cells ({} in polygon), side {:.1} m, area {:.2} km2",
        grid.len(),
        grid.in_polygon_count(),
        side_m,
        area_km2,
    );
    grid
}
