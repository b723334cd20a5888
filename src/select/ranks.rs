use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::types::Grid;

/// Favorable band: accumulated cost at or below this threshold.
const FAVORABLE_MAX_COST: f64 = -33.0;
/// Neutral band: cost above the favorable threshold, at or below this one.
/// Anything higher is unfavorable.
const NEUTRAL_MAX_COST: f64 = 33.0;

/// One cell of a ranked region.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCell {
    pub lat: f64,
    pub lng: f64,
    pub cost: f64,
    /// Cell side length in meters.
    pub cell_size: f64,
}

/// Bounding box of a sub-location's cell centers.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// One 8-connected region of same-cost cells within a rank.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLocation {
    pub sub_index: usize,
    pub cell_count: usize,
    pub cells: Vec<RegionCell>,
    pub bounds: Bounds,
    /// Centroid latitude of the region's cell centers.
    pub latitude: f64,
    /// Centroid longitude of the region's cell centers.
    pub longitude: f64,
    pub avg_density: f64,
    pub avg_nearest_station: f64,
    /// Grid cell indices backing this region, for boundary tracing.
    #[serde(skip)]
    pub cell_indices: Vec<usize>,
}

/// One distinct cost tier: every eligible cell sharing the same rounded cost,
/// split into disjoint connected sub-locations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRank {
    /// 1-based rank; rank 1 is the most favorable returned.
    pub cost_rank: usize,
    pub cost: f64,
    pub sub_location_count: usize,
    pub total_cell_count: usize,
    pub sub_locations: Vec<SubLocation>,
}

/// Tiered rank extraction: divide-and-conquer across favorability bands.
///
/// Eligible cells are split into favorable / neutral / unfavorable bands and
/// the bands are searched in that order, stopping as soon as `n` ranks are
/// collected, so unfavorable cells are never touched when the favorable band
/// suffices. Within a band, cells group by cost rounded to 2 decimals,
/// ascending (best first); each group's 8-connected components become the
/// rank's sub-locations, and grouped cells are excluded from later ranks and
/// bands.
///
/// Deterministic: grouping and flood fill follow cell input order; hash maps
/// are used for membership only.
pub(crate) fn select_ranks(grid: &Grid, n: usize) -> Vec<CostRank> {
    // Band partition, input order preserved within each band.
    let mut bands: [Vec<usize>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for (i, cell) in grid.cells().iter().enumerate() {
        if !cell.in_polygon || cell.is_buffer {
            continue;
        }
        let band = if cell.cost <= FAVORABLE_MAX_COST {
            0
        } else if cell.cost <= NEUTRAL_MAX_COST {
            1
        } else {
            2
        };
        bands[band].push(i);
    }
    log::debug!(
        "rank extraction: {} favorable, {} neutral, {} unfavorable cells",
        bands[0].len(), bands[1].len(), bands[2].len(),
    );

    let mut ranks: Vec<CostRank> = Vec::new();
    for (band_idx, band) in bands.iter().enumerate() {
        if ranks.len() >= n {
            log::debug!("rank extraction: {n} ranks found, skipping band {band_idx}");
            break;
        }
        if band.is_empty() {
            continue;
        }

        // Group by cost in hundredths; keys sorted ascending so the best
        // cost becomes the next rank.
        let mut groups: AHashMap<i64, Vec<usize>> = AHashMap::new();
        for &i in band {
            let key = (grid.cells()[i].cost * 100.0).round() as i64;
            groups.entry(key).or_default().push(i);
        }
        let mut keys: Vec<i64> = groups.keys().copied().collect();
        keys.sort_unstable();

        for key in keys {
            if ranks.len() >= n {
                break;
            }
            let group = &groups[&key];
            let components = connected_components(grid, group);

            let sub_locations: Vec<SubLocation> = components.into_iter().enumerate()
                .map(|(sub_index, indices)| build_sub_location(grid, sub_index, indices))
                .collect();

            let total_cell_count = group.len();
            ranks.push(CostRank {
                cost_rank: ranks.len() + 1,
                cost: key as f64 / 100.0,
                sub_location_count: sub_locations.len(),
                total_cell_count,
                sub_locations,
            });
        }
    }

    ranks
}

/// 8-connected components over the (row, col) lattice, via flood fill on an
/// index built once per group. Diagonal neighbors are connected HERE ONLY;
/// boundary tracing uses 4-connectivity, and the mismatch is intentional:
/// diagonally chained cells group into one region but still draw all four
/// edges of each cell, keeping the outline visually contiguous.
fn connected_components(grid: &Grid, group: &[usize]) -> Vec<Vec<usize>> {
    let positions: AHashMap<(i32, i32), usize> = group.iter()
        .map(|&i| ((grid.cells()[i].row, grid.cells()[i].col), i))
        .collect();

    let mut visited: AHashSet<(i32, i32)> = AHashSet::new();
    let mut components = Vec::new();

    for &i in group {
        let start = (grid.cells()[i].row, grid.cells()[i].col);
        if visited.contains(&start) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            if !visited.insert(key) {
                continue;
            }
            let Some(&idx) = positions.get(&key) else { continue };
            component.push(idx);

            for dr in -1..=1 {
                for dc in -1..=1 {
                    if (dr, dc) == (0, 0) {
                        continue;
                    }
                    let neighbor = (key.0 + dr, key.1 + dc);
                    if positions.contains_key(&neighbor) && !visited.contains(&neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }

        if !component.is_empty() {
            components.push(component);
        }
    }

    components
}

fn build_sub_location(grid: &Grid, sub_index: usize, indices: Vec<usize>) -> SubLocation {
    let cells: Vec<RegionCell> = indices.iter().map(|&i| {
        let cell = &grid.cells()[i];
        RegionCell {
            lat: cell.center_lat,
            lng: cell.center_lng,
            cost: cell.cost,
            cell_size: cell.size_m,
        }
    }).collect();

    let count = cells.len() as f64;
    let bounds = Bounds {
        min_lat: cells.iter().map(|c| c.lat).fold(f64::INFINITY, f64::min),
        max_lat: cells.iter().map(|c| c.lat).fold(f64::NEG_INFINITY, f64::max),
        min_lng: cells.iter().map(|c| c.lng).fold(f64::INFINITY, f64::min),
        max_lng: cells.iter().map(|c| c.lng).fold(f64::NEG_INFINITY, f64::max),
    };
    let avg_density = indices.iter()
        .map(|&i| grid.cells()[i].stats.local_density)
        .sum::<f64>() / count;
    let avg_nearest_station = indices.iter()
        .map(|&i| grid.cells()[i].stats.nearest_station_km.unwrap_or(0.0))
        .sum::<f64>() / count;

    SubLocation {
        sub_index,
        cell_count: cells.len(),
        latitude: cells.iter().map(|c| c.lat).sum::<f64>() / count,
        longitude: cells.iter().map(|c| c.lng).sum::<f64>() / count,
        cells,
        bounds,
        avg_density,
        avg_nearest_station,
        cell_indices: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, Grid, make_cell};

    fn grid_of(cells: Vec<Cell>) -> Grid {
        Grid::new(cells, 111.0, 0.001, 0.001)
    }

    #[test]
    fn ranks_come_back_in_non_decreasing_cost_order() {
        let cells = vec![
            make_cell(0, 0, 5.0),
            make_cell(0, 1, -2.0),
            make_cell(5, 5, -40.0),
            make_cell(8, 8, 50.0),
        ];
        let ranks = select_ranks(&grid_of(cells), 4);
        assert_eq!(ranks.len(), 4);
        for pair in ranks.windows(2) {
            assert!(pair[0].cost <= pair[1].cost);
        }
        assert_eq!(ranks[0].cost, -40.0);
        assert_eq!(ranks[0].cost_rank, 1);
        assert_eq!(ranks[3].cost, 50.0);
    }

    #[test]
    fn favorable_band_is_searched_first_and_stops_early() {
        // One favorable cell and many neutral ones; n = 1 must return only
        // the favorable rank.
        let mut cells = vec![make_cell(0, 0, -40.0)];
        for col in 1..6 {
            cells.push(make_cell(0, col, 1.0));
        }
        let ranks = select_ranks(&grid_of(cells), 1);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].cost, -40.0);
    }

    #[test]
    fn band_threshold_is_strict_about_the_boundary() {
        // A -5 cell is neutral, not favorable: searching 1 rank over a grid
        // of 10-cost cells with a single -5 center returns the -5 rank from
        // the NEUTRAL band, never a favorable one.
        let mut cells = Vec::new();
        for row in 0..5 {
            for col in 0..5 {
                let cost = if (row, col) == (2, 2) { -5.0 } else { 10.0 };
                cells.push(make_cell(row, col, cost));
            }
        }
        let ranks = select_ranks(&grid_of(cells), 1);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].cost, -5.0);
        // And a favorable-band threshold check: -5 is not <= -33.
        assert!(ranks[0].cost > FAVORABLE_MAX_COST);
    }

    #[test]
    fn same_cost_cells_split_into_disjoint_components() {
        // Two clusters of equal cost, far apart on the lattice.
        let cells = vec![
            make_cell(0, 0, -50.0),
            make_cell(0, 1, -50.0),
            make_cell(20, 20, -50.0),
        ];
        let ranks = select_ranks(&grid_of(cells), 1);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].sub_location_count, 2);
        assert_eq!(ranks[0].total_cell_count, 3);
        let counts: Vec<usize> = ranks[0].sub_locations.iter().map(|s| s.cell_count).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn diagonal_neighbors_join_one_component() {
        let cells = vec![make_cell(0, 0, -50.0), make_cell(1, 1, -50.0)];
        let ranks = select_ranks(&grid_of(cells), 1);
        assert_eq!(ranks[0].sub_location_count, 1);
        assert_eq!(ranks[0].sub_locations[0].cell_count, 2);
    }

    #[test]
    fn sub_locations_are_mutually_non_adjacent() {
        let grid = grid_of(vec![
            make_cell(0, 0, -50.0),
            make_cell(0, 1, -50.0),
            make_cell(10, 10, -50.0),
            make_cell(10, 11, -50.0),
        ]);
        let ranks = select_ranks(&grid, 1);
        let subs = &ranks[0].sub_locations;
        assert_eq!(subs.len(), 2);
        // No 8-connectivity between cells of different sub-locations.
        for a in &subs[0].cell_indices {
            for b in &subs[1].cell_indices {
                let ca = &grid.cells()[*a];
                let cb = &grid.cells()[*b];
                assert!((ca.row - cb.row).abs() > 1 || (ca.col - cb.col).abs() > 1);
            }
        }
    }

    #[test]
    fn costs_group_by_two_decimal_rounding() {
        let cells = vec![make_cell(0, 0, -10.001), make_cell(0, 1, -9.999)];
        let ranks = select_ranks(&grid_of(cells), 5);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].cost, -10.0);
        assert_eq!(ranks[0].total_cell_count, 2);
    }

    #[test]
    fn centroid_and_bounds_summarize_the_region() {
        let cells = vec![make_cell(0, 0, -50.0), make_cell(0, 1, -50.0)];
        let grid = grid_of(cells);
        let ranks = select_ranks(&grid, 1);
        let sub = &ranks[0].sub_locations[0];
        let (a, b) = (grid.cells()[0].clone(), grid.cells()[1].clone());
        assert!((sub.latitude - (a.center_lat + b.center_lat) / 2.0).abs() < 1e-12);
        assert!((sub.longitude - (a.center_lng + b.center_lng) / 2.0).abs() < 1e-12);
        assert_eq!(sub.bounds.min_lng, a.center_lng.min(b.center_lng));
        assert_eq!(sub.bounds.max_lng, a.center_lng.max(b.center_lng));
    }

    #[test]
    fn no_eligible_cells_yields_no_ranks() {
        let mut cell = make_cell(0, 0, -50.0);
        cell.in_polygon = false;
        assert!(select_ranks(&grid_of(vec![cell]), 3).is_empty());
    }

    #[test]
    fn serializes_with_the_wire_field_names() {
        let cells = vec![make_cell(0, 0, -50.0)];
        let ranks = select_ranks(&grid_of(cells), 1);
        let json = serde_json::to_value(&ranks[0]).unwrap();
        assert_eq!(json["costRank"], 1);
        assert_eq!(json["subLocationCount"], 1);
        let sub = &json["subLocations"][0];
        assert!(sub.get("cellIndices").is_none());
        assert_eq!(sub["cells"][0]["cellSize"], 111.0);
        assert!(sub["bounds"]["minLat"].is_number());
    }
}
