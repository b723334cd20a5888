use crate::geom::PointIndex;
use crate::types::{Grid, Station};

use super::quadratic_decay;

/// Influence radius of an existing station, km.
const INFLUENCE_RADIUS_KM: f64 = 2.0;
/// Penalty contributed by a single station at zero distance.
const MAX_PENALTY_COST: f64 = 100.0;
/// Far-distance bonus slope, per km beyond the influence radius.
const FAR_BONUS_PER_KM: f64 = 25.0;
/// Cap on the far-distance bonus.
const MAX_FAR_BONUS: f64 = 50.0;

/// Station-proximity layer: cells near existing stations get more expensive,
/// cells far from every station get cheaper.
///
/// Each station within the influence radius contributes a quadratic penalty,
/// `MAX_PENALTY_COST` at distance zero and 0 at the radius, summed across
/// stations. A cell with no station in range instead earns a bonus growing
/// linearly with its nearest-station distance beyond the radius, capped at
/// `MAX_FAR_BONUS`.
pub(crate) fn apply(grid: &mut Grid, stations: &[Station]) {
    if stations.is_empty() {
        log::debug!("station layer: no stations, skipping");
        return;
    }

    let index = PointIndex::build(stations, |s| (s.lat, s.lng));
    for cell in grid.cells_mut() {
        let nearby = index.within_km(cell.center_lat, cell.center_lng, INFLUENCE_RADIUS_KM);
        if nearby.is_empty() {
            let Some((_, d)) = index.nearest_km(cell.center_lat, cell.center_lng) else {
                continue;
            };
            cell.stats.nearest_station_km = Some(d);
            let bonus = ((d - INFLUENCE_RADIUS_KM) * FAR_BONUS_PER_KM).min(MAX_FAR_BONUS);
            cell.cost -= bonus.max(0.0);
        } else {
            let mut nearest = f64::INFINITY;
            let mut penalty = 0.0;
            for (_, d) in nearby {
                nearest = nearest.min(d);
                penalty += MAX_PENALTY_COST * quadratic_decay(d, INFLUENCE_RADIUS_KM);
            }
            cell.stats.nearest_station_km = Some(nearest);
            cell.cost += penalty;
        }
    }
}
