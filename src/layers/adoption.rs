use crate::geom::PointIndex;
use crate::types::{AdoptionZone, Grid};

use super::linear_decay;

/// Influence radius of an adoption zone, km.
const INFLUENCE_RADIUS_KM: f64 = 3.0;
/// Bonus at a weighted average adoption score of 100.
const MAX_ADOPTION_BONUS: f64 = 20.0;

/// Adoption-likelihood layer: a high adoption propensity nearby lowers cost.
///
/// The cell takes the distance-weighted average of the 0-100 adoption scores
/// of zones within range, mapped linearly onto a 0 to -20 cost adjustment.
/// Averaging (rather than summing) keeps a cluster of mediocre zones from
/// outscoring one excellent zone.
pub(crate) fn apply(grid: &mut Grid, zones: &[AdoptionZone]) {
    if zones.is_empty() {
        log::debug!("adoption layer: no zones, skipping");
        return;
    }

    let index = PointIndex::build(zones, |z| (z.lat, z.lng));
    for cell in grid.cells_mut() {
        let mut weight_sum = 0.0;
        let mut score_sum = 0.0;
        for (i, d) in index.within_km(cell.center_lat, cell.center_lng, INFLUENCE_RADIUS_KM) {
            let w = linear_decay(d, INFLUENCE_RADIUS_KM);
            weight_sum += w;
            score_sum += w * zones[i].score;
        }
        if weight_sum > 0.0 {
            let avg = score_sum / weight_sum;
            cell.stats.adoption_likelihood = avg;
            cell.cost -= avg / 100.0 * MAX_ADOPTION_BONUS;
        }
    }
}
