use crate::geom::PointIndex;
use crate::types::{Grid, Substation};

use super::quadratic_decay;

/// Influence radius of a substation, km.
const INFLUENCE_RADIUS_KM: f64 = 5.0;
/// Bonus contributed by a reference-voltage substation at zero distance.
const MAX_SUBSTATION_BONUS: f64 = 30.0;
/// Reference voltage; influence scales with voltage_kv / REFERENCE_KV.
const REFERENCE_KV: f64 = 400.0;
/// Cap on the voltage scale factor.
const MAX_VOLTAGE_SCALE: f64 = 1.5;

/// Substation-proximity layer: closer to a higher-voltage substation is
/// cheaper.
///
/// Influence decays quadratically to the radius and scales with voltage,
/// capped at 1.5x the reference. Only the single most favorable substation
/// influences a cell; contributions are deliberately not summed across
/// substations. A site feeds from one substation in practice, and summing
/// would let feeder-dense urban cores swamp every other layer.
pub(crate) fn apply(grid: &mut Grid, substations: &[Substation]) {
    if substations.is_empty() {
        log::debug!("substation layer: no substations, skipping");
        return;
    }

    let index = PointIndex::build(substations, |s| (s.lat, s.lng));
    for cell in grid.cells_mut() {
        let mut best: Option<(f64, f64, f64)> = None; // (influence, distance, kv)
        for (i, d) in index.within_km(cell.center_lat, cell.center_lng, INFLUENCE_RADIUS_KM) {
            let kv = substations[i].voltage_kv;
            let scale = (kv / REFERENCE_KV).min(MAX_VOLTAGE_SCALE);
            let influence = -MAX_SUBSTATION_BONUS * quadratic_decay(d, INFLUENCE_RADIUS_KM) * scale;
            if best.is_none_or(|(b, _, _)| influence < b) {
                best = Some((influence, d, kv));
            }
        }
        if let Some((influence, d, kv)) = best {
            cell.stats.substation_km = Some(d);
            cell.stats.substation_kv = Some(kv);
            cell.cost += influence;
        }
    }
}
