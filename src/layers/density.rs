use std::f64::consts::PI;

use crate::geom::PointIndex;
use crate::types::{DensityZone, Grid};

use super::linear_decay;

/// Extra reach added to each zone's nominal radius, km.
const ZONE_BUFFER_KM: f64 = 0.5;
/// Cap on the density bonus a single cell can accumulate.
const MAX_DENSITY_BONUS: f64 = 40.0;
/// Scale of the log compression applied to the weighted density.
const DENSITY_LOG_SCALE: f64 = 4.0;

/// Population-density layer: higher local density lowers cost.
///
/// Each zone influences cells within √(area/π) + 0.5 km of its center, its
/// density weighted linearly by distance. The per-cell sum is log-compressed
/// before it is subtracted, so a megacity zone cannot drown the other layers.
/// Cells with no zone in range stay strictly neutral; missing data is not
/// treated as evidence of low demand.
pub(crate) fn apply(grid: &mut Grid, zones: &[DensityZone]) {
    if zones.is_empty() {
        log::debug!("density layer: no zones, skipping");
        return;
    }

    // Zone radii vary per record, so index the cells and iterate zones.
    let cell_index = PointIndex::build(grid.cells(), |c| (c.center_lat, c.center_lng));
    let mut weighted = vec![0.0_f64; grid.len()];
    for zone in zones {
        let radius_km = (zone.area_km2 / PI).sqrt() + ZONE_BUFFER_KM;
        for (i, d) in cell_index.within_km(zone.lat, zone.lng, radius_km) {
            weighted[i] += linear_decay(d, radius_km) * zone.density;
        }
    }

    for (cell, w) in grid.cells_mut().iter_mut().zip(weighted) {
        if w > 0.0 {
            cell.stats.local_density = w;
            cell.cost -= (DENSITY_LOG_SCALE * (1.0 + w).ln()).min(MAX_DENSITY_BONUS);
        }
    }
}
