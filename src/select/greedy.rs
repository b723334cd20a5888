use serde::Serialize;

use crate::geom::haversine_km;
use crate::types::Grid;

/// Per-iteration candidate cap; eligible cells are stride-sampled down to it.
const CANDIDATE_CAP: usize = 500;
/// Radius of the overlap penalty and of post-placement re-penalization, km.
const OVERLAP_RADIUS_KM: f64 = 5.0;
/// Overlap penalty against a placed station at zero distance.
const MAX_OVERLAP_PENALTY: f64 = 60.0;
/// Working-cost increase at a newly placed station, decaying linearly to
/// zero at the overlap radius.
const REPENALTY_AT_STATION: f64 = 100.0;
/// Scale of the log-compressed density coverage bonus.
const DENSITY_BONUS_SCALE: f64 = 4.0;

/// One placed station in point mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedStation {
    /// 1-based placement order.
    pub station_number: usize,
    pub latitude: f64,
    pub longitude: f64,
    /// Accumulated layer cost of the chosen cell (before re-penalization).
    pub cost: f64,
    /// Selection score at pick time: working cost, plus overlap penalties
    /// against earlier picks, minus the density coverage bonus.
    pub score: f64,
    pub density: f64,
    pub nearest_station_distance: Option<f64>,
    pub adoption_likelihood: f64,
}

/// Iterative greedy placement with a minimum-separation constraint.
///
/// Each iteration stride-samples the eligible cells (deterministic, bounds
/// per-iteration work on large grids), discards candidates within
/// `min_distance_km` of an earlier pick, scores the rest, and takes the
/// minimum. After every pick but the last, cells within the overlap radius
/// have their working cost raised, so clustering new stations has
/// diminishing value for subsequent iterations. The per-cell `cost` on the
/// grid itself is never mutated here.
///
/// Returns fewer than `n` placements when the separation constraint exhausts
/// the candidates; a partial result is a normal outcome, not an error.
pub(crate) fn select_points(grid: &Grid, n: usize, min_distance_km: f64) -> Vec<PlacedStation> {
    let eligible: Vec<usize> = grid.cells().iter().enumerate()
        .filter(|(_, cell)| cell.in_polygon && !cell.is_buffer)
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return Vec::new();
    }

    let mut working: Vec<f64> = grid.cells().iter().map(|cell| cell.cost).collect();
    let mut placed: Vec<(f64, f64)> = Vec::new();
    let mut used = vec![false; grid.len()];
    let mut results = Vec::new();

    let stride = eligible.len().div_ceil(CANDIDATE_CAP).max(1);

    while results.len() < n {
        let mut best: Option<(usize, f64)> = None;
        for &idx in eligible.iter().step_by(stride) {
            if used[idx] {
                continue;
            }
            let cell = &grid.cells()[idx];
            if placed.iter().any(|&(lat, lng)| {
                haversine_km(cell.center_lat, cell.center_lng, lat, lng) < min_distance_km
            }) {
                continue;
            }

            let mut score = working[idx];
            for &(lat, lng) in &placed {
                let d = haversine_km(cell.center_lat, cell.center_lng, lat, lng);
                if d < OVERLAP_RADIUS_KM {
                    score += MAX_OVERLAP_PENALTY * (1.0 - d / OVERLAP_RADIUS_KM);
                }
            }
            score -= DENSITY_BONUS_SCALE * (1.0 + cell.stats.local_density).ln();

            if best.is_none_or(|(_, b)| score < b) {
                best = Some((idx, score));
            }
        }

        let Some((idx, score)) = best else {
            log::info!(
                "greedy placement stopped early: {} of {} placed, separation constraint exhausted",
                results.len(), n,
            );
            break;
        };

        used[idx] = true;
        let cell = &grid.cells()[idx];
        let (lat, lng) = (cell.center_lat, cell.center_lng);
        placed.push((lat, lng));
        results.push(PlacedStation {
            station_number: results.len() + 1,
            latitude: lat,
            longitude: lng,
            cost: cell.cost,
            score,
            density: cell.stats.local_density,
            nearest_station_distance: cell.stats.nearest_station_km,
            adoption_likelihood: cell.stats.adoption_likelihood,
        });
        log::debug!("placed station {} at ({lat:.5}, {lng:.5}) score {score:.2}", results.len());

        // Diminishing returns: raise working costs around the new station so
        // later iterations look elsewhere. Skipped after the final pick.
        if results.len() < n {
            for &other in &eligible {
                let oc = &grid.cells()[other];
                let d = haversine_km(oc.center_lat, oc.center_lng, lat, lng);
                if d < OVERLAP_RADIUS_KM {
                    working[other] += REPENALTY_AT_STATION * (1.0 - d / OVERLAP_RADIUS_KM);
                }
            }
        }
    }

    results
}
