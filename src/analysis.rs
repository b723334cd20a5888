use std::time::Instant;

use anyhow::{Result, bail};
use geo::Coord;
use serde::Serialize;

use crate::grid::generate_grid;
use crate::layers;
use crate::select::{self, CostRank, PlacedStation, SubLocation};
use crate::types::{AdoptionZone, DensityZone, Grid, Station, Substation};

/// Maximum number of locations or ranks per request.
pub const MAX_LOCATIONS: usize = 50;
/// Default minimum separation between placed stations, km.
pub const DEFAULT_MIN_DISTANCE_KM: f64 = 0.5;

/// One analysis request over a user-drawn polygon.
///
/// The polygon ring is ordered (lat, lng) pairs stored geo-style:
/// `Coord { x: lng, y: lat }`. The four datasets are read-only inputs owned
/// by the caller; any of them may be empty, which turns the corresponding
/// cost layer into a no-op.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub polygon: Vec<Coord<f64>>,
    /// Desired number of placements (point mode) or cost ranks (region mode).
    pub n: usize,
    pub min_distance_km: f64,
    pub stations: Vec<Station>,
    pub substations: Vec<Substation>,
    pub density_zones: Vec<DensityZone>,
    pub adoption_zones: Vec<AdoptionZone>,
}

impl AnalysisRequest {
    pub fn new(polygon: Vec<Coord<f64>>, n: usize) -> Self {
        Self {
            polygon,
            n,
            min_distance_km: DEFAULT_MIN_DISTANCE_KM,
            stations: Vec::new(),
            substations: Vec::new(),
            density_zones: Vec::new(),
            adoption_zones: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.polygon.len() < 3 {
            bail!("polygon must have at least 3 vertices (got {})", self.polygon.len());
        }
        if self.n == 0 || self.n > MAX_LOCATIONS {
            bail!("requested count must be in 1..={MAX_LOCATIONS} (got {})", self.n);
        }
        if !self.min_distance_km.is_finite() || self.min_distance_km < 0.0 {
            bail!("minimum distance must be a non-negative number of km");
        }
        Ok(())
    }
}

/// Point-mode response: ordered placements plus diagnostic metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    pub locations: Vec<PlacedStation>,
    pub locations_found: usize,
    pub cells_processed: usize,
    pub execution_time_s: f64,
}

/// Region-mode response: ordered cost ranks plus diagnostic metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionResponse {
    pub locations: Vec<CostRank>,
    pub locations_found: usize,
    pub cells_processed: usize,
    pub execution_time_s: f64,
}

/// Generate the grid for a request and run the four cost layers over it, in
/// their fixed order. Exposed so callers can render the scored heat map
/// without running either selector.
pub fn build_scored_grid(request: &AnalysisRequest) -> Result<Grid> {
    request.validate()?;
    let mut grid = generate_grid(&request.polygon);
    layers::apply_stations(&mut grid, &request.stations);
    layers::apply_density(&mut grid, &request.density_zones);
    layers::apply_substations(&mut grid, &request.substations);
    layers::apply_adoption(&mut grid, &request.adoption_zones);
    Ok(grid)
}

/// Point mode: score the grid, then place up to `n` mutually separated
/// stations by iterative greedy selection.
///
/// A polygon with no eligible cells yields an empty location list, and a
/// separation-constrained shortfall yields fewer than `n` locations; both
/// are normal outcomes, not errors.
pub fn find_optimal_points(request: &AnalysisRequest) -> Result<PointResponse> {
    let start = Instant::now();
    let grid = build_scored_grid(request)?;
    let cells_processed = grid.in_polygon_count();
    let locations = select::select_points(&grid, request.n, request.min_distance_km);
    let execution_time_s = start.elapsed().as_secs_f64();
    log::info!(
        "point analysis: {} of {} locations in {:.3}s over {} cells",
        locations.len(), request.n, execution_time_s, cells_processed,
    );
    Ok(PointResponse {
        locations_found: locations.len(),
        locations,
        cells_processed,
        execution_time_s,
    })
}

/// Region mode: score the grid, then extract up to `n` cost ranks of
/// connected same-cost regions, searching favorable cells first.
pub fn find_optimal_regions(request: &AnalysisRequest) -> Result<RegionResponse> {
    let start = Instant::now();
    let grid = build_scored_grid(request)?;
    let cells_processed = grid.in_polygon_count();
    let locations = select::select_ranks(&grid, request.n);
    let execution_time_s = start.elapsed().as_secs_f64();
    log::info!(
        "region analysis: {} of {} ranks in {:.3}s over {} cells",
        locations.len(), request.n, execution_time_s, cells_processed,
    );
    Ok(RegionResponse {
        locations_found: locations.len(),
        locations,
        cells_processed,
        execution_time_s,
    })
}

/// Boundary polylines of one sub-location, for rendering. Never feeds back
/// into scoring.
pub fn region_boundaries(grid: &Grid, sub: &SubLocation) -> Vec<Vec<Coord<f64>>> {
    let cells: Vec<_> = sub.cell_indices.iter().map(|&i| grid.cells()[i].clone()).collect();
    select::trace_boundary(&cells)
}
