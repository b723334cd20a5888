use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// An existing charging station. Proximity raises the cost of nearby cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub lat: f64,
    pub lng: f64,
}

/// A power-grid substation with its nominal voltage in kilovolts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Substation {
    pub lat: f64,
    pub lng: f64,
    pub voltage_kv: f64,
}

/// A population-density zone centered at (lat, lng) covering `area_km2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityZone {
    pub lat: f64,
    pub lng: f64,
    pub density: f64,
    pub area_km2: f64,
}

/// An EV-adoption zone: `score` is an adoption propensity on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdoptionZone {
    pub lat: f64,
    pub lng: f64,
    pub score: f64,
    pub population: f64,
    pub area_km2: f64,
}

/// Per-cell diagnostics recorded by the cost layers for display and debugging.
/// Kept separate from `Cell` scoring state so nothing here feeds back into
/// the accumulated cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStats {
    /// Haversine distance to the nearest existing station, if any exist.
    pub nearest_station_km: Option<f64>,
    /// Distance-weighted population density accumulated from nearby zones.
    pub local_density: f64,
    /// Distance-weighted average adoption score (0-100) of nearby zones.
    pub adoption_likelihood: f64,
    /// Distance to the substation whose influence was applied, if any.
    pub substation_km: Option<f64>,
    /// Voltage of the substation whose influence was applied, if any.
    pub substation_kv: Option<f64>,
}

/// One grid cell: the atomic unit of analysis.
///
/// Created once per request by the grid generator, mutated in place by each
/// cost layer, then consumed read-only by the selector or rank extractor.
/// Lower `cost` is more favorable for placement; the accumulated sum is
/// unbounded in principle, though display assumes roughly [-100, 100].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Lattice row, derived from latitude / lat-step at generation time.
    pub row: i32,
    /// Lattice column, derived from longitude / lng-step at generation time.
    pub col: i32,
    pub center_lat: f64,
    pub center_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// Cell side length in meters.
    pub size_m: f64,
    /// Cell intersects the user polygon; only these are placement-eligible.
    pub in_polygon: bool,
    /// Cell lies in the padding ring outside the polygon's bounding box.
    /// Buffer cells are scored (so edge cells see real neighbors) but never
    /// eligible for placement.
    pub is_buffer: bool,
    /// Running favorability cost, accumulated additively by the layers.
    pub cost: f64,
    pub stats: CellStats,
}

/// A uniform lattice of cells covering a polygon plus its buffer ring, with
/// a (row, col) index for O(1) neighbor lookup during flood fill.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,
    size_m: f64,
    lat_step_deg: f64,
    lng_step_deg: f64,
    index: AHashMap<(i32, i32), usize>,
}

impl Grid {
    pub(crate) fn new(cells: Vec<Cell>, size_m: f64, lat_step_deg: f64, lng_step_deg: f64) -> Self {
        let index = cells.iter().enumerate()
            .map(|(i, cell)| ((cell.row, cell.col), i))
            .collect();
        Self { cells, size_m, lat_step_deg, lng_step_deg, index }
    }

    /// Get the total number of cells, buffer included.
    #[inline] pub fn len(&self) -> usize { self.cells.len() }

    /// Check if the grid has no cells.
    #[inline] pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Get a reference to the cell list.
    #[inline] pub fn cells(&self) -> &[Cell] { &self.cells }

    /// Get a mutable reference to the cell list.
    #[inline] pub fn cells_mut(&mut self) -> &mut [Cell] { &mut self.cells }

    /// Get the cell side length in meters.
    #[inline] pub fn size_m(&self) -> f64 { self.size_m }

    /// Get the lattice step in degrees of latitude.
    #[inline] pub fn lat_step_deg(&self) -> f64 { self.lat_step_deg }

    /// Get the lattice step in degrees of longitude.
    #[inline] pub fn lng_step_deg(&self) -> f64 { self.lng_step_deg }

    /// Look up a cell by its lattice position.
    #[inline]
    pub fn cell_at(&self, row: i32, col: i32) -> Option<&Cell> {
        self.index.get(&(row, col)).map(|&i| &self.cells[i])
    }

    /// Count the placement-eligible cells (inside the polygon, not buffer).
    pub fn in_polygon_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.in_polygon && !cell.is_buffer).count()
    }
}

/// Build a synthetic cell on a 0.001-degree lattice anchored at the origin.
/// Shared by unit tests across modules.
#[cfg(test)]
pub(crate) fn make_cell(row: i32, col: i32, cost: f64) -> Cell {
    let size_deg = 0.001;
    Cell {
        row,
        col,
        center_lat: (row as f64 + 0.5) * size_deg,
        center_lng: (col as f64 + 0.5) * size_deg,
        min_lat: row as f64 * size_deg,
        max_lat: (row + 1) as f64 * size_deg,
        min_lng: col as f64 * size_deg,
        max_lng: (col + 1) as f64 * size_deg,
        size_m: 111.0,
        in_polygon: true,
        is_buffer: false,
        cost,
        stats: CellStats::default(),
    }
}
