#![doc = "Sitegrid public API"]
mod analysis;
mod geom;
mod grid;
mod layers;
mod select;
mod types;

#[doc(inline)]
pub use analysis::{
    AnalysisRequest, PointResponse, RegionResponse, DEFAULT_MIN_DISTANCE_KM, MAX_LOCATIONS,
    build_scored_grid, find_optimal_points, find_optimal_regions, region_boundaries,
};

#[doc(inline)]
pub use geom::{haversine_km, point_in_polygon, polygon_area_km2};

#[doc(inline)]
pub use grid::generate_grid;

#[doc(inline)]
pub use select::{Bounds, CostRank, PlacedStation, RegionCell, SubLocation, trace_boundary};

#[doc(inline)]
pub use types::{AdoptionZone, Cell, CellStats, DensityZone, Grid, Station, Substation};
