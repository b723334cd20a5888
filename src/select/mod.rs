mod boundary;
mod greedy;
mod ranks;

pub use boundary::trace_boundary;
pub use greedy::PlacedStation;
pub(crate) use greedy::select_points;
pub use ranks::{Bounds, CostRank, RegionCell, SubLocation};
pub(crate) use ranks::select_ranks;
