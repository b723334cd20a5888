mod dist;
mod index;
mod polygon;

pub use dist::haversine_km;
pub(crate) use dist::{km_to_lat_deg, km_to_lng_deg};
pub(crate) use index::PointIndex;
pub use polygon::{point_in_polygon, polygon_area_km2};
