/// Mean Earth radius in kilometers.
pub(crate) const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers spanned by one degree of latitude.
const KM_PER_DEG_LAT: f64 = 111.0;

/// Great-circle distance in kilometers between two (lat, lng) points,
/// via the haversine formula.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();

    let a = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Degrees of latitude spanned by `km` kilometers.
#[inline]
pub(crate) fn km_to_lat_deg(km: f64) -> f64 {
    km / KM_PER_DEG_LAT
}

/// Degrees of longitude spanned by `km` kilometers at latitude `at_lat`.
#[inline]
pub(crate) fn km_to_lng_deg(km: f64, at_lat: f64) -> f64 {
    km / (KM_PER_DEG_LAT * at_lat.to_radians().cos())
}
