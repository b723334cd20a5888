//! Cost layers: each takes the cell lattice plus one external dataset and
//! adds a signed contribution to every cell's running cost through a
//! radial-decay kernel. Layers mutate buffer cells too, so edge effects
//! propagate symmetrically; placement eligibility is decided later.
//!
//! An empty dataset makes the corresponding layer a no-op.

mod adoption;
mod density;
mod stations;
mod substations;

pub(crate) use adoption::apply as apply_adoption;
pub(crate) use density::apply as apply_density;
pub(crate) use stations::apply as apply_stations;
pub(crate) use substations::apply as apply_substations;

/// Quadratic radial decay: 1 at the source, 0 at `radius_km` and beyond.
#[inline]
fn quadratic_decay(d_km: f64, radius_km: f64) -> f64 {
    (1.0 - (d_km / radius_km).powi(2)).max(0.0)
}

/// Linear radial decay: 1 at the source, 0 at `radius_km` and beyond.
#[inline]
fn linear_decay(d_km: f64, radius_km: f64) -> f64 {
    (1.0 - d_km / radius_km).max(0.0)
}
