//! # Stochastic
//!
//! $$
//! t_i=\frac{iT}{n},\quad i=0,\dots,n
//! $$
//!
//! | Module           | Description                                                              |
//! |------------------|--------------------------------------------------------------------------|
//! | [`covariance`]   | Exact fBm covariance kernel and its grid matrix.                         |
//! | [`kl`]           | Sorted/clipped eigendecomposition and truncated Karhunen-Loeve sampling. |
//! | [`process`]      | Reusable process objects built on top of [`kl`].                         |
//!
pub mod covariance;
pub mod kl;
pub mod process;

use ndarray::Array1;

/// Default time horizon
pub const T: f64 = 1.0;
/// Default number of retained Karhunen-Loeve terms
pub const K: usize = 20;
/// Default number of time steps
pub const N_STEPS: usize = 200;

/// Equidistant grid `0, t/n_steps, ..., t` with `n_steps + 1` points.
///
/// The last point is set to `t` exactly so the horizon is never off by rounding.
pub fn time_grid(t: f64, n_steps: usize) -> Array1<f64> {
  if n_steps == 0 {
    return Array1::from_elem(1, 0.0);
  }

  let dt = t / n_steps as f64;
  Array1::from_shape_fn(n_steps + 1, |i| if i == n_steps { t } else { i as f64 * dt })
}
