//! # Covariance
//!
//! $$
//! R_H(s,t)=\tfrac12\left(|s|^{2H}+|t|^{2H}-|t-s|^{2H}\right)
//! $$
//!
use ndarray::Array2;
use ndarray::ArrayBase;
use ndarray::Data;
use ndarray::Dimension;
use tracing::debug;

use crate::error::validate_hurst;
use crate::error::FbmError;
use crate::error::Result;

/// Covariance kernel of fBm, `Cov(B^H_s, B^H_t)`.
///
/// Only absolute values are raised to `2H`, so negative times never hit a
/// negative-base fractional power.
#[inline]
pub fn fbm_covariance(s: f64, t: f64, hurst: f64) -> f64 {
  let two_h = 2.0 * hurst;
  0.5 * (s.abs().powf(two_h) + t.abs().powf(two_h) - (t - s).abs().powf(two_h))
}

/// Covariance matrix `C_ij = R_H(t_i, t_j)` of fBm sampled at the points of `t`.
///
/// `t` may have any dimensionality at the type level but must be 1-D at runtime.
/// Ordering and sign of the grid are not checked: the kernel is defined for any
/// real times, and an increasing grid starting at `0` is merely the usual case.
///
/// # Errors
///
/// [`FbmError::InvalidInput`] when `t` is not one-dimensional or `hurst` is not
/// in `(0, 1)`.
pub fn fbm_covariance_grid<S, D>(t: &ArrayBase<S, D>, hurst: f64) -> Result<Array2<f64>>
where
  S: Data<Elem = f64>,
  D: Dimension,
{
  if t.ndim() != 1 {
    return Err(FbmError::invalid(format!(
      "t must be a 1D array of time points, got {} dimensions",
      t.ndim()
    )));
  }
  validate_hurst(hurst)?;

  let two_h = 2.0 * hurst;
  let times: Vec<f64> = t.iter().copied().collect();
  let powered: Vec<f64> = times.iter().map(|x| x.abs().powf(two_h)).collect();
  let n = times.len();

  let mut cov = Array2::<f64>::zeros((n, n));
  for i in 0..n {
    for j in i..n {
      let c = 0.5 * (powered[i] + powered[j] - (times[i] - times[j]).abs().powf(two_h));
      cov[[i, j]] = c;
      cov[[j, i]] = c;
    }
  }

  debug!(n, hurst, "built fBm covariance matrix");
  Ok(cov)
}
