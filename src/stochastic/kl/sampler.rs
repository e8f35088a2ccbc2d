//! # Sampler
//!
//! $$
//! X_{t_i}=\sum_{k<K}\sqrt{\lambda_k}\,\xi_k\,V_{ik},\qquad
//! \operatorname{Cov}(X)=V_{:,:K}\Lambda_K V_{:,:K}^\top\xrightarrow[K\to N]{}C
//! $$
//!
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use rand::RngCore;
use rand::SeedableRng;
use tracing::debug;

use super::decomposition::KlDecomposition;
use crate::error::validate_hurst;
use crate::error::validate_rank;
use crate::error::FbmError;
use crate::error::Result;
use crate::stochastic::covariance::fbm_covariance_grid;
use crate::stochastic::time_grid;

/// Source of the standard normal variates driving a KL sample.
#[derive(Default)]
pub enum RandomState<'a> {
  /// Fresh generator seeded from the operating system.
  #[default]
  Entropy,
  /// Deterministic `StdRng` seeded with the given value.
  Seed(u64),
  /// Caller-owned generator, advanced in place.
  Rng(&'a mut dyn RngCore),
}

impl From<u64> for RandomState<'_> {
  fn from(seed: u64) -> Self {
    RandomState::Seed(seed)
  }
}

impl From<Option<u64>> for RandomState<'_> {
  fn from(seed: Option<u64>) -> Self {
    seed.map_or(RandomState::Entropy, RandomState::Seed)
  }
}

impl<'a, R: RngCore + 'a> From<&'a mut R> for RandomState<'a> {
  fn from(rng: &'a mut R) -> Self {
    RandomState::Rng(rng)
  }
}

/// Check the sampler parameters and return the grid size `N = n_steps + 1`.
pub(crate) fn validate_params(hurst: f64, t: f64, k: usize, n_steps: usize) -> Result<usize> {
  validate_hurst(hurst)?;
  if n_steps < 1 {
    return Err(FbmError::invalid("n_steps must be at least 1"));
  }
  if t.is_nan() || t <= 0.0 {
    return Err(FbmError::invalid(format!("T must be positive, got T={t}")));
  }
  let n = n_steps + 1;
  validate_rank(k, n)?;
  Ok(n)
}

/// Simulate fBm on `[0, t]` with a truncated Karhunen-Loeve expansion.
///
/// `t`, `k` and `n_steps` fall back to [`T`](crate::stochastic::T),
/// [`K`](crate::stochastic::K) and [`N_STEPS`](crate::stochastic::N_STEPS).
/// Returns the grid `0, t/n_steps, ..., t` together with one path sampled on it.
///
/// # Errors
///
/// [`FbmError::InvalidInput`] if `hurst` is outside `(0, 1)`, `n_steps < 1`,
/// `t <= 0` or `k` is outside `[1, n_steps + 1]`.
pub fn fbm_kl_truncated<'a>(
  hurst: f64,
  t: Option<f64>,
  k: Option<usize>,
  n_steps: Option<usize>,
  random_state: impl Into<RandomState<'a>>,
) -> Result<(Array1<f64>, Array1<f64>)> {
  match random_state.into() {
    RandomState::Entropy => {
      fbm_kl_truncated_with_rng(hurst, t, k, n_steps, &mut StdRng::from_os_rng())
    }
    RandomState::Seed(seed) => {
      fbm_kl_truncated_with_rng(hurst, t, k, n_steps, &mut StdRng::seed_from_u64(seed))
    }
    RandomState::Rng(rng) => fbm_kl_truncated_with_rng(hurst, t, k, n_steps, rng),
  }
}

/// Same as [`fbm_kl_truncated`] with an explicit generator; exactly `k` standard
/// normals are drawn from `rng`.
pub fn fbm_kl_truncated_with_rng<R: Rng + ?Sized>(
  hurst: f64,
  t: Option<f64>,
  k: Option<usize>,
  n_steps: Option<usize>,
  rng: &mut R,
) -> Result<(Array1<f64>, Array1<f64>)> {
  let t = t.unwrap_or(crate::stochastic::T);
  let k = k.unwrap_or(crate::stochastic::K);
  let n_steps = n_steps.unwrap_or(crate::stochastic::N_STEPS);
  let n = validate_params(hurst, t, k, n_steps)?;

  let grid = time_grid(t, n_steps);
  let cov = fbm_covariance_grid(&grid, hurst)?;
  let decomposition = KlDecomposition::new(&cov)?;
  let path = decomposition.draw(k, rng);
  let explained = decomposition.explained_variance(k)?;

  debug!(k, n, explained, "sampled truncated KL path");
  Ok((grid, path))
}
