//! # fBM (Karhunen-Loeve)
//!
//! $$
//! B^H_{t_i}\approx\sum_{k<K}\sqrt{\lambda_k}\,\xi_k\,V_{ik},\qquad t_i=\frac{iT}{n}
//! $$
//!
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::error::Result;
use crate::stochastic::covariance::fbm_covariance_grid;
use crate::stochastic::kl::decomposition::KlDecomposition;
use crate::stochastic::kl::sampler::validate_params;
use crate::stochastic::time_grid;
use crate::traits::ProcessExt;

/// Fractional Brownian motion sampled through a truncated KL expansion.
///
/// The grid covariance is diagonalized once in [`FbmKl::new`]; every call to
/// [`sample_with`](ProcessExt::sample_with) only draws `k` fresh normals and
/// recombines the stored modes.
#[derive(Debug, Clone)]
pub struct FbmKl {
  /// Hurst parameter (`0 < H < 1`) controlling roughness and memory.
  pub hurst: f64,
  /// Number of time steps, the grid has `n_steps + 1` points.
  pub n_steps: usize,
  /// Total simulation horizon (defaults to `1` if `None`).
  pub t: Option<f64>,
  /// Number of retained eigenpairs.
  pub k: usize,
  grid: Array1<f64>,
  decomposition: KlDecomposition,
}

impl FbmKl {
  pub fn new(hurst: f64, t: Option<f64>, k: Option<usize>, n_steps: Option<usize>) -> Result<Self> {
    let horizon = t.unwrap_or(crate::stochastic::T);
    let k = k.unwrap_or(crate::stochastic::K);
    let n_steps = n_steps.unwrap_or(crate::stochastic::N_STEPS);
    validate_params(hurst, horizon, k, n_steps)?;

    let grid = time_grid(horizon, n_steps);
    let cov = fbm_covariance_grid(&grid, hurst)?;
    let decomposition = KlDecomposition::new(&cov)?;

    Ok(Self {
      hurst,
      n_steps,
      t,
      k,
      grid,
      decomposition,
    })
  }

  pub fn dt(&self) -> f64 {
    self.t.unwrap_or(crate::stochastic::T) / self.n_steps as f64
  }

  /// Time points the path is sampled on.
  pub fn grid(&self) -> &Array1<f64> {
    &self.grid
  }

  pub fn decomposition(&self) -> &KlDecomposition {
    &self.decomposition
  }

  /// One path from a `StdRng` seeded with `seed`.
  pub fn sample_seeded(&self, seed: u64) -> Array1<f64> {
    self.sample_with(&mut StdRng::seed_from_u64(seed))
  }
}

impl ProcessExt for FbmKl {
  type Output = Array1<f64>;

  fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Output {
    self.decomposition.draw(self.k, rng)
  }
}
