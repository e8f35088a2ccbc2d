//! # Decomposition
//!
//! $$
//! \lambda_0\ge\lambda_1\ge\dots\ge\lambda_{N-1}\ge0,\qquad
//! \|C-V_{:,:K}\Lambda_K V_{:,:K}^\top\|_F^2=\sum_{k\ge K}\lambda_k^2
//! $$
//!
use nalgebra::DMatrix;
use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayBase;
use ndarray::Data;
use ndarray::Ix1;
use ndarray::Ix2;
use rand::Rng;
use rand_distr::Distribution;
use rand_distr::StandardNormal;
use tracing::debug;
use tracing::warn;

use crate::error::validate_rank;
use crate::error::FbmError;
use crate::error::Result;

/// Implicit QR sweeps allowed per matrix dimension before giving up.
const MAX_SWEEPS_PER_DIM: usize = 64;
/// Clipped eigenvalues below `-NEGATIVE_TOL * lambda_max` are reported.
const NEGATIVE_TOL: f64 = 1e-8;

/// Eigenpairs of a symmetric covariance matrix, ordered by decreasing
/// eigenvalue and clipped to be non-negative.
///
/// Columns of [`eigenvectors`](Self::eigenvectors) are orthonormal and the
/// `k`-th column belongs to the `k`-th entry of [`eigenvalues`](Self::eigenvalues).
#[derive(Debug, Clone)]
pub struct KlDecomposition {
  eigenvalues: Array1<f64>,
  eigenvectors: Array2<f64>,
}

impl KlDecomposition {
  /// Diagonalize `cov`.
  ///
  /// Eigenpairs are sorted on the raw eigenvalues first and clipped afterwards,
  /// so tiny negative values produced by the solver never reorder the positive
  /// modes.
  pub fn new<S>(cov: &ArrayBase<S, Ix2>) -> Result<Self>
  where
    S: Data<Elem = f64>,
  {
    let (rows, cols) = cov.dim();
    if rows != cols {
      return Err(FbmError::invalid(format!(
        "covariance matrix must be square, got {rows}x{cols}"
      )));
    }
    if rows == 0 {
      return Err(FbmError::invalid("covariance matrix must be non-empty"));
    }
    if cov.iter().any(|x| !x.is_finite()) {
      return Err(FbmError::Decomposition(
        "covariance matrix contains non-finite entries".into(),
      ));
    }

    let n = rows;
    let matrix = DMatrix::from_fn(n, n, |i, j| cov[[i, j]]);
    let eigen = matrix
      .try_symmetric_eigen(f64::EPSILON, MAX_SWEEPS_PER_DIM * n)
      .ok_or_else(|| {
        FbmError::Decomposition(format!(
          "symmetric eigensolver did not converge for a {n}x{n} matrix"
        ))
      })?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let raw = Array1::from_iter(order.iter().map(|&i| eigen.eigenvalues[i]));
    let eigenvectors =
      Array2::from_shape_fn((n, n), |(row, col)| eigen.eigenvectors[(row, order[col])]);

    let lambda_max = raw[0];
    let lambda_min = raw[n - 1];
    let clipped = raw.iter().filter(|&&w| w < 0.0).count();
    if lambda_min < -NEGATIVE_TOL * lambda_max.abs().max(f64::MIN_POSITIVE) {
      warn!(
        n,
        lambda_min,
        lambda_max,
        "covariance matrix is noticeably indefinite, clipping negative modes"
      );
    }
    let eigenvalues = raw.mapv(|w| w.max(0.0));

    debug!(n, clipped, lambda_min, "decomposed covariance matrix");
    Ok(Self {
      eigenvalues,
      eigenvectors,
    })
  }

  /// Clipped eigenvalues in decreasing order.
  pub fn eigenvalues(&self) -> &Array1<f64> {
    &self.eigenvalues
  }

  /// Orthonormal eigenvectors stored column-wise.
  pub fn eigenvectors(&self) -> &Array2<f64> {
    &self.eigenvectors
  }

  /// Grid size `N`.
  pub fn len(&self) -> usize {
    self.eigenvalues.len()
  }

  pub fn is_empty(&self) -> bool {
    self.eigenvalues.is_empty()
  }

  /// Rank-`k` reconstruction `V[:, :k] diag(w[:k]) V[:, :k]^T`.
  pub fn truncated_covariance(&self, k: usize) -> Result<Array2<f64>> {
    validate_rank(k, self.len())?;
    let v = self.eigenvectors.slice(s![.., ..k]);
    let scaled = &v * &self.eigenvalues.slice(s![..k]);
    Ok(scaled.dot(&v.t()))
  }

  /// Frobenius norm of `cov - truncated_covariance(k)`.
  pub fn approximation_error<S>(&self, cov: &ArrayBase<S, Ix2>, k: usize) -> Result<f64>
  where
    S: Data<Elem = f64>,
  {
    let n = self.len();
    if cov.dim() != (n, n) {
      return Err(FbmError::invalid(format!(
        "covariance matrix must be {n}x{n}, got {}x{}",
        cov.nrows(),
        cov.ncols()
      )));
    }
    let residual = cov - &self.truncated_covariance(k)?;
    Ok(residual.iter().map(|x| x * x).sum::<f64>().sqrt())
  }

  /// Share of the total variance (trace) carried by the leading `k` modes.
  pub fn explained_variance(&self, k: usize) -> Result<f64> {
    validate_rank(k, self.len())?;
    let total = self.eigenvalues.sum();
    if total <= 0.0 {
      return Ok(1.0);
    }
    Ok(self.eigenvalues.slice(s![..k]).sum() / total)
  }

  /// Path driven by caller-supplied standard normals `z` (one per retained mode).
  pub fn combine<S>(&self, k: usize, z: &ArrayBase<S, Ix1>) -> Result<Array1<f64>>
  where
    S: Data<Elem = f64>,
  {
    validate_rank(k, self.len())?;
    if z.len() != k {
      return Err(FbmError::invalid(format!(
        "expected {k} normal variates, got {}",
        z.len()
      )));
    }
    Ok(self.project(k, z))
  }

  /// Draw `k` standard normals from `rng` and build the truncated path.
  pub fn sample_with<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Array1<f64>> {
    validate_rank(k, self.len())?;
    Ok(self.draw(k, rng))
  }

  /// `k` must already be validated against `len()`.
  pub(crate) fn draw<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Array1<f64> {
    let z = Array1::from_shape_fn(k, |_| -> f64 { StandardNormal.sample(&mut *rng) });
    self.project(k, &z)
  }

  fn project<S>(&self, k: usize, z: &ArrayBase<S, Ix1>) -> Array1<f64>
  where
    S: Data<Elem = f64>,
  {
    let coeffs = self.eigenvalues.slice(s![..k]).mapv(f64::sqrt) * z;
    self.eigenvectors.slice(s![.., ..k]).dot(&coeffs)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;
  use ndarray::Array1;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use tracing_test::traced_test;

  use super::*;
  use crate::stochastic::covariance::fbm_covariance_grid;
  use crate::stochastic::time_grid;

  fn fbm_decomposition(h: f64, n_steps: usize) -> (Array2<f64>, KlDecomposition) {
    let t = time_grid(1.0, n_steps);
    let cov = fbm_covariance_grid(&t, h).unwrap();
    let dec = KlDecomposition::new(&cov).unwrap();
    (cov, dec)
  }

  #[test]
  fn eigenvalues_descend_and_are_non_negative() {
    let (_, dec) = fbm_decomposition(0.3, 40);
    let w = dec.eigenvalues();
    assert_eq!(w.len(), 41);
    assert!(w.iter().all(|&x| x >= 0.0));
    assert!(w.windows(2).into_iter().all(|p| p[0] >= p[1]));
  }

  #[test]
  fn eigenvectors_are_orthonormal() {
    let (_, dec) = fbm_decomposition(0.7, 25);
    let v = dec.eigenvectors();
    let gram = v.t().dot(v);
    for i in 0..gram.nrows() {
      for j in 0..gram.ncols() {
        let expected = if i == j { 1.0 } else { 0.0 };
        assert_abs_diff_eq!(gram[[i, j]], expected, epsilon = 1e-10);
      }
    }
  }

  #[test]
  fn sort_happens_before_clip() {
    // eigenvalues 3, 1, -0.5 on a rotated basis
    let q = array![[0.6, 0.8, 0.0], [-0.8, 0.6, 0.0], [0.0, 0.0, 1.0]];
    let d = Array2::from_diag(&array![1.0, -0.5, 3.0]);
    let cov = q.dot(&d).dot(&q.t());
    let dec = KlDecomposition::new(&cov).unwrap();

    assert_abs_diff_eq!(dec.eigenvalues()[0], 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dec.eigenvalues()[1], 1.0, epsilon = 1e-12);
    assert_eq!(dec.eigenvalues()[2], 0.0);
    assert_abs_diff_eq!(dec.eigenvectors()[[2, 0]].abs(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dec.eigenvectors()[[0, 1]].abs(), 0.6, epsilon = 1e-12);
  }

  #[test]
  fn approximation_error_is_monotone_and_vanishes_at_full_rank() {
    let (cov, dec) = fbm_decomposition(0.65, 30);
    let n = dec.len();
    let mut prev = f64::INFINITY;
    for k in 1..=n {
      let err = dec.approximation_error(&cov, k).unwrap();
      assert!(err <= prev + 1e-12, "error increased at K={k}: {err} > {prev}");
      prev = err;
    }
    assert_abs_diff_eq!(prev, 0.0, epsilon = 1e-10);
  }

  #[test]
  fn truncation_error_matches_dropped_spectrum() {
    let (cov, dec) = fbm_decomposition(0.4, 20);
    let k = 5;
    let dropped = dec.eigenvalues().slice(s![k..]).mapv(|w| w * w).sum().sqrt();
    let err = dec.approximation_error(&cov, k).unwrap();
    assert_abs_diff_eq!(err, dropped, epsilon = 1e-10);
  }

  #[test]
  fn explained_variance_grows_to_one() {
    let (_, dec) = fbm_decomposition(0.8, 50);
    let first = dec.explained_variance(1).unwrap();
    let ten = dec.explained_variance(10).unwrap();
    let all = dec.explained_variance(dec.len()).unwrap();
    assert!(first > 0.5, "leading mode should dominate a smooth fBm: {first}");
    assert!(ten >= first);
    assert_abs_diff_eq!(all, 1.0, epsilon = 1e-12);
  }

  #[test]
  fn combine_matches_sample_with_same_stream() {
    let (_, dec) = fbm_decomposition(0.55, 12);
    let k = 6;
    let mut rng = StdRng::seed_from_u64(11);
    let z = Array1::from_shape_fn(k, |_| -> f64 { StandardNormal.sample(&mut rng) });
    let expected = dec.combine(k, &z).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let path = dec.sample_with(k, &mut rng).unwrap();
    assert_eq!(path, expected);
  }

  #[test]
  fn combine_with_unit_normal_picks_scaled_mode() {
    let (_, dec) = fbm_decomposition(0.5, 8);
    let path = dec.combine(2, &array![0.0, 1.0]).unwrap();
    let mode = dec.eigenvectors().column(1).mapv(|x| x * dec.eigenvalues()[1].sqrt());
    for (a, b) in path.iter().zip(mode.iter()) {
      assert_abs_diff_eq!(a, b, epsilon = 1e-14);
    }
  }

  #[test]
  fn rank_and_shape_are_validated() {
    let (cov, dec) = fbm_decomposition(0.5, 4);
    assert!(dec.truncated_covariance(0).is_err());
    assert!(dec.truncated_covariance(6).is_err());
    assert!(dec.combine(2, &array![1.0]).is_err());
    let mut rng = StdRng::seed_from_u64(0);
    assert!(dec.sample_with(0, &mut rng).is_err());
    let err = dec.approximation_error(&cov.slice(s![..4, ..4]), 2).unwrap_err();
    assert!(matches!(err, FbmError::InvalidInput(_)));
  }

  #[test]
  fn rejects_non_square_and_non_finite_input() {
    let err = KlDecomposition::new(&Array2::<f64>::zeros((2, 3))).unwrap_err();
    assert!(matches!(err, FbmError::InvalidInput(_)));
    let err = KlDecomposition::new(&Array2::<f64>::zeros((0, 0))).unwrap_err();
    assert!(matches!(err, FbmError::InvalidInput(_)));
    let err = KlDecomposition::new(&array![[1.0, f64::NAN], [f64::NAN, 1.0]]).unwrap_err();
    assert!(matches!(err, FbmError::Decomposition(_)));
  }

  #[test]
  #[traced_test]
  fn warns_on_indefinite_matrix() {
    let cov = array![[1.0, 2.0], [2.0, 1.0]];
    let dec = KlDecomposition::new(&cov).unwrap();
    assert_abs_diff_eq!(dec.eigenvalues()[0], 3.0, epsilon = 1e-12);
    assert_eq!(dec.eigenvalues()[1], 0.0);
    assert!(logs_contain("noticeably indefinite"));
    assert!(logs_contain("clipped=1"));
  }
}
