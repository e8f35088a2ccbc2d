//! # Error
//!
//! $$
//! \text{validate}:(H,T,K,n)\mapsto\text{Ok}\ \vert\ \text{InvalidInput}
//! $$
//!
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FbmError {
  /// A parameter or input array violated its documented constraint.
  #[error("invalid input: {0}")]
  InvalidInput(String),
  /// The symmetric eigensolver could not decompose the covariance matrix.
  #[error("eigendecomposition failed: {0}")]
  Decomposition(String),
}

pub type Result<T> = std::result::Result<T, FbmError>;

impl FbmError {
  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    FbmError::InvalidInput(msg.into())
  }
}

/// Hurst exponent must lie in the open interval `(0, 1)`; NaN is rejected.
pub(crate) fn validate_hurst(hurst: f64) -> Result<()> {
  if hurst > 0.0 && hurst < 1.0 {
    Ok(())
  } else {
    Err(FbmError::invalid(format!("H must be in (0, 1), got H={hurst}")))
  }
}

/// Truncation rank must satisfy `1 <= k <= n`.
pub(crate) fn validate_rank(k: usize, n: usize) -> Result<()> {
  if (1..=n).contains(&k) {
    Ok(())
  } else {
    Err(FbmError::invalid(format!("K must be in [1, {n}], got K={k}")))
  }
}
