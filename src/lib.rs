//! # fbm-kl
//!
//! $$
//! B^H_{t_i}\approx\sum_{k=0}^{K-1}\sqrt{\lambda_k}\,\xi_k\,v_k(t_i),\qquad \xi_k\sim\mathcal N(0,1)
//! $$
//!
//! Fractional Brownian motion on a finite grid, simulated through a truncated
//! Karhunen-Loeve expansion of the exact covariance matrix.
//!
//! | Module         | Description                                                        |
//! |----------------|--------------------------------------------------------------------|
//! | [`stochastic`] | Covariance construction, spectral decomposition and path sampling. |
//! | [`traits`]     | Sampling contract shared by the processes.                         |
//! | [`error`]      | Error type returned by every fallible operation.                   |
//!
//! ## Example Usage
//!
//! ```rust
//! use fbm_kl::fbm_kl_truncated;
//! use fbm_kl::RandomState;
//!
//! let (t, path) = fbm_kl_truncated(0.7, Some(1.0), Some(10), Some(50), RandomState::Seed(42))?;
//! assert_eq!(t.len(), path.len());
//! ```

pub mod error;
pub mod stochastic;
pub mod traits;

pub use error::FbmError;
pub use error::Result;
pub use stochastic::covariance::fbm_covariance;
pub use stochastic::covariance::fbm_covariance_grid;
pub use stochastic::kl::decomposition::KlDecomposition;
pub use stochastic::kl::sampler::fbm_kl_truncated;
pub use stochastic::kl::sampler::fbm_kl_truncated_with_rng;
pub use stochastic::kl::sampler::RandomState;
pub use stochastic::process::fbm_kl::FbmKl;
pub use stochastic::time_grid;
pub use traits::ProcessExt;
