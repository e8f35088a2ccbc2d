//! # Karhunen-Loeve
//!
//! $$
//! C=V\,\mathrm{diag}(\lambda)\,V^\top,\qquad X=V_{:,:K}\left(\sqrt{\lambda_{:K}}\odot\xi\right)
//! $$
//!
//! Nystrom-style discretization of the fBm covariance operator: the grid
//! covariance matrix is diagonalized once and its dominant modes drive the
//! sampled path.
//!
pub mod decomposition;
pub mod sampler;

pub use decomposition::KlDecomposition;
pub use sampler::fbm_kl_truncated;
pub use sampler::fbm_kl_truncated_with_rng;
pub use sampler::RandomState;
