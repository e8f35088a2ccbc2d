//! # Traits
//!
//! $$
//! \text{ProcessExt}:(\text{process},\ \text{rng})\mapsto\text{sample path}
//! $$
//!
use rand::Rng;

pub trait ProcessExt: Send + Sync {
  type Output: Send;

  /// Draw one realization, consuming randomness from `rng`.
  fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Output;

  /// Draw one realization from the thread-local generator.
  fn sample(&self) -> Self::Output {
    self.sample_with(&mut rand::rng())
  }
}
