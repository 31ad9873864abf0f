use crate::distributions::Gumbel;
use crate::error::Result;

/// Estimator of the distribution of the loudest candidate.
///
/// Implementations are immutable once built; [`fit`](Self::fit) always
/// returns the same answer.
pub trait GumbelEstimator: Send + Sync {
    /// Gumbel law of the maximum the estimator was built for.
    fn fit(&self) -> Result<Gumbel>;

    /// Law of the maximum over `n` independent copies of the fitted maximum.
    fn propagate_max(&self, n: u64) -> Result<Gumbel> {
        self.fit()?.max_of(n)
    }
}
