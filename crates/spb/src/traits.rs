use crate::errors::Result;
use crate::table::SampleTable;
use linfa::Float;
use ndarray::{ArrayBase, Data, Ix2};

/// Spatially balanced sampling design drawing samples of a finite population
/// described by its pairwise distance matrix.
///
/// Units close to each other are unlikely to be drawn in the same sample.
pub trait SpatialSampling {
    /// Number of units drawn in each sample
    fn sample_size(&self) -> usize;

    /// Number of samples drawn by [SpatialSampling::sample]
    fn n_replications(&self) -> usize;

    /// Draws `n_replications` independent samples of `sample_size` units
    ///
    /// # Parameters
    ///
    /// * `dis`: a (N, N) distance matrix, symmetric, non-negative with a zero diagonal
    ///
    /// # Returns
    ///
    /// * A [SampleTable] of `sample_size * n_replications` rows (replication id, unit id)
    ///
    /// # Errors
    ///
    /// Parameters and distance matrix are validated before any random draw.
    /// Numerical degeneracies met while drawing fail the whole call.
    fn sample<F: Float>(&self, dis: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<SampleTable>;
}
