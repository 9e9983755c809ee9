use crate::errors::{Result, SpbError};
use linfa::Float;
use ndarray::{Array, Array1, ArrayBase, ArrayView2, Data, Ix2};
use ndarray_rand::{RandomExt, rand::Rng, rand_distr::Standard};

/// Relative tolerance used to check the symmetry of a distance matrix
pub const SYMMETRY_TOL: f64 = 1e-10;

/// Checks the distance matrix contract: non-empty, square, finite, non-negative,
/// symmetric with a null diagonal.
pub(crate) fn check_distance_matrix<F: Float>(dis: &ArrayView2<F>) -> Result<()> {
    let (nrows, ncols) = dis.dim();
    if nrows == 0 {
        return Err(SpbError::InvalidDistanceMatrix(
            "distance matrix is empty".to_string(),
        ));
    }
    if nrows != ncols {
        return Err(SpbError::InvalidDistanceMatrix(format!(
            "distance matrix should be square, got ({nrows}, {ncols})"
        )));
    }
    let tol = F::cast(SYMMETRY_TOL);
    for ((i, j), &d) in dis.indexed_iter() {
        if !d.is_finite() || d < F::zero() {
            return Err(SpbError::InvalidDistanceMatrix(format!(
                "distance at ({i}, {j}) should be finite and non-negative, got {d}"
            )));
        }
        if i == j && d != F::zero() {
            return Err(SpbError::InvalidDistanceMatrix(format!(
                "diagonal should be zero, got {d} at ({i}, {i})"
            )));
        }
        if j > i {
            let dt = dis[[j, i]];
            if (d - dt).abs() > tol * d.max(dt) {
                return Err(SpbError::InvalidDistanceMatrix(format!(
                    "distance matrix should be symmetric, got {d} at ({i}, {j}) and {dt} at ({j}, {i})"
                )));
            }
        }
    }
    Ok(())
}

/// Checks `nsamp` against the population size
pub(crate) fn check_sample_size(nsamp: usize, npop: usize) -> Result<()> {
    if nsamp > npop {
        return Err(SpbError::InvalidValueError(format!(
            "sample size ({nsamp}) should not exceed population size ({npop})"
        )));
    }
    Ok(())
}

/// Maps a uniform draw `u` in [0, 1) to a position in `0..n` by scaling and truncation.
///
/// The result is clamped to `n - 1` so a draw rounded up to 1.0 stays in range.
pub(crate) fn truncated_index(u: f64, n: usize) -> usize {
    ((u * n as f64) as usize).min(n.saturating_sub(1))
}

/// Random permutation of `0..n` obtained by sorting units by `n` uniform keys.
///
/// Units with equal keys keep their index order.
pub(crate) fn random_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let keys: Array1<f64> = Array::random_using(n, Standard, rng);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    order
}

/// Sum of the distances between all pairs of units of a sample
///
/// # Parameters
///
/// * `dis`: (N, N) distance matrix
/// * `indices`: 0-based indices of the sample units
pub fn within_sample_distance<F: Float>(
    dis: &ArrayBase<impl Data<Elem = F>, Ix2>,
    indices: &[usize],
) -> F {
    indices
        .iter()
        .enumerate()
        .flat_map(|(a, &i)| indices[a + 1..].iter().map(move |&j| (i, j)))
        .fold(F::zero(), |acc, (i, j)| acc + dis[[i, j]])
}
