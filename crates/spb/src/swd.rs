use std::sync::{Arc, RwLock};

use crate::errors::{Result, SpbError};
use crate::parameters::{SwdParams, SwdValidParams};
use crate::table::SampleTable;
use crate::traits::SpatialSampling;
use crate::utils::{check_distance_matrix, check_sample_size, random_permutation, truncated_index};
use linfa::{Float, ParamGuard};
use log::{debug, info, warn};
use ndarray::{Array, Array1, ArrayBase, ArrayView2, Data, Ix2};
use ndarray_rand::{
    RandomExt,
    rand::{Rng, SeedableRng},
    rand_distr::Standard,
};
use rand_xoshiro::Xoshiro256Plus;

type RngRef<R> = Arc<RwLock<R>>;

/// The Sum Within Distance design (swd) draws samples with a probability
/// increasing with the sum of the distances between sample units.
///
/// A sample starts as the head of a random permutation of the population, the tail
/// being the pool of candidates. Each sweep proposes as many swaps as there are units,
/// between a random sample position and a random pool position. A swap is accepted
/// with probability `min(1, (totb/totc)^bexp)` where `totc` is the sum of distances of the
/// leaving unit to the sample and `totb` the one of the entering unit to the sample
/// without the leaving unit. The higher `bexp` is, the more spread the samples.
///
/// Random draws consumption: N permutation keys per replication, then for each sweep
/// a block of 3N uniform values (N sample positions, N pool positions, N acceptance
/// thresholds). Sweeps are skipped, and draw nothing, when the sample holds a single
/// unit or the whole population.
#[derive(Clone, Debug)]
pub struct Swd<R: Rng> {
    /// Sampling parameters (checked when sampling)
    params: SwdParams,
    /// Random generator used for reproducibility
    rng: RngRef<R>,
}

/// Swd with default random generator
impl Swd<Xoshiro256Plus> {
    /// Constructor given the sample size, the random generator is seeded from entropy
    ///
    /// ```
    /// use spbsampling::{SpatialSampling, Swd};
    /// use ndarray::arr2;
    ///
    /// let dis = arr2(&[[0., 1., 2.], [1., 0., 1.], [2., 1., 0.]]);
    /// let table = Swd::new(2).n_iterations(5).bexp(2.).sample(&dis).unwrap();
    /// assert_eq!(table.nrows(), 2);
    /// ```
    pub fn new(nsamp: usize) -> Self {
        Self::new_with_rng(nsamp, Xoshiro256Plus::from_entropy())
    }
}

impl<R: Rng> Swd<R> {
    /// Constructor given the sample size and a random generator
    pub fn new_with_rng(nsamp: usize, rng: R) -> Self {
        Self::from_params(SwdParams::new(nsamp), rng)
    }

    /// Constructor given a set of parameters and a random generator
    pub fn from_params(params: impl Into<SwdParams>, rng: R) -> Self {
        Swd {
            params: params.into(),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Sets the number of samples drawn
    pub fn n_replications(mut self, nrepl: usize) -> Self {
        self.params = self.params.nrepl(nrepl);
        self
    }

    /// Sets the number of swap sweeps
    pub fn n_iterations(mut self, niter: usize) -> Self {
        self.params = self.params.niter(niter);
        self
    }

    /// Sets the acceptance exponent
    pub fn bexp(mut self, bexp: f64) -> Self {
        self.params = self.params.bexp(bexp);
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Swd<R2> {
        Swd {
            params: self.params,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Parameters of the design
    pub fn params(&self) -> &SwdParams {
        &self.params
    }
}

impl<R: Rng> SpatialSampling for Swd<R> {
    fn sample_size(&self) -> usize {
        self.params.0.nsamp
    }

    fn n_replications(&self) -> usize {
        self.params.0.nrepl
    }

    fn sample<F: Float>(&self, dis: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<SampleTable> {
        let params = self.params.check_ref()?;
        let dis = dis.view();
        check_distance_matrix(&dis)?;
        check_sample_size(params.nsamp, dis.nrows())?;

        info!(
            "Swd: draw {} samples of {} units among {} ({} sweeps, bexp = {})",
            params.nrepl,
            params.nsamp,
            dis.nrows(),
            params.niter,
            params.bexp
        );
        if params.niter > 0 {
            if params.nsamp == dis.nrows() {
                warn!("Swd: sample size equals population size, swap sweeps are skipped");
            } else if params.nsamp == 1 {
                warn!("Swd: single unit samples have no within distance, sweeps are skipped");
            }
        }
        let mut rng = self.rng.write().map_err(|_| SpbError::RngLockError)?;
        SampleTable::from_replications(params.nsamp, params.nrepl, |r| {
            debug!("Swd replication {}/{}", r + 1, params.nrepl);
            draw_sample(params, &dis, r, &mut *rng)
        })
    }
}

/// Draws the `replication`-th sample, returns 0-based unit indices by sample position
fn draw_sample<F: Float, R: Rng + ?Sized>(
    params: &SwdValidParams,
    dis: &ArrayView2<F>,
    replication: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let npop = dis.nrows();
    let nsamp = params.nsamp;
    let npool = npop - nsamp;
    let bexp = F::cast(params.bexp);

    let mut order = random_permutation(npop, &mut *rng);
    // a single unit sample has no within distance to improve
    if npool > 0 && nsamp > 1 {
        for iter in 0..params.niter {
            let draws: Array1<f64> = Array::random_using(3 * npop, Standard, &mut *rng);
            let mut n_swaps = 0;
            for z in 0..npop {
                let w = truncated_index(draws[z], nsamp);
                let k = nsamp + truncated_index(draws[npop + z], npool);
                let ratio = swap_ratio(dis, &order, nsamp, w, k).ok_or(
                    SpbError::DegenerateDistanceSum {
                        replication: replication + 1,
                        unit: order[w] + 1,
                    },
                )?;
                if F::cast(draws[2 * npop + z]) < ratio.powf(bexp) {
                    order.swap(w, k);
                    n_swaps += 1;
                }
            }
            debug!(
                "Swd replication {} sweep {}: {n_swaps}/{npop} swaps accepted",
                replication + 1,
                iter + 1
            );
        }
    }
    order.truncate(nsamp);
    Ok(order)
}

/// Ratio `totb/totc` of a swap between sample position `w` and pool position `k`
/// of the `order` permutation whose `nsamp` first units are the current sample.
///
/// `totc` sums the distances of the unit at `w` to the sample units, `totb` the ones
/// of the unit at `k` to the sample units but the one at `w`.
/// Returns `None` when `totc` is zero.
pub(crate) fn swap_ratio<F: Float>(
    dis: &ArrayView2<F>,
    order: &[usize],
    nsamp: usize,
    w: usize,
    k: usize,
) -> Option<F> {
    let (out_unit, in_unit) = (order[w], order[k]);
    let sample = &order[..nsamp];
    let totc = sample
        .iter()
        .fold(F::zero(), |acc, &i| acc + dis[[out_unit, i]]);
    if totc <= F::zero() {
        return None;
    }
    let totb = sample
        .iter()
        .fold(F::zero(), |acc, &i| acc + dis[[in_unit, i]])
        - dis[[in_unit, out_unit]];
    Some(totb / totc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{line_distances, ScriptedRng};
    use crate::utils::within_sample_distance;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};
    use std::collections::{HashMap, HashSet};

    const LINE_KEYS: [f64; 4] = [0.7, 0.2, 0.9, 0.4];
    const LINE_SWEEP: [f64; 12] = [
        0.1, 0.6, 0.3, 0.8, // sample positions
        0.2, 0.7, 0.9, 0.4, // pool positions
        0.5, 0.9, 0.1, 0.99, // acceptance thresholds
    ];

    #[test]
    fn test_swd_line_fixture() {
        // keys order units as [2, 4, 1, 3], the sweep accepts 2<->1 (ratio 3/2),
        // rejects 4<->3 (ratio 2/3 < 0.9) then accepts 1<->3 (1/3) and 4<->2 (1)
        let dis = line_distances(4);
        let values = [&LINE_KEYS[..], &LINE_SWEEP[..]].concat();
        let swd = Swd::new_with_rng(2, ScriptedRng::new(&values))
            .n_iterations(1)
            .bexp(1.);
        let table = swd.sample(&dis).unwrap();
        let expected: Array2<usize> = array![[1, 3], [1, 2]];
        assert_eq!(table.as_array(), &expected);
        assert_eq!(swd.rng.read().unwrap().consumed(), 16);
    }

    #[test]
    fn test_swd_no_iteration() {
        let dis = line_distances(4);
        let table = Swd::new_with_rng(2, ScriptedRng::new(&LINE_KEYS))
            .n_iterations(0)
            .sample(&dis)
            .unwrap();
        let expected: Array2<usize> = array![[1, 2], [1, 4]];
        assert_eq!(table.into_array(), expected);
    }

    #[test]
    fn test_swd_full_population() {
        // only permutation keys are consumed
        let dis = line_distances(4);
        let swd = Swd::new_with_rng(4, ScriptedRng::new(&LINE_KEYS)).n_iterations(3);
        let table = swd.sample(&dis).unwrap();
        assert_eq!(table.indices(0), vec![1, 3, 0, 2]);
        assert_eq!(swd.rng.read().unwrap().consumed(), 4);
    }

    #[test]
    fn test_swd_single_unit_sample() {
        // only permutation keys are consumed, the sample is the head of the permutation
        let dis = line_distances(4);
        let swd = Swd::new_with_rng(1, ScriptedRng::new(&LINE_KEYS)).n_iterations(2);
        let table = swd.sample(&dis).unwrap();
        let expected: Array2<usize> = array![[1, 2]];
        assert_eq!(table.as_array(), &expected);
        assert_eq!(swd.rng.read().unwrap().consumed(), 4);

        let dis = line_distances(5);
        for bexp in [0., 10.] {
            let nrepl = 5000;
            let table = Swd::new(1)
                .n_replications(nrepl)
                .n_iterations(1)
                .bexp(bexp)
                .with_rng(Xoshiro256Plus::seed_from_u64(42))
                .sample(&dis)
                .unwrap();
            assert_eq!(table.nrows(), nrepl);
            assert_abs_diff_eq!(
                table.inclusion_frequencies(5),
                Array1::from_elem(5, 0.2),
                epsilon = 3e-2
            );
        }
    }

    #[test]
    fn test_swd_samples_are_valid() {
        let dis = line_distances(25);
        let table = Swd::new(6)
            .n_replications(15)
            .n_iterations(4)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(&dis)
            .unwrap();
        assert_eq!(table.nrows(), 6 * 15);
        for r in 0..15 {
            let units = table.units(r);
            assert!(units.iter().all(|&u| (1..=25).contains(&u)));
            let distinct: HashSet<usize> = units.iter().copied().collect();
            assert_eq!(distinct.len(), 6);
        }
    }

    #[test]
    fn test_swd_null_exponent_is_uniform() {
        let n = 6;
        let nrepl = 15000;
        let dis = line_distances(n);
        let table = Swd::new(2)
            .n_replications(nrepl)
            .n_iterations(3)
            .bexp(0.)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(&dis)
            .unwrap();
        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        for r in 0..nrepl {
            let mut pair = table.indices(r);
            pair.sort_unstable();
            *counts.entry((pair[0], pair[1])).or_default() += 1;
        }
        assert_eq!(counts.len(), 15);
        for count in counts.values() {
            assert_abs_diff_eq!(*count as f64 / nrepl as f64, 1. / 15., epsilon = 1.5e-2);
        }
    }

    #[test]
    fn test_swd_exponent_spreads_samples() {
        let dis = line_distances(10);
        let mean_spread = |bexp| {
            Swd::new(2)
                .n_replications(500)
                .n_iterations(5)
                .bexp(bexp)
                .with_rng(Xoshiro256Plus::seed_from_u64(11))
                .sample(&dis)
                .unwrap()
                .spread(&dis)
                .mean()
                .unwrap()
        };
        assert!(mean_spread(10.) > mean_spread(0.) + 1.);
    }

    #[test]
    fn test_swd_reproducible() {
        let dis = line_distances(20);
        let draw = |seed| {
            Swd::new(4)
                .n_replications(3)
                .with_rng(Xoshiro256Plus::seed_from_u64(seed))
                .sample(&dis)
                .unwrap()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn test_swd_single_precision() {
        let dis = line_distances(12).mapv(|v| v as f32);
        let table = Swd::new(3)
            .n_replications(4)
            .with_rng(Xoshiro256Plus::seed_from_u64(5))
            .sample(&dis)
            .unwrap();
        assert_eq!(table.nrows(), 12);
    }

    #[test]
    fn test_swd_coincident_units() {
        let dis = Array2::<f64>::zeros((4, 4));
        let res = Swd::new(2)
            .n_iterations(1)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(&dis);
        assert!(matches!(
            res,
            Err(SpbError::DegenerateDistanceSum { replication: 1, .. })
        ));
    }

    #[test]
    fn test_swd_validation_before_draws() {
        let dis = line_distances(4);
        let empty = || ScriptedRng::new(&[]);
        assert!(matches!(
            Swd::new_with_rng(5, empty()).sample(&dis),
            Err(SpbError::InvalidValueError(_))
        ));
        assert!(matches!(
            Swd::new_with_rng(2, empty()).bexp(f64::NAN).sample(&dis),
            Err(SpbError::InvalidValueError(_))
        ));
        let mut diag = dis.clone();
        diag[[3, 3]] = 1.;
        assert!(matches!(
            Swd::new_with_rng(2, empty()).sample(&diag),
            Err(SpbError::InvalidDistanceMatrix(_))
        ));
    }

    #[test]
    fn test_swap_ratio() {
        let dis = line_distances(4);
        let order = [1, 3, 0, 2];
        // unit 1 leaves (totc = 2), unit 0 enters (totb = 1 + 3 - 1)
        assert_abs_diff_eq!(swap_ratio(&dis.view(), &order, 2, 0, 2).unwrap(), 1.5);
        // unit 3 leaves (totc = 2), unit 2 enters (totb = 1 + 1 - 1)
        assert_abs_diff_eq!(swap_ratio(&dis.view(), &order, 2, 1, 3).unwrap(), 0.5);

        let ratio = swap_ratio(&dis.view(), &order, 2, 0, 2).unwrap();
        let before = within_sample_distance(&dis, &order[..2]);
        let after = within_sample_distance(&dis, &[0, 3]);
        assert_abs_diff_eq!(ratio, after / before);

        let zeros = Array2::<f64>::zeros((3, 3));
        assert!(swap_ratio(&zeros.view(), &[0, 1, 2], 2, 0, 2).is_none());
    }
}
