use std::sync::{Arc, RwLock};

use crate::errors::{Result, SpbError};
use crate::parameters::{HpwdParams, HpwdValidParams};
use crate::table::SampleTable;
use crate::traits::SpatialSampling;
use crate::utils::{check_distance_matrix, check_sample_size};
use linfa::{Float, ParamGuard};
use log::{debug, info};
use ndarray::{Array1, ArrayBase, ArrayView1, ArrayView2, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

type RngRef<R> = Arc<RwLock<R>>;

/// The Heuristic Product Within Distance design (hpwd) draws a sample of `nsamp` units
/// in exactly `nsamp` steps.
///
/// Selection probabilities start uniform. After each draw, the probability of every unit
/// is multiplied by its distance to the drawn unit and renormalized, so that units close
/// to already drawn ones become unlikely to be drawn next. The drawn unit itself gets a
/// null probability as the distance matrix diagonal is zero.
///
/// Inclusion probabilities are equal to `nsamp/N` when the distance matrix has been
/// standardized beforehand, otherwise they depend on the population layout.
///
/// Random draws consumption: one uniform value per draw step.
#[derive(Clone, Debug)]
pub struct Hpwd<R: Rng> {
    /// Sampling parameters (checked when sampling)
    params: HpwdParams,
    /// Random generator used for reproducibility
    rng: RngRef<R>,
}

/// Hpwd with default random generator
impl Hpwd<Xoshiro256Plus> {
    /// Constructor given the sample size, the random generator is seeded from entropy
    ///
    /// ```
    /// use spbsampling::{Hpwd, SpatialSampling};
    /// use ndarray::arr2;
    ///
    /// let dis = arr2(&[[0., 1., 2.], [1., 0., 1.], [2., 1., 0.]]);
    /// let table = Hpwd::new(2).n_replications(5).sample(&dis).unwrap();
    /// assert_eq!(table.nrows(), 10);
    /// ```
    pub fn new(nsamp: usize) -> Self {
        Self::new_with_rng(nsamp, Xoshiro256Plus::from_entropy())
    }
}

impl<R: Rng> Hpwd<R> {
    /// Constructor given the sample size and a random generator
    pub fn new_with_rng(nsamp: usize, rng: R) -> Self {
        Self::from_params(HpwdParams::new(nsamp), rng)
    }

    /// Constructor given a set of parameters and a random generator
    pub fn from_params(params: impl Into<HpwdParams>, rng: R) -> Self {
        Hpwd {
            params: params.into(),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Sets the number of samples drawn
    pub fn n_replications(mut self, nrepl: usize) -> Self {
        self.params = self.params.nrepl(nrepl);
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng>(self, rng: R2) -> Hpwd<R2> {
        Hpwd {
            params: self.params,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Parameters of the design
    pub fn params(&self) -> &HpwdParams {
        &self.params
    }
}

impl<R: Rng> SpatialSampling for Hpwd<R> {
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
            "Hpwd: draw {} samples of {} units among {}",
            params.nrepl,
            params.nsamp,
            dis.nrows()
        );
        let mut rng = self.rng.write().map_err(|_| SpbError::RngLockError)?;
        SampleTable::from_replications(params.nsamp, params.nrepl, |r| {
            debug!("Hpwd replication {}/{}", r + 1, params.nrepl);
            draw_sample(params, &dis, r, &mut *rng)
        })
    }
}

/// Draws the `replication`-th sample, returns 0-based unit indices in draw order
fn draw_sample<F: Float, R: Rng + ?Sized>(
    params: &HpwdValidParams,
    dis: &ArrayView2<F>,
    replication: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let npop = dis.nrows();
    let mut weights = Array1::from_elem(npop, F::one() / F::cast(npop));
    let mut drawn = Vec::with_capacity(params.nsamp);
    for step in 0..params.nsamp {
        let r = F::cast(rng.r#gen::<f64>());
        let unit = inverse_cdf(&weights.view(), r);
        drawn.push(unit);
        // weights are useless after the last draw
        if step + 1 < params.nsamp {
            weights = update_weights(&weights.view(), &dis.row(unit)).ok_or(
                SpbError::DegenerateWeights {
                    replication: replication + 1,
                    step: step + 1,
                },
            )?;
        }
    }
    Ok(drawn)
}

/// Index of the first unit whose cumulative weight is strictly greater than `r`.
///
/// When rounding leaves every cumulative weight below `r`, the last unit
/// with a positive weight is returned.
pub(crate) fn inverse_cdf<F: Float>(weights: &ArrayView1<F>, r: F) -> usize {
    let cumsum: Vec<F> = weights
        .iter()
        .scan(F::zero(), |acc, &w| {
            *acc = *acc + w;
            Some(*acc)
        })
        .collect();
    let i = cumsum.partition_point(|&c| c <= r);
    if i < cumsum.len() {
        i
    } else {
        weights
            .iter()
            .rposition(|&w| w > F::zero())
            .unwrap_or(cumsum.len() - 1)
    }
}

/// Weights after drawing a unit given its distances to every unit:
/// each weight is multiplied by the distance then the vector is renormalized.
///
/// Returns `None` when the updated weights do not sum to a positive finite value.
pub(crate) fn update_weights<F: Float>(
    weights: &ArrayView1<F>,
    distances: &ArrayView1<F>,
) -> Option<Array1<F>> {
    let updated = weights * distances;
    let total = updated.sum();
    if total > F::zero() && total.is_finite() {
        Some(updated / total)
    } else {
        None
    }
}
