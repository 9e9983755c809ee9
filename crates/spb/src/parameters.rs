use crate::errors::{Result, SpbError};
use crate::{DEFAULT_N_REPLICATIONS, SWD_DEFAULT_BEXP, SWD_DEFAULT_N_ITERATIONS};
use linfa::ParamGuard;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated [Hpwd](crate::Hpwd) parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct HpwdValidParams {
    /// Number of units drawn in each sample
    pub(crate) nsamp: usize,
    /// Number of samples drawn
    pub(crate) nrepl: usize,
}

impl HpwdValidParams {
    /// Get the sample size
    pub fn nsamp(&self) -> usize {
        self.nsamp
    }

    /// Get the number of replications
    pub fn nrepl(&self) -> usize {
        self.nrepl
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
/// The set of parameters that can be specified for the execution of
/// the [heuristic product within distance](crate::Hpwd) design.
pub struct HpwdParams(pub(crate) HpwdValidParams);

impl HpwdParams {
    /// A constructor for Hpwd parameters given the sample size
    pub fn new(nsamp: usize) -> HpwdParams {
        Self(HpwdValidParams {
            nsamp,
            nrepl: DEFAULT_N_REPLICATIONS,
        })
    }

    /// Set the sample size.
    pub fn nsamp(mut self, nsamp: usize) -> Self {
        self.0.nsamp = nsamp;
        self
    }

    /// Set the number of samples drawn.
    pub fn nrepl(mut self, nrepl: usize) -> Self {
        self.0.nrepl = nrepl;
        self
    }
}

impl From<HpwdValidParams> for HpwdParams {
    fn from(valid: HpwdValidParams) -> Self {
        HpwdParams(valid)
    }
}

impl ParamGuard for HpwdParams {
    type Checked = HpwdValidParams;
    type Error = SpbError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_counts(self.0.nsamp, self.0.nrepl)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// A set of validated [Swd](crate::Swd) parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SwdValidParams {
    /// Number of units drawn in each sample
    pub(crate) nsamp: usize,
    /// Number of samples drawn
    pub(crate) nrepl: usize,
    /// Number of swap sweeps over the population
    pub(crate) niter: usize,
    /// Exponent of the acceptance ratio, the higher the more spread the samples
    pub(crate) bexp: f64,
}

impl SwdValidParams {
    /// Get the sample size
    pub fn nsamp(&self) -> usize {
        self.nsamp
    }

    /// Get the number of replications
    pub fn nrepl(&self) -> usize {
        self.nrepl
    }

    /// Get the number of sweeps
    pub fn niter(&self) -> usize {
        self.niter
    }

    /// Get the acceptance exponent
    pub fn bexp(&self) -> f64 {
        self.bexp
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
/// The set of parameters that can be specified for the execution of
/// the [sum within distance](crate::Swd) design.
pub struct SwdParams(pub(crate) SwdValidParams);

impl SwdParams {
    /// A constructor for Swd parameters given the sample size
    pub fn new(nsamp: usize) -> SwdParams {
        Self(SwdValidParams {
            nsamp,
            nrepl: DEFAULT_N_REPLICATIONS,
            niter: SWD_DEFAULT_N_ITERATIONS,
            bexp: SWD_DEFAULT_BEXP,
        })
    }

    /// Set the sample size.
    pub fn nsamp(mut self, nsamp: usize) -> Self {
        self.0.nsamp = nsamp;
        self
    }

    /// Set the number of samples drawn.
    pub fn nrepl(mut self, nrepl: usize) -> Self {
        self.0.nrepl = nrepl;
        self
    }

    /// Set the number of swap sweeps.
    ///
    /// Each sweep proposes as many swaps as there are units in the population.
    pub fn niter(mut self, niter: usize) -> Self {
        self.0.niter = niter;
        self
    }

    /// Set the acceptance exponent.
    ///
    /// 0 accepts every proposal, large values approach a greedy ascent of the
    /// within sample distance.
    pub fn bexp(mut self, bexp: f64) -> Self {
        self.0.bexp = bexp;
        self
    }
}

impl From<SwdValidParams> for SwdParams {
    fn from(valid: SwdValidParams) -> Self {
        SwdParams(valid)
    }
}

impl ParamGuard for SwdParams {
    type Checked = SwdValidParams;
    type Error = SpbError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_counts(self.0.nsamp, self.0.nrepl)?;
        if !self.0.bexp.is_finite() {
            return Err(SpbError::InvalidValueError(format!(
                "`bexp` should be finite, got {}",
                self.0.bexp
            )));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

fn check_counts(nsamp: usize, nrepl: usize) -> Result<()> {
    if nsamp == 0 {
        return Err(SpbError::InvalidValueError(
            "`nsamp` cannot be 0!".to_string(),
        ));
    }
    if nrepl == 0 {
        return Err(SpbError::InvalidValueError(
            "`nrepl` cannot be 0!".to_string(),
        ));
    }
    Ok(())
}
