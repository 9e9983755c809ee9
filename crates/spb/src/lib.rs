/*!
This library implements spatially balanced sampling designs: random samples of a finite
population in which units close to each other are unlikely to be drawn together.
The population is only known through its pairwise distance matrix (geographic or
feature-space distances).

Two designs are available:
* [Heuristic Product Within Distance](crate::hpwd::Hpwd) (hpwd): units are drawn one at a
  time, selection probabilities being multiplied by the distances to the last drawn unit,
* [Sum Within Distance](crate::swd::Swd) (swd): a random sample is improved by randomized
  swaps with out-of-sample units, accepted with a probability increasing with the
  within sample distance.

Both designs draw `nrepl` independent samples of `nsamp` units and return them as a
[SampleTable] of (replication id, unit id) rows.

To get constant inclusion probabilities equal to `nsamp/N` the distance matrix has to be
standardized beforehand, this library uses whatever matrix it is given.

Example:
```
use spbsampling::{Hpwd, SpatialSampling, Swd};
use ndarray::Array2;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

// 20 units regularly spaced on a line
let dis = Array2::from_shape_fn((20, 20), |(i, j)| (i as f64 - j as f64).abs());

// 10 samples of 4 units with the heuristic product within distance design
let samples = Hpwd::new(4)
    .n_replications(10)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .sample(&dis)
    .unwrap();
assert_eq!(samples.nrows(), 40);

// or with the sum within distance design
let samples = Swd::new(4)
    .n_replications(10)
    .n_iterations(10)
    .bexp(10.)
    .with_rng(Xoshiro256Plus::seed_from_u64(42))
    .sample(&dis)
    .unwrap();
println!("spread = {}", samples.spread(&dis));
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod errors;
mod hpwd;
mod parameters;
mod swd;
mod table;
mod traits;
mod utils;

pub use errors::*;
pub use hpwd::*;
pub use parameters::*;
pub use swd::*;
pub use table::*;
pub use traits::*;
pub use utils::{within_sample_distance, SYMMETRY_TOL};

/// Env variable used to set the log level of binaries and benchmarks
pub const SPB_LOG: &str = "SPB_LOG";

/// Number of samples drawn by default
pub const DEFAULT_N_REPLICATIONS: usize = 1;
/// Number of swap sweeps of [Swd] by default
pub const SWD_DEFAULT_N_ITERATIONS: usize = 10;
/// Acceptance exponent of [Swd] by default
pub const SWD_DEFAULT_BEXP: f64 = 10.;
