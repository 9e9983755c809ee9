use crate::errors::Result;
use crate::utils::within_sample_distance;
use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView1, Data, Ix2};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Samples drawn over several replications.
///
/// The table is a (nsamp * nrepl, 2) matrix where each row is a pair
/// (replication id, unit id), both starting at 1. Rows of a replication
/// are contiguous and follow the draw order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SampleTable {
    data: Array2<usize>,
    nsamp: usize,
    nrepl: usize,
}

impl SampleTable {
    /// Runs `draw` for each replication `0..nrepl` and stacks the drawn 0-based
    /// unit indices. Fails as a whole as soon as one replication fails.
    pub(crate) fn from_replications<D>(nsamp: usize, nrepl: usize, mut draw: D) -> Result<Self>
    where
        D: FnMut(usize) -> Result<Vec<usize>>,
    {
        let mut data = Array2::zeros((nsamp * nrepl, 2));
        for r in 0..nrepl {
            let indices = draw(r)?;
            debug_assert_eq!(indices.len(), nsamp);
            let mut block = data.slice_mut(s![r * nsamp..(r + 1) * nsamp, ..]);
            for (mut row, idx) in block.rows_mut().into_iter().zip(indices) {
                row[0] = r + 1;
                row[1] = idx + 1;
            }
        }
        Ok(SampleTable { data, nsamp, nrepl })
    }

    /// The underlying (nsamp * nrepl, 2) matrix
    pub fn as_array(&self) -> &Array2<usize> {
        &self.data
    }

    /// Consumes the table into its (nsamp * nrepl, 2) matrix
    pub fn into_array(self) -> Array2<usize> {
        self.data
    }

    /// Number of rows, that is nsamp * nrepl
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of units in each sample
    pub fn sample_size(&self) -> usize {
        self.nsamp
    }

    /// Number of replications
    pub fn n_replications(&self) -> usize {
        self.nrepl
    }

    /// Unit ids (1-based) of the `r`-th replication, `r` in `0..nrepl`
    ///
    /// **Panics** if `r` is out of range.
    pub fn units(&self, r: usize) -> ArrayView1<'_, usize> {
        assert!(r < self.nrepl, "replication {r} out of range");
        self.data.slice(s![r * self.nsamp..(r + 1) * self.nsamp, 1])
    }

    /// Unit 0-based indices of the `r`-th replication, `r` in `0..nrepl`,
    /// suitable to index the distance matrix.
    ///
    /// **Panics** if `r` is out of range.
    pub fn indices(&self, r: usize) -> Vec<usize> {
        self.units(r).iter().map(|&u| u - 1).collect()
    }

    /// Iterator over the (replication id, unit id) rows
    pub fn rows(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data.rows().into_iter().map(|row| (row[0], row[1]))
    }

    /// Within sample distance of each replication
    pub fn spread<F: Float>(&self, dis: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array1<F> {
        Array1::from_shape_fn(self.nrepl, |r| {
            within_sample_distance(dis, &self.indices(r))
        })
    }

    /// Empirical inclusion probability of each unit of a population of size `npop`,
    /// that is the fraction of replications in which the unit was drawn.
    ///
    /// **Panics** if `npop` is smaller than a unit id of the table.
    pub fn inclusion_frequencies(&self, npop: usize) -> Array1<f64> {
        let mut freqs = Array1::<f64>::zeros(npop);
        for (_, unit) in self.rows() {
            freqs[unit - 1] += 1.;
        }
        freqs / self.nrepl as f64
    }
}
