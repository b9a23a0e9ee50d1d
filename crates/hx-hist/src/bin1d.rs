//! A 1D bin: an edge pair plus the statistic accumulated inside it.

use hx_core::{fuzzy_eq, Error, Result};
use serde::{Deserialize, Serialize};

use crate::dbn1::Dbn1;
use crate::fill::{Distribution, Fill1};

/// One bin of a 1D axis.
///
/// The bin owns its edge pair and a fill statistic `D`. Geometry and
/// statistics are queried on the bin; routing of coordinates to bins is
/// the axis's job, so `fill` here trusts the caller that `x` belongs in
/// this bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin1D<D> {
    xlow: f64,
    xhigh: f64,
    dbn: D,
}

impl<D: Fill1> Bin1D<D> {
    /// New empty bin over `[xlow, xhigh)`.
    ///
    /// Fails with [`Error::Range`] unless the edges are finite and
    /// strictly ordered: zero-width bins are not representable.
    pub fn new(xlow: f64, xhigh: f64) -> Result<Self> {
        if !xlow.is_finite() || !xhigh.is_finite() || xlow >= xhigh {
            return Err(Error::Range(format!(
                "bin edges must be finite and strictly ordered, got [{xlow}, {xhigh})"
            )));
        }
        Ok(Self { xlow, xhigh, dbn: D::default() })
    }

    /// New bin over `[xlow, xhigh)` carrying an existing statistic.
    pub fn with_dbn(xlow: f64, xhigh: f64, dbn: D) -> Result<Self> {
        let mut bin = Self::new(xlow, xhigh)?;
        bin.dbn = dbn;
        Ok(bin)
    }

    /// Contribute a sample at `x`. The axis guarantees containment.
    pub fn fill(&mut self, x: f64, extra: D::Extra, weight: f64) {
        self.dbn.fill1(x, extra, weight);
    }

    /// Contribute a sample at the bin focus.
    pub fn fill_bin(&mut self, extra: D::Extra, weight: f64) {
        self.dbn.fill1(self.focus(), extra, weight);
    }

    /// Clear the statistic, keeping the edges.
    pub fn reset(&mut self) {
        self.dbn.reset();
    }

    /// Low edge.
    pub fn x_low(&self) -> f64 {
        self.xlow
    }

    /// High edge.
    pub fn x_high(&self) -> f64 {
        self.xhigh
    }

    /// Geometric bin centre.
    pub fn x_mid(&self) -> f64 {
        0.5 * (self.xlow + self.xhigh)
    }

    /// Bin width.
    pub fn x_width(&self) -> f64 {
        self.xhigh - self.xlow
    }

    /// The point a whole-bin fill lands on: the weighted mean of the
    /// fills seen so far, or the geometric centre while unfilled.
    pub fn focus(&self) -> f64 {
        if self.dbn.sum_w() != 0.0 {
            self.x_dbn().mean().unwrap_or_else(|_| self.x_mid())
        } else {
            self.x_mid()
        }
    }

    /// The accumulated statistic.
    pub fn dbn(&self) -> &D {
        &self.dbn
    }

    /// Marginal distribution along the binning axis.
    pub fn x_dbn(&self) -> Dbn1 {
        self.dbn.x_dbn()
    }

    /// Number of fills.
    pub fn num_fills(&self) -> u64 {
        self.dbn.num_fills()
    }

    /// Effective number of entries.
    pub fn eff_num_entries(&self) -> f64 {
        self.dbn.eff_num_entries()
    }

    /// Sum of fill weights.
    pub fn sum_w(&self) -> f64 {
        self.dbn.sum_w()
    }

    /// Sum of squared fill weights.
    pub fn sum_w2(&self) -> f64 {
        self.dbn.sum_w2()
    }

    /// Sum of weights, read as an area under a unit-height bar.
    pub fn area(&self) -> f64 {
        self.dbn.sum_w()
    }

    /// Width-normalized sum of weights.
    pub fn height(&self) -> f64 {
        self.dbn.sum_w() / self.x_width()
    }

    /// Weighted mean fill coordinate.
    pub fn x_mean(&self) -> Result<f64> {
        self.x_dbn().mean()
    }

    /// Weighted variance of the fill coordinate.
    pub fn x_variance(&self) -> Result<f64> {
        self.x_dbn().variance()
    }

    /// Weighted standard deviation of the fill coordinate.
    pub fn x_std_dev(&self) -> Result<f64> {
        self.x_dbn().std_dev()
    }

    /// Weighted standard error on the mean fill coordinate.
    pub fn x_std_err(&self) -> Result<f64> {
        self.x_dbn().std_err()
    }

    /// Weighted RMS of the fill coordinate.
    pub fn x_rms(&self) -> Result<f64> {
        self.x_dbn().rms()
    }

    /// Rescale the fill weights.
    pub fn scale_w(&mut self, factor: f64) {
        self.dbn.scale_w(factor);
    }

    /// Rescale the coordinate: edges and statistic together. A negative
    /// factor reverses the edge order, so the edges are re-sorted.
    pub fn scale_x(&mut self, factor: f64) {
        self.xlow *= factor;
        self.xhigh *= factor;
        if self.xlow > self.xhigh {
            std::mem::swap(&mut self.xlow, &mut self.xhigh);
        }
        self.dbn.scale_x(factor);
    }

    /// Absorb another bin, widening the edges to cover both.
    ///
    /// Contiguity is not checked here; axes check for gaps before
    /// merging adjacent bins.
    pub fn merge(&mut self, other: &Self) {
        self.xlow = self.xlow.min(other.xlow);
        self.xhigh = self.xhigh.max(other.xhigh);
        self.dbn.add(&other.dbn);
    }

    /// Termwise-add a bin with the same edges.
    ///
    /// Fails with [`Error::Logic`] when the edges differ beyond fuzzy
    /// tolerance, leaving `self` untouched.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_same_edges(other, "add")?;
        self.dbn.add(&other.dbn);
        Ok(())
    }

    /// Termwise-subtract a bin with the same edges.
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        self.check_same_edges(other, "subtract")?;
        self.dbn.subtract(&other.dbn);
        Ok(())
    }

    fn check_same_edges(&self, other: &Self, op: &str) -> Result<()> {
        if !fuzzy_eq(self.xlow, other.xlow) || !fuzzy_eq(self.xhigh, other.xhigh) {
            return Err(Error::Logic(format!(
                "cannot {op} bins with different edges: [{}, {}) vs [{}, {})",
                self.xlow, self.xhigh, other.xlow, other.xhigh
            )));
        }
        Ok(())
    }
}
