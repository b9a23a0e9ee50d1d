//! A 2D bin: a rectangle of edge pairs plus the statistic inside it.

use hx_core::{fuzzy_eq, Error, Result};
use serde::{Deserialize, Serialize};

use crate::dbn1::Dbn1;
use crate::fill::{Distribution, Fill2};

/// One rectangular bin of a 2D axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin2D<D> {
    xlow: f64,
    xhigh: f64,
    ylow: f64,
    yhigh: f64,
    dbn: D,
}

impl<D: Fill2> Bin2D<D> {
    /// New empty bin over `[xlow, xhigh) × [ylow, yhigh)`.
    ///
    /// Fails with [`Error::Range`] unless both edge pairs are finite and
    /// strictly ordered.
    pub fn new(xlow: f64, xhigh: f64, ylow: f64, yhigh: f64) -> Result<Self> {
        let ordered = |lo: f64, hi: f64| lo.is_finite() && hi.is_finite() && lo < hi;
        if !ordered(xlow, xhigh) || !ordered(ylow, yhigh) {
            return Err(Error::Range(format!(
                "bin edges must be finite and strictly ordered, \
                 got [{xlow}, {xhigh}) x [{ylow}, {yhigh})"
            )));
        }
        Ok(Self { xlow, xhigh, ylow, yhigh, dbn: D::default() })
    }

    /// New bin carrying an existing statistic.
    pub fn with_dbn(xlow: f64, xhigh: f64, ylow: f64, yhigh: f64, dbn: D) -> Result<Self> {
        let mut bin = Self::new(xlow, xhigh, ylow, yhigh)?;
        bin.dbn = dbn;
        Ok(bin)
    }

    /// Contribute a sample at `(x, y)`. The axis guarantees containment.
    pub fn fill(&mut self, x: f64, y: f64, extra: D::Extra, weight: f64) {
        self.dbn.fill2(x, y, extra, weight);
    }

    /// Contribute a sample at the bin's focus point.
    pub fn fill_bin(&mut self, extra: D::Extra, weight: f64) {
        self.dbn.fill2(self.x_focus(), self.y_focus(), extra, weight);
    }

    /// Clear the statistic, keeping the edges.
    pub fn reset(&mut self) {
        self.dbn.reset();
    }

    /// Low x edge.
    pub fn x_low(&self) -> f64 {
        self.xlow
    }

    /// High x edge.
    pub fn x_high(&self) -> f64 {
        self.xhigh
    }

    /// Low y edge.
    pub fn y_low(&self) -> f64 {
        self.ylow
    }

    /// High y edge.
    pub fn y_high(&self) -> f64 {
        self.yhigh
    }

    /// Geometric centre along x.
    pub fn x_mid(&self) -> f64 {
        0.5 * (self.xlow + self.xhigh)
    }

    /// Geometric centre along y.
    pub fn y_mid(&self) -> f64 {
        0.5 * (self.ylow + self.yhigh)
    }

    /// Bin width along x.
    pub fn x_width(&self) -> f64 {
        self.xhigh - self.xlow
    }

    /// Bin width along y.
    pub fn y_width(&self) -> f64 {
        self.yhigh - self.ylow
    }

    /// Rectangle area.
    pub fn area(&self) -> f64 {
        self.x_width() * self.y_width()
    }

    /// True if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xlow <= x && x < self.xhigh && self.ylow <= y && y < self.yhigh
    }

    /// Focus along x: mean of the fills, or the centre while unfilled.
    pub fn x_focus(&self) -> f64 {
        if self.dbn.sum_w() != 0.0 {
            self.x_dbn().mean().unwrap_or_else(|_| self.x_mid())
        } else {
            self.x_mid()
        }
    }

    /// Focus along y: mean of the fills, or the centre while unfilled.
    pub fn y_focus(&self) -> f64 {
        if self.dbn.sum_w() != 0.0 {
            self.y_dbn().mean().unwrap_or_else(|_| self.y_mid())
        } else {
            self.y_mid()
        }
    }

    /// The accumulated statistic.
    pub fn dbn(&self) -> &D {
        &self.dbn
    }

    /// Marginal distribution along x.
    pub fn x_dbn(&self) -> Dbn1 {
        self.dbn.x_dbn()
    }

    /// Marginal distribution along y.
    pub fn y_dbn(&self) -> Dbn1 {
        self.dbn.y_dbn()
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

    /// Area-normalized sum of weights.
    pub fn height(&self) -> f64 {
        self.dbn.sum_w() / self.area()
    }

    /// Weighted mean x coordinate.
    pub fn x_mean(&self) -> Result<f64> {
        self.x_dbn().mean()
    }

    /// Weighted mean y coordinate.
    pub fn y_mean(&self) -> Result<f64> {
        self.y_dbn().mean()
    }

    /// Weighted x variance.
    pub fn x_variance(&self) -> Result<f64> {
        self.x_dbn().variance()
    }

    /// Weighted y variance.
    pub fn y_variance(&self) -> Result<f64> {
        self.y_dbn().variance()
    }

    /// Weighted x standard deviation.
    pub fn x_std_dev(&self) -> Result<f64> {
        self.x_dbn().std_dev()
    }

    /// Weighted y standard deviation.
    pub fn y_std_dev(&self) -> Result<f64> {
        self.y_dbn().std_dev()
    }

    /// Weighted standard error on the x mean.
    pub fn x_std_err(&self) -> Result<f64> {
        self.x_dbn().std_err()
    }

    /// Weighted standard error on the y mean.
    pub fn y_std_err(&self) -> Result<f64> {
        self.y_dbn().std_err()
    }

    /// Rescale the fill weights.
    pub fn scale_w(&mut self, factor: f64) {
        self.dbn.scale_w(factor);
    }

    /// Rescale both coordinates: edges and statistic together. Negative
    /// factors reverse the corresponding edge order, so edges re-sort.
    pub fn scale_xy(&mut self, fx: f64, fy: f64) {
        self.xlow *= fx;
        self.xhigh *= fx;
        if self.xlow > self.xhigh {
            std::mem::swap(&mut self.xlow, &mut self.xhigh);
        }
        self.ylow *= fy;
        self.yhigh *= fy;
        if self.ylow > self.yhigh {
            std::mem::swap(&mut self.ylow, &mut self.yhigh);
        }
        self.dbn.scale_x(fx);
        self.dbn.scale_y(fy);
    }

    /// Absorb another bin, widening the rectangle to the bounding box of
    /// both. The axis checks the tiling before merging.
    pub fn merge(&mut self, other: &Self) {
        self.xlow = self.xlow.min(other.xlow);
        self.xhigh = self.xhigh.max(other.xhigh);
        self.ylow = self.ylow.min(other.ylow);
        self.yhigh = self.yhigh.max(other.yhigh);
        self.dbn.add(&other.dbn);
    }

    /// Termwise-add a bin with the same rectangle.
    ///
    /// Fails with [`Error::Logic`] when any edge differs beyond fuzzy
    /// tolerance, leaving `self` untouched.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_same_edges(other, "add")?;
        self.dbn.add(&other.dbn);
        Ok(())
    }

    /// Termwise-subtract a bin with the same rectangle.
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        self.check_same_edges(other, "subtract")?;
        self.dbn.subtract(&other.dbn);
        Ok(())
    }

    fn check_same_edges(&self, other: &Self, op: &str) -> Result<()> {
        let same = fuzzy_eq(self.xlow, other.xlow)
            && fuzzy_eq(self.xhigh, other.xhigh)
            && fuzzy_eq(self.ylow, other.ylow)
            && fuzzy_eq(self.yhigh, other.yhigh);
        if !same {
            return Err(Error::Logic(format!(
                "cannot {op} bins with different edges: \
                 [{}, {}) x [{}, {}) vs [{}, {}) x [{}, {})",
                self.xlow,
                self.xhigh,
                self.ylow,
                self.yhigh,
                other.xlow,
                other.xhigh,
                other.ylow,
                other.yhigh
            )));
        }
        Ok(())
    }
}
