//! Dimension-1 distribution: running weighted moments of one coordinate.

use hx_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::dbn0::Dbn0;

/// Absolute epsilon below which the variance denominator `Σw² − Σw²ᵢ` is
/// treated as an unstable cancellation rather than a usable value.
pub(crate) const STAT_EPS: f64 = 1e-10;

/// Running weighted moments of a 1D sampled quantity.
///
/// Each fill contributes a weight `w` and a coordinate `x`; the stored
/// sums (`Σw`, `Σw²`, `Σwx`, `Σwx²`, plus the fill counter) are enough to
/// derive the weighted mean and spread, and combine exactly under
/// addition and subtraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dbn1 {
    w: Dbn0,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Dbn1 {
    /// New, unfilled distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from raw running sums, e.g. when unpersisting.
    pub fn from_raw(n_fills: u64, sum_w: f64, sum_w2: f64, sum_wx: f64, sum_wx2: f64) -> Self {
        Self { w: Dbn0::from_raw(n_fills, sum_w, sum_w2), sum_wx, sum_wx2 }
    }

    /// Contribute a sample at `x` with the given weight.
    pub fn fill(&mut self, x: f64, weight: f64) {
        self.w.fill(weight);
        self.sum_wx += weight * x;
        self.sum_wx2 += weight * x * x;
    }

    /// Reset to the unfilled state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rescale as if every fill weight had been multiplied by `factor`.
    ///
    /// The moment sums are linear in the weight, so both scale by `factor`;
    /// only `Σw²` scales quadratically. Never use this for a coordinate
    /// rescaling — that is [`Dbn1::scale_x`].
    pub fn scale_w(&mut self, factor: f64) {
        self.w.scale_w(factor);
        self.sum_wx *= factor;
        self.sum_wx2 *= factor;
    }

    /// Rescale as if every fill coordinate had been multiplied by `factor`,
    /// e.g. after a global bin-edge rescaling.
    pub fn scale_x(&mut self, factor: f64) {
        self.sum_wx *= factor;
        self.sum_wx2 *= factor * factor;
    }

    /// Number of times `fill` was called, ignoring weights.
    pub fn num_fills(&self) -> u64 {
        self.w.num_fills()
    }

    /// Sum of weights.
    pub fn sum_w(&self) -> f64 {
        self.w.sum_w()
    }

    /// Sum of squared weights.
    pub fn sum_w2(&self) -> f64 {
        self.w.sum_w2()
    }

    /// Sum of `w·x`.
    pub fn sum_wx(&self) -> f64 {
        self.sum_wx
    }

    /// Sum of `w·x²`.
    pub fn sum_wx2(&self) -> f64 {
        self.sum_wx2
    }

    /// Effective number of entries, `(Σw)² / Σw²`.
    pub fn eff_num_entries(&self) -> f64 {
        self.w.eff_num_entries()
    }

    /// Weighted mean `Σwx / Σw`.
    pub fn mean(&self) -> Result<f64> {
        if self.eff_num_entries() == 0.0 {
            return Err(Error::LowStats("mean requested of an unfilled distribution".into()));
        }
        Ok(self.sum_wx / self.w.sum_w())
    }

    /// Unbiased weighted variance,
    /// `(Σwx²·Σw − (Σwx)²) / ((Σw)² − Σw²)`.
    pub fn variance(&self) -> Result<f64> {
        if self.eff_num_entries() <= 1.0 {
            return Err(Error::LowStats(
                "variance requested with effective sample size <= 1".into(),
            ));
        }
        let num = self.sum_wx2 * self.w.sum_w() - self.sum_wx * self.sum_wx;
        let den = self.w.sum_w() * self.w.sum_w() - self.w.sum_w2();
        if den.abs() < STAT_EPS || (num.abs() < STAT_EPS && den.abs() < STAT_EPS) {
            return Err(Error::Weight("variance denominator cancels to zero".into()));
        }
        Ok(num / den)
    }

    /// Weighted standard deviation.
    pub fn std_dev(&self) -> Result<f64> {
        Ok(self.variance()?.sqrt())
    }

    /// Weighted standard error on the mean, `sqrt(variance / effN)`.
    pub fn std_err(&self) -> Result<f64> {
        Ok((self.variance()? / self.eff_num_entries()).sqrt())
    }

    /// Weighted RMS, `sqrt(Σwx² / Σw)`.
    pub fn rms(&self) -> Result<f64> {
        if self.eff_num_entries() == 0.0 {
            return Err(Error::LowStats("RMS requested of an unfilled distribution".into()));
        }
        Ok((self.sum_wx2 / self.w.sum_w()).sqrt())
    }

    /// Termwise addition of another distribution's running sums.
    pub fn add(&mut self, other: &Self) {
        self.w.add(&other.w);
        self.sum_wx += other.sum_wx;
        self.sum_wx2 += other.sum_wx2;
    }

    /// Termwise subtraction of another distribution's running sums.
    /// The fill counter accumulates; see [`Dbn0::subtract`].
    pub fn subtract(&mut self, other: &Self) {
        self.w.subtract(&other.w);
        self.sum_wx -= other.sum_wx;
        self.sum_wx2 -= other.sum_wx2;
    }
}

impl std::ops::AddAssign<&Dbn1> for Dbn1 {
    fn add_assign(&mut self, other: &Dbn1) {
        self.add(other);
    }
}

impl std::ops::SubAssign<&Dbn1> for Dbn1 {
    fn sub_assign(&mut self, other: &Dbn1) {
        self.subtract(other);
    }
}

impl std::ops::Add<&Dbn1> for Dbn1 {
    type Output = Dbn1;
    fn add(mut self, other: &Dbn1) -> Dbn1 {
        Dbn1::add(&mut self, other);
        self
    }
}

impl std::ops::Sub<&Dbn1> for Dbn1 {
    type Output = Dbn1;
    fn sub(mut self, other: &Dbn1) -> Dbn1 {
        Dbn1::subtract(&mut self, other);
        self
    }
}
