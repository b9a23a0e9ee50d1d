//! Dimension-0 distribution: pure weight accumulation.

use serde::{Deserialize, Serialize};

/// Running sums of a weighted event count, with no coordinate attached.
///
/// This is the weight "core" shared by every higher-dimensional
/// distribution: the fill counter, the sum of weights and the sum of
/// squared weights. It is also usable on its own as a counter statistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dbn0 {
    n_fills: u64,
    sum_w: f64,
    sum_w2: f64,
}

impl Dbn0 {
    /// New, unfilled distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from raw running sums, e.g. when unpersisting.
    pub fn from_raw(n_fills: u64, sum_w: f64, sum_w2: f64) -> Self {
        Self { n_fills, sum_w, sum_w2 }
    }

    /// Contribute one sample with the given weight.
    ///
    /// The fill counter increments by exactly 1 regardless of the weight's
    /// sign or magnitude, including zero.
    pub fn fill(&mut self, weight: f64) {
        self.n_fills += 1;
        self.sum_w += weight;
        self.sum_w2 += weight * weight;
    }

    /// Reset to the unfilled state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rescale as if every fill weight had been multiplied by `factor`.
    pub fn scale_w(&mut self, factor: f64) {
        self.sum_w *= factor;
        self.sum_w2 *= factor * factor;
    }

    /// Number of times `fill` was called, ignoring weights.
    pub fn num_fills(&self) -> u64 {
        self.n_fills
    }

    /// Sum of weights.
    pub fn sum_w(&self) -> f64 {
        self.sum_w
    }

    /// Sum of squared weights.
    pub fn sum_w2(&self) -> f64 {
        self.sum_w2
    }

    /// Effective number of entries, `(Σw)² / Σw²`.
    ///
    /// A weighted sample-size proxy robust to heterogeneous weights; zero
    /// for an unfilled distribution.
    pub fn eff_num_entries(&self) -> f64 {
        if self.sum_w2 == 0.0 {
            return 0.0;
        }
        self.sum_w * self.sum_w / self.sum_w2
    }

    /// Termwise addition of another distribution's running sums.
    pub fn add(&mut self, other: &Self) {
        self.n_fills += other.n_fills;
        self.sum_w += other.sum_w;
        self.sum_w2 += other.sum_w2;
    }

    /// Termwise subtraction of another distribution's running sums.
    ///
    /// The fill counter still increases: it counts all contributing fill
    /// calls regardless of sign, so a difference of histograms reports how
    /// many fills went into producing it.
    pub fn subtract(&mut self, other: &Self) {
        self.n_fills += other.n_fills;
        self.sum_w -= other.sum_w;
        self.sum_w2 -= other.sum_w2;
    }
}

impl std::ops::AddAssign<&Dbn0> for Dbn0 {
    fn add_assign(&mut self, other: &Dbn0) {
        self.add(other);
    }
}

impl std::ops::SubAssign<&Dbn0> for Dbn0 {
    fn sub_assign(&mut self, other: &Dbn0) {
        self.subtract(other);
    }
}

impl std::ops::Add<&Dbn0> for Dbn0 {
    type Output = Dbn0;
    fn add(mut self, other: &Dbn0) -> Dbn0 {
        Dbn0::add(&mut self, other);
        self
    }
}

impl std::ops::Sub<&Dbn0> for Dbn0 {
    type Output = Dbn0;
    fn sub(mut self, other: &Dbn0) -> Dbn0 {
        Dbn0::subtract(&mut self, other);
        self
    }
}
