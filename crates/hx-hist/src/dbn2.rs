//! Dimension-2 distribution: running weighted moments of an (x, y) pair.

use hx_core::Result;
use serde::{Deserialize, Serialize};

use crate::dbn1::Dbn1;

/// Running weighted moments of a 2D sampled quantity.
///
/// Marginal moments live in two [`Dbn1`] sub-distributions (the weight
/// sums are mirrored in both, which keeps axis-flips and marginal
/// extraction trivial); the only genuinely 2D term is `Σwxy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dbn2 {
    x: Dbn1,
    y: Dbn1,
    sum_wxy: f64,
}

impl Dbn2 {
    /// New, unfilled distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from raw running sums, e.g. when unpersisting.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        n_fills: u64,
        sum_w: f64,
        sum_w2: f64,
        sum_wx: f64,
        sum_wx2: f64,
        sum_wy: f64,
        sum_wy2: f64,
        sum_wxy: f64,
    ) -> Self {
        Self {
            x: Dbn1::from_raw(n_fills, sum_w, sum_w2, sum_wx, sum_wx2),
            y: Dbn1::from_raw(n_fills, sum_w, sum_w2, sum_wy, sum_wy2),
            sum_wxy,
        }
    }

    /// Contribute a sample at `(x, y)` with the given weight.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        self.x.fill(x, weight);
        self.y.fill(y, weight);
        self.sum_wxy += weight * x * y;
    }

    /// Reset to the unfilled state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rescale as if every fill weight had been multiplied by `factor`.
    pub fn scale_w(&mut self, factor: f64) {
        self.x.scale_w(factor);
        self.y.scale_w(factor);
        self.sum_wxy *= factor;
    }

    /// Rescale the x coordinate by `factor`.
    pub fn scale_x(&mut self, factor: f64) {
        self.x.scale_x(factor);
        self.sum_wxy *= factor;
    }

    /// Rescale the y coordinate by `factor`.
    pub fn scale_y(&mut self, factor: f64) {
        self.y.scale_x(factor);
        self.sum_wxy *= factor;
    }

    /// Rescale both coordinates.
    pub fn scale_xy(&mut self, fx: f64, fy: f64) {
        self.scale_x(fx);
        self.scale_y(fy);
    }

    /// Swap the roles of the x and y axes without refilling.
    pub fn flip_xy(&mut self) {
        std::mem::swap(&mut self.x, &mut self.y);
    }

    /// Extract the 1D marginal distribution along x.
    pub fn transform_x(&self) -> Dbn1 {
        self.x
    }

    /// Extract the 1D marginal distribution along y.
    pub fn transform_y(&self) -> Dbn1 {
        self.y
    }

    /// Number of times `fill` was called, ignoring weights.
    pub fn num_fills(&self) -> u64 {
        self.x.num_fills()
    }

    /// Sum of weights.
    pub fn sum_w(&self) -> f64 {
        self.x.sum_w()
    }

    /// Sum of squared weights.
    pub fn sum_w2(&self) -> f64 {
        self.x.sum_w2()
    }

    /// Sum of `w·x`.
    pub fn sum_wx(&self) -> f64 {
        self.x.sum_wx()
    }

    /// Sum of `w·x²`.
    pub fn sum_wx2(&self) -> f64 {
        self.x.sum_wx2()
    }

    /// Sum of `w·y`.
    pub fn sum_wy(&self) -> f64 {
        self.y.sum_wx()
    }

    /// Sum of `w·y²`.
    pub fn sum_wy2(&self) -> f64 {
        self.y.sum_wx2()
    }

    /// Sum of `w·x·y`.
    pub fn sum_wxy(&self) -> f64 {
        self.sum_wxy
    }

    /// Effective number of entries, `(Σw)² / Σw²`.
    pub fn eff_num_entries(&self) -> f64 {
        self.x.eff_num_entries()
    }

    /// Weighted x mean.
    pub fn x_mean(&self) -> Result<f64> {
        self.x.mean()
    }

    /// Weighted y mean.
    pub fn y_mean(&self) -> Result<f64> {
        self.y.mean()
    }

    /// Weighted x variance.
    pub fn x_variance(&self) -> Result<f64> {
        self.x.variance()
    }

    /// Weighted y variance.
    pub fn y_variance(&self) -> Result<f64> {
        self.y.variance()
    }

    /// Weighted x standard deviation.
    pub fn x_std_dev(&self) -> Result<f64> {
        self.x.std_dev()
    }

    /// Weighted y standard deviation.
    pub fn y_std_dev(&self) -> Result<f64> {
        self.y.std_dev()
    }

    /// Weighted standard error on the x mean.
    pub fn x_std_err(&self) -> Result<f64> {
        self.x.std_err()
    }

    /// Weighted standard error on the y mean.
    pub fn y_std_err(&self) -> Result<f64> {
        self.y.std_err()
    }

    /// Termwise addition of another distribution's running sums.
    pub fn add(&mut self, other: &Self) {
        self.x.add(&other.x);
        self.y.add(&other.y);
        self.sum_wxy += other.sum_wxy;
    }

    /// Termwise subtraction of another distribution's running sums.
    pub fn subtract(&mut self, other: &Self) {
        self.x.subtract(&other.x);
        self.y.subtract(&other.y);
        self.sum_wxy -= other.sum_wxy;
    }
}

impl std::ops::AddAssign<&Dbn2> for Dbn2 {
    fn add_assign(&mut self, other: &Dbn2) {
        self.add(other);
    }
}

impl std::ops::SubAssign<&Dbn2> for Dbn2 {
    fn sub_assign(&mut self, other: &Dbn2) {
        self.subtract(other);
    }
}

impl std::ops::Add<&Dbn2> for Dbn2 {
    type Output = Dbn2;
    fn add(mut self, other: &Dbn2) -> Dbn2 {
        Dbn2::add(&mut self, other);
        self
    }
}

impl std::ops::Sub<&Dbn2> for Dbn2 {
    type Output = Dbn2;
    fn sub(mut self, other: &Dbn2) -> Dbn2 {
        Dbn2::subtract(&mut self, other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dbn2 {
        let mut d = Dbn2::new();
        d.fill(1.0, 10.0, 1.0);
        d.fill(2.0, 20.0, 2.0);
        d.fill(3.0, 30.0, 0.5);
        d
    }

    #[test]
    fn fill_accumulates_cross_term() {
        let d = sample();
        assert_eq!(d.num_fills(), 3);
        assert_eq!(d.sum_w(), 3.5);
        // 1*1*10 + 2*2*20 + 0.5*3*30
        assert_eq!(d.sum_wxy(), 10.0 + 80.0 + 45.0);
    }

    #[test]
    fn marginals_agree_with_direct_1d_fills() {
        let d = sample();
        let mut x = Dbn1::new();
        x.fill(1.0, 1.0);
        x.fill(2.0, 2.0);
        x.fill(3.0, 0.5);
        assert_eq!(d.transform_x(), x);
        assert_eq!(d.x_mean().unwrap(), x.mean().unwrap());
    }

    #[test]
    fn flip_swaps_axes() {
        let mut d = sample();
        let (mx, my) = (d.x_mean().unwrap(), d.y_mean().unwrap());
        d.flip_xy();
        assert_eq!(d.x_mean().unwrap(), my);
        assert_eq!(d.y_mean().unwrap(), mx);
        // the cross term is symmetric under the flip
        assert_eq!(d.sum_wxy(), sample().sum_wxy());
    }

    #[test]
    fn scale_x_touches_only_x_moments() {
        let mut d = sample();
        let (wy, wxy) = (d.sum_wy(), d.sum_wxy());
        d.scale_x(3.0);
        assert_eq!(d.sum_wy(), wy);
        assert_eq!(d.sum_wxy(), 3.0 * wxy);
        assert_eq!(d.sum_w(), 3.5);
    }

    #[test]
    fn scale_w_scales_cross_term_linearly() {
        let mut d = sample();
        let wxy = d.sum_wxy();
        d.scale_w(2.0);
        assert_eq!(d.sum_wxy(), 2.0 * wxy);
    }

    #[test]
    fn add_then_subtract_recovers() {
        let a = sample();
        let mut b = Dbn2::new();
        b.fill(-1.0, 5.0, 4.0);

        let mut c = a;
        c.add(&b);
        c.subtract(&b);
        assert_eq!(c.sum_w(), a.sum_w());
        assert_eq!(c.sum_wxy(), a.sum_wxy());
        assert_eq!(c.sum_wy2(), a.sum_wy2());
    }

    #[test]
    fn from_raw_round_trip() {
        let d = sample();
        let r = Dbn2::from_raw(
            d.num_fills(),
            d.sum_w(),
            d.sum_w2(),
            d.sum_wx(),
            d.sum_wx2(),
            d.sum_wy(),
            d.sum_wy2(),
            d.sum_wxy(),
        );
        assert_eq!(d, r);
    }
}
