//! Dimension-3 distribution: running weighted moments of an (x, y, z) triple.

use hx_core::Result;
use serde::{Deserialize, Serialize};

use crate::dbn1::Dbn1;

/// Running weighted moments of a 3D sampled quantity.
///
/// Marginal moments live in three [`Dbn1`] sub-distributions; the pair and
/// triple cross-terms (`Σwxy`, `Σwxz`, `Σwyz`, `Σwxyz`) are stored flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dbn3 {
    x: Dbn1,
    y: Dbn1,
    z: Dbn1,
    sum_wxy: f64,
    sum_wxz: f64,
    sum_wyz: f64,
    sum_wxyz: f64,
}

impl Dbn3 {
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
        sum_wz: f64,
        sum_wz2: f64,
        sum_wxy: f64,
        sum_wxz: f64,
        sum_wyz: f64,
        sum_wxyz: f64,
    ) -> Self {
        Self {
            x: Dbn1::from_raw(n_fills, sum_w, sum_w2, sum_wx, sum_wx2),
            y: Dbn1::from_raw(n_fills, sum_w, sum_w2, sum_wy, sum_wy2),
            z: Dbn1::from_raw(n_fills, sum_w, sum_w2, sum_wz, sum_wz2),
            sum_wxy,
            sum_wxz,
            sum_wyz,
            sum_wxyz,
        }
    }

    /// Contribute a sample at `(x, y, z)` with the given weight.
    pub fn fill(&mut self, x: f64, y: f64, z: f64, weight: f64) {
        self.x.fill(x, weight);
        self.y.fill(y, weight);
        self.z.fill(z, weight);
        self.sum_wxy += weight * x * y;
        self.sum_wxz += weight * x * z;
        self.sum_wyz += weight * y * z;
        self.sum_wxyz += weight * x * y * z;
    }

    /// Reset to the unfilled state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rescale as if every fill weight had been multiplied by `factor`.
    pub fn scale_w(&mut self, factor: f64) {
        self.x.scale_w(factor);
        self.y.scale_w(factor);
        self.z.scale_w(factor);
        self.sum_wxy *= factor;
        self.sum_wxz *= factor;
        self.sum_wyz *= factor;
        self.sum_wxyz *= factor;
    }

    /// Rescale the x coordinate by `factor`.
    pub fn scale_x(&mut self, factor: f64) {
        self.x.scale_x(factor);
        self.sum_wxy *= factor;
        self.sum_wxz *= factor;
        self.sum_wxyz *= factor;
    }

    /// Rescale the y coordinate by `factor`.
    pub fn scale_y(&mut self, factor: f64) {
        self.y.scale_x(factor);
        self.sum_wxy *= factor;
        self.sum_wyz *= factor;
        self.sum_wxyz *= factor;
    }

    /// Rescale the z coordinate by `factor`.
    pub fn scale_z(&mut self, factor: f64) {
        self.z.scale_x(factor);
        self.sum_wxz *= factor;
        self.sum_wyz *= factor;
        self.sum_wxyz *= factor;
    }

    /// Rescale the x and y coordinates.
    pub fn scale_xy(&mut self, fx: f64, fy: f64) {
        self.scale_x(fx);
        self.scale_y(fy);
    }

    /// Rescale all three coordinates.
    pub fn scale_xyz(&mut self, fx: f64, fy: f64, fz: f64) {
        self.scale_x(fx);
        self.scale_y(fy);
        self.scale_z(fz);
    }

    /// Swap the roles of the x and y axes without refilling.
    pub fn flip_xy(&mut self) {
        std::mem::swap(&mut self.x, &mut self.y);
        std::mem::swap(&mut self.sum_wxz, &mut self.sum_wyz);
    }

    /// Swap the roles of the x and z axes without refilling.
    pub fn flip_xz(&mut self) {
        std::mem::swap(&mut self.x, &mut self.z);
        std::mem::swap(&mut self.sum_wxy, &mut self.sum_wyz);
    }

    /// Swap the roles of the y and z axes without refilling.
    pub fn flip_yz(&mut self) {
        std::mem::swap(&mut self.y, &mut self.z);
        std::mem::swap(&mut self.sum_wxy, &mut self.sum_wxz);
    }

    /// Extract the 1D marginal distribution along x.
    pub fn transform_x(&self) -> Dbn1 {
        self.x
    }

    /// Extract the 1D marginal distribution along y.
    pub fn transform_y(&self) -> Dbn1 {
        self.y
    }

    /// Extract the 1D marginal distribution along z.
    pub fn transform_z(&self) -> Dbn1 {
        self.z
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

    /// Sum of `w·z`.
    pub fn sum_wz(&self) -> f64 {
        self.z.sum_wx()
    }

    /// Sum of `w·z²`.
    pub fn sum_wz2(&self) -> f64 {
        self.z.sum_wx2()
    }

    /// Sum of `w·x·y`.
    pub fn sum_wxy(&self) -> f64 {
        self.sum_wxy
    }

    /// Sum of `w·x·z`.
    pub fn sum_wxz(&self) -> f64 {
        self.sum_wxz
    }

    /// Sum of `w·y·z`.
    pub fn sum_wyz(&self) -> f64 {
        self.sum_wyz
    }

    /// Sum of `w·x·y·z`.
    pub fn sum_wxyz(&self) -> f64 {
        self.sum_wxyz
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

    /// Weighted z mean.
    pub fn z_mean(&self) -> Result<f64> {
        self.z.mean()
    }

    /// Weighted x variance.
    pub fn x_variance(&self) -> Result<f64> {
        self.x.variance()
    }

    /// Weighted y variance.
    pub fn y_variance(&self) -> Result<f64> {
        self.y.variance()
    }

    /// Weighted z variance.
    pub fn z_variance(&self) -> Result<f64> {
        self.z.variance()
    }

    /// Weighted x standard deviation.
    pub fn x_std_dev(&self) -> Result<f64> {
        self.x.std_dev()
    }

    /// Weighted y standard deviation.
    pub fn y_std_dev(&self) -> Result<f64> {
        self.y.std_dev()
    }

    /// Weighted z standard deviation.
    pub fn z_std_dev(&self) -> Result<f64> {
        self.z.std_dev()
    }

    /// Weighted standard error on the x mean.
    pub fn x_std_err(&self) -> Result<f64> {
        self.x.std_err()
    }

    /// Weighted standard error on the y mean.
    pub fn y_std_err(&self) -> Result<f64> {
        self.y.std_err()
    }

    /// Weighted standard error on the z mean.
    pub fn z_std_err(&self) -> Result<f64> {
        self.z.std_err()
    }

    /// Termwise addition of another distribution's running sums.
    pub fn add(&mut self, other: &Self) {
        self.x.add(&other.x);
        self.y.add(&other.y);
        self.z.add(&other.z);
        self.sum_wxy += other.sum_wxy;
        self.sum_wxz += other.sum_wxz;
        self.sum_wyz += other.sum_wyz;
        self.sum_wxyz += other.sum_wxyz;
    }

    /// Termwise subtraction of another distribution's running sums.
    pub fn subtract(&mut self, other: &Self) {
        self.x.subtract(&other.x);
        self.y.subtract(&other.y);
        self.z.subtract(&other.z);
        self.sum_wxy -= other.sum_wxy;
        self.sum_wxz -= other.sum_wxz;
        self.sum_wyz -= other.sum_wyz;
        self.sum_wxyz -= other.sum_wxyz;
    }
}

impl std::ops::AddAssign<&Dbn3> for Dbn3 {
    fn add_assign(&mut self, other: &Dbn3) {
        self.add(other);
    }
}

impl std::ops::SubAssign<&Dbn3> for Dbn3 {
    fn sub_assign(&mut self, other: &Dbn3) {
        self.subtract(other);
    }
}

impl std::ops::Add<&Dbn3> for Dbn3 {
    type Output = Dbn3;
    fn add(mut self, other: &Dbn3) -> Dbn3 {
        Dbn3::add(&mut self, other);
        self
    }
}

impl std::ops::Sub<&Dbn3> for Dbn3 {
    type Output = Dbn3;
    fn sub(mut self, other: &Dbn3) -> Dbn3 {
        Dbn3::subtract(&mut self, other);
        self
    }
}
