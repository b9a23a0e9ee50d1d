//! Static-dispatch seam between axes and the statistic their bins carry.
//!
//! An axis does not care whether a fill carries just the binning
//! coordinate(s) (histogram statistic) or an extra sampled value (profile
//! statistic); these traits let `Axis1D`/`Axis2D` be generic over that
//! choice and monomorphize, keeping the hot `fill` path free of dynamic
//! dispatch.

use crate::dbn1::Dbn1;
use crate::dbn2::Dbn2;
use crate::dbn3::Dbn3;

/// Dimension-independent surface of a running weighted distribution.
pub trait Distribution: Clone + Default + PartialEq + std::fmt::Debug {
    /// Number of times `fill` was called, ignoring weights.
    fn num_fills(&self) -> u64;
    /// Sum of weights.
    fn sum_w(&self) -> f64;
    /// Sum of squared weights.
    fn sum_w2(&self) -> f64;
    /// Effective number of entries, `(Σw)² / Σw²`.
    fn eff_num_entries(&self) -> f64;
    /// Reset to the unfilled state.
    fn reset(&mut self);
    /// Rescale as if every fill weight had been multiplied by `factor`.
    fn scale_w(&mut self, factor: f64);
    /// Termwise addition of another distribution's running sums.
    fn add(&mut self, other: &Self);
    /// Termwise subtraction of another distribution's running sums.
    fn subtract(&mut self, other: &Self);
}

/// A statistic fillable at one binning coordinate.
///
/// `Extra` is the non-binning payload each fill carries: `()` for a plain
/// histogram statistic ([`Dbn1`]), the sampled y value for a profile
/// statistic ([`Dbn2`]).
pub trait Fill1: Distribution {
    /// Non-binning payload carried by each fill.
    type Extra: Copy + std::fmt::Debug;

    /// Contribute a sample at binning coordinate `x`.
    fn fill1(&mut self, x: f64, extra: Self::Extra, weight: f64);

    /// The marginal distribution along the binning axis.
    fn x_dbn(&self) -> Dbn1;

    /// Rescale the binning coordinate by `factor`.
    fn scale_x(&mut self, factor: f64);
}

/// A statistic fillable at two binning coordinates.
///
/// `Extra` is `()` for a plain 2D histogram statistic ([`Dbn2`]) and the
/// sampled z value for a 2D profile statistic ([`Dbn3`]).
pub trait Fill2: Distribution {
    /// Non-binning payload carried by each fill.
    type Extra: Copy + std::fmt::Debug;

    /// Contribute a sample at binning coordinates `(x, y)`.
    fn fill2(&mut self, x: f64, y: f64, extra: Self::Extra, weight: f64);

    /// The marginal distribution along the binning x axis.
    fn x_dbn(&self) -> Dbn1;

    /// The marginal distribution along the binning y axis.
    fn y_dbn(&self) -> Dbn1;

    /// Rescale the binning x coordinate by `factor`.
    fn scale_x(&mut self, factor: f64);

    /// Rescale the binning y coordinate by `factor`.
    fn scale_y(&mut self, factor: f64);
}

macro_rules! impl_distribution {
    ($ty:ty) => {
        impl Distribution for $ty {
            fn num_fills(&self) -> u64 {
                <$ty>::num_fills(self)
            }
            fn sum_w(&self) -> f64 {
                <$ty>::sum_w(self)
            }
            fn sum_w2(&self) -> f64 {
                <$ty>::sum_w2(self)
            }
            fn eff_num_entries(&self) -> f64 {
                <$ty>::eff_num_entries(self)
            }
            fn reset(&mut self) {
                <$ty>::reset(self)
            }
            fn scale_w(&mut self, factor: f64) {
                <$ty>::scale_w(self, factor)
            }
            fn add(&mut self, other: &Self) {
                <$ty>::add(self, other)
            }
            fn subtract(&mut self, other: &Self) {
                <$ty>::subtract(self, other)
            }
        }
    };
}

impl_distribution!(Dbn1);
impl_distribution!(Dbn2);
impl_distribution!(Dbn3);

impl Fill1 for Dbn1 {
    type Extra = ();

    fn fill1(&mut self, x: f64, _extra: (), weight: f64) {
        self.fill(x, weight);
    }

    fn x_dbn(&self) -> Dbn1 {
        *self
    }

    fn scale_x(&mut self, factor: f64) {
        Dbn1::scale_x(self, factor);
    }
}

impl Fill1 for Dbn2 {
    type Extra = f64;

    fn fill1(&mut self, x: f64, y: f64, weight: f64) {
        self.fill(x, y, weight);
    }

    fn x_dbn(&self) -> Dbn1 {
        self.transform_x()
    }

    fn scale_x(&mut self, factor: f64) {
        Dbn2::scale_x(self, factor);
    }
}

impl Fill2 for Dbn2 {
    type Extra = ();

    fn fill2(&mut self, x: f64, y: f64, _extra: (), weight: f64) {
        self.fill(x, y, weight);
    }

    fn x_dbn(&self) -> Dbn1 {
        self.transform_x()
    }

    fn y_dbn(&self) -> Dbn1 {
        self.transform_y()
    }

    fn scale_x(&mut self, factor: f64) {
        Dbn2::scale_x(self, factor);
    }

    fn scale_y(&mut self, factor: f64) {
        Dbn2::scale_y(self, factor);
    }
}

impl Fill2 for Dbn3 {
    type Extra = f64;

    fn fill2(&mut self, x: f64, y: f64, z: f64, weight: f64) {
        self.fill(x, y, z, weight);
    }

    fn x_dbn(&self) -> Dbn1 {
        self.transform_x()
    }

    fn y_dbn(&self) -> Dbn1 {
        self.transform_y()
    }

    fn scale_x(&mut self, factor: f64) {
        Dbn3::scale_x(self, factor);
    }

    fn scale_y(&mut self, factor: f64) {
        Dbn3::scale_y(self, factor);
    }
}
