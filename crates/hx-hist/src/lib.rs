//! # hx-hist
//!
//! The hx binning-and-statistics engine: online weighted-moment
//! distributions, bins, the adaptive bin searcher, and gap-tolerant 1D/2D
//! axes that classify fills in near-constant time.
//!
//! Facade histogram types, plotting data types and the text-format
//! readers/writers live outside this crate; it exposes construction from
//! edges or ranges, `fill`, statistics accessors, structural mutation
//! (add/erase/merge/rebin) and exact combination operators.
//!
//! ## Example
//!
//! ```
//! use hx_hist::{Dbn1, HistoAxis1D};
//!
//! let mut axis = HistoAxis1D::new(&[0.0, 1.0, 2.0, 4.0]).unwrap();
//! axis.fill(0.5, (), 2.0).unwrap();
//! axis.fill(3.0, (), 1.0).unwrap();
//! assert_eq!(axis.bin(0).unwrap().sum_w(), 2.0);
//! assert_eq!(axis.total_dbn().num_fills(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod axis1d;
pub mod axis2d;
pub mod bin1d;
pub mod bin2d;
pub mod dbn0;
pub mod dbn1;
pub mod dbn2;
pub mod dbn3;
pub mod fill;
pub mod searcher;

pub use axis1d::Axis1D;
pub use axis2d::Axis2D;
pub use bin1d::Bin1D;
pub use bin2d::Bin2D;
pub use dbn0::Dbn0;
pub use dbn1::Dbn1;
pub use dbn2::Dbn2;
pub use dbn3::Dbn3;
pub use fill::{Distribution, Fill1, Fill2};
pub use searcher::BinSearcher;

/// 1D axis accumulating plain weighted-x statistics per bin.
pub type HistoAxis1D = Axis1D<Dbn1>;

/// 1D axis whose bins additionally carry a sampled y distribution
/// (profile statistic).
pub type ProfileAxis1D = Axis1D<Dbn2>;

/// 2D axis accumulating weighted-(x, y) statistics per bin.
pub type HistoAxis2D = Axis2D<Dbn2>;

/// 2D axis whose bins additionally carry a sampled z distribution
/// (profile statistic).
pub type ProfileAxis2D = Axis2D<Dbn3>;
