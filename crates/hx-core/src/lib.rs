//! # hx-core
//!
//! Shared foundation for the hx histogramming workspace: the typed error
//! taxonomy used by every crate, and the small numeric helpers (edge
//! generation, fuzzy float comparison) that the binning engine relies on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod math;

pub use error::{Error, Result};
pub use math::{fuzzy_eq, fuzzy_eq_tol, linspace};
