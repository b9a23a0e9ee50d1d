//! Gap-tolerant 1D binning axis.
//!
//! An axis owns a sorted sequence of non-overlapping bins (gaps are
//! allowed), three summary distributions (total, underflow, overflow) and
//! a lookup structure rebuilt after every structural change: a
//! [`BinSearcher`] over the cut list plus an indirection table mapping
//! searcher cells to bin indices, with gap cells marked `-1`.
//!
//! Structural mutations validate on a scratch copy and commit only on
//! success, so a rejected mutation leaves the axis exactly as it was.

use hx_core::{fuzzy_eq, linspace, Error, Result};
use log::debug;

use crate::bin1d::Bin1D;
use crate::dbn1::Dbn1;
use crate::fill::{Distribution, Fill1};
use crate::searcher::BinSearcher;

/// Relative tolerance for classifying the joint between two sorted bins
/// as contiguous, a gap, or an overlap.
const REL_EPS: f64 = 1e-10;

/// A sorted, gap-tolerant axis of [`Bin1D`]s with flow accounting.
///
/// The first fill locks the axis: bin-adding mutations then fail with
/// [`Error::Locked`] so accumulated statistics cannot be silently
/// misbinned. Erasing, merging and rebinning remain available on a
/// locked axis, since they only coarsen what was already filled.
#[derive(Debug, Clone)]
pub struct Axis1D<D> {
    bins: Vec<Bin1D<D>>,
    total: D,
    underflow: D,
    overflow: D,
    searcher: BinSearcher,
    /// Searcher cell to bin index; `-1` marks a gap cell.
    indexes: Vec<i64>,
    locked: bool,
}

impl<D: Fill1> Axis1D<D> {
    /// New contiguous axis from a strictly increasing edge list.
    ///
    /// Fails with [`Error::Range`] on fewer than two edges or any
    /// non-increasing pair.
    pub fn new(edges: &[f64]) -> Result<Self> {
        Self::from_bins(edge_run(edges)?)
    }

    /// New axis of `n_bins` equal-width bins covering `[lower, upper]`.
    pub fn with_range(n_bins: usize, lower: f64, upper: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Range("axis needs at least one bin".into()));
        }
        if !(lower < upper) {
            return Err(Error::Range(format!(
                "axis range must be increasing, got [{lower}, {upper}]"
            )));
        }
        Self::new(&linspace(n_bins, lower, upper))
    }

    /// New axis from pre-built bins, which may leave gaps but must not
    /// overlap.
    pub fn from_bins(bins: Vec<Bin1D<D>>) -> Result<Self> {
        Self::from_raw(bins, D::default(), D::default(), D::default(), false)
    }

    /// Rebuild an axis from persisted state.
    pub fn from_raw(
        bins: Vec<Bin1D<D>>,
        total: D,
        underflow: D,
        overflow: D,
        locked: bool,
    ) -> Result<Self> {
        let (bins, searcher, indexes) = rebuild(bins)?;
        Ok(Self { bins, total, underflow, overflow, searcher, indexes, locked })
    }

    /// Contribute a sample at `x`, locking the axis.
    ///
    /// The total distribution always receives the fill; exactly one of
    /// {bin, underflow, overflow, nothing-else} receives it too, the
    /// last when `x` lands in a gap. Returns the hit bin's index, if
    /// any. NaN coordinates fail with [`Error::Range`] before anything
    /// is recorded; infinite coordinates land in the flows.
    pub fn fill(&mut self, x: f64, extra: D::Extra, weight: f64) -> Result<Option<usize>> {
        if x.is_nan() {
            return Err(Error::Range("cannot fill with a NaN coordinate".into()));
        }
        self.locked = true;
        self.total.fill1(x, extra, weight);
        let q = self.searcher.index(x);
        if q == 0 {
            self.underflow.fill1(x, extra, weight);
            Ok(None)
        } else if q >= self.searcher.n_edges() {
            self.overflow.fill1(x, extra, weight);
            Ok(None)
        } else {
            match self.indexes[q] {
                -1 => Ok(None),
                i => {
                    let i = i as usize;
                    self.bins[i].fill(x, extra, weight);
                    Ok(Some(i))
                }
            }
        }
    }

    /// Index of the bin containing `x`, or `None` for flows and gaps.
    pub fn bin_index_at(&self, x: f64) -> Option<usize> {
        let q = self.searcher.index(x);
        if q == 0 || q >= self.searcher.n_edges() {
            return None;
        }
        match self.indexes[q] {
            -1 => None,
            i => Some(i as usize),
        }
    }

    /// The bin containing `x`, failing with [`Error::Range`] when `x`
    /// falls outside every bin.
    pub fn bin_by_coord(&self, x: f64) -> Result<&Bin1D<D>> {
        self.bin_index_at(x)
            .map(|i| &self.bins[i])
            .ok_or_else(|| Error::Range(format!("no bin covers x = {x}")))
    }

    /// The bin at sorted position `i`.
    pub fn bin(&self, i: usize) -> Result<&Bin1D<D>> {
        self.bins.get(i).ok_or_else(|| self.index_error(i))
    }

    /// Mutable access to the bin at sorted position `i`. Edges are not
    /// reachable through a bin borrow, so the lookup tables stay valid.
    pub fn bin_mut(&mut self, i: usize) -> Result<&mut Bin1D<D>> {
        if i >= self.bins.len() {
            return Err(self.index_error(i));
        }
        Ok(&mut self.bins[i])
    }

    /// All bins in sorted order.
    pub fn bins(&self) -> &[Bin1D<D>] {
        &self.bins
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Lowest covered edge.
    pub fn low_edge(&self) -> Result<f64> {
        self.bins
            .first()
            .map(Bin1D::x_low)
            .ok_or_else(|| Error::Range("edge requested of an empty axis".into()))
    }

    /// Highest covered edge.
    pub fn high_edge(&self) -> Result<f64> {
        self.bins
            .last()
            .map(Bin1D::x_high)
            .ok_or_else(|| Error::Range("edge requested of an empty axis".into()))
    }

    /// Summary distribution of every fill, flows and gap fills included.
    pub fn total_dbn(&self) -> &D {
        &self.total
    }

    /// Mutable total distribution.
    pub fn total_dbn_mut(&mut self) -> &mut D {
        &mut self.total
    }

    /// Distribution of fills below the lowest edge.
    pub fn underflow(&self) -> &D {
        &self.underflow
    }

    /// Mutable underflow distribution.
    pub fn underflow_mut(&mut self) -> &mut D {
        &mut self.underflow
    }

    /// Distribution of fills at or above the highest edge.
    pub fn overflow(&self) -> &D {
        &self.overflow
    }

    /// Mutable overflow distribution.
    pub fn overflow_mut(&mut self) -> &mut D {
        &mut self.overflow
    }

    /// True once the axis has been filled.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Add one bin. Fails with [`Error::Locked`] on a filled axis and
    /// [`Error::Range`] when the new bin overlaps an existing one; a
    /// failed add leaves the axis untouched.
    pub fn add_bin(&mut self, xlow: f64, xhigh: f64) -> Result<()> {
        self.check_unlocked("add_bin")?;
        let mut bins = self.bins.clone();
        bins.push(Bin1D::new(xlow, xhigh)?);
        self.commit(bins)
    }

    /// Add a contiguous run of bins from a strictly increasing edge
    /// list. Same lock and overlap rules as [`Axis1D::add_bin`].
    pub fn add_bins(&mut self, edges: &[f64]) -> Result<()> {
        self.check_unlocked("add_bins")?;
        let mut bins = self.bins.clone();
        bins.extend(edge_run(edges)?);
        self.commit(bins)
    }

    /// Remove the bin at position `i`, statistics included.
    ///
    /// Erasure is privileged: it works on a locked axis and preserves
    /// the lock state.
    pub fn erase_bin(&mut self, i: usize) -> Result<()> {
        if i >= self.bins.len() {
            return Err(self.index_error(i));
        }
        let mut bins = self.bins.clone();
        bins.remove(i);
        self.commit(bins)
    }

    /// Remove the bins at positions `from..=to` inclusive. Privileged
    /// like [`Axis1D::erase_bin`].
    pub fn erase_bins(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_span(from, to)?;
        let mut bins = self.bins.clone();
        bins.drain(from..=to);
        self.commit(bins)
    }

    /// Fold the bins at positions `from..=to` into one bin spanning
    /// their combined range, summing their statistics.
    ///
    /// Fails with [`Error::Range`] when the span is out of range or a
    /// gap lies strictly inside it (the folded bin would claim
    /// coordinates no source bin covered). Works on a locked axis.
    pub fn merge_bins(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_span(from, to)?;
        self.check_no_gap(from, to)?;
        let mut bins = self.bins.clone();
        let mut merged = bins[from].clone();
        for b in &bins[from + 1..=to] {
            merged.merge(b);
        }
        bins.splice(from..=to, [merged]);
        self.commit(bins)
    }

    /// Coarsen the axis by merging runs of `n` adjacent bins from the
    /// left; the final run may be shorter. Fails on a gap inside any
    /// run, with all runs before it already merged.
    pub fn rebin(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::Range("rebin factor must be at least 1".into()));
        }
        let mut m = 0;
        while m < self.bins.len() {
            let end = (m + n - 1).min(self.bins.len() - 1);
            if end > m {
                self.merge_bins(m, end)?;
            }
            m += 1;
        }
        Ok(())
    }

    /// Rescale the coordinate axis by `factor`: every edge and every
    /// x moment, summaries included. A negative factor mirrors the axis.
    pub fn scale_x(&mut self, factor: f64) -> Result<()> {
        if factor == 0.0 || !factor.is_finite() {
            return Err(Error::Range(format!("cannot scale an axis by {factor}")));
        }
        let mut bins = self.bins.clone();
        for b in &mut bins {
            b.scale_x(factor);
        }
        self.commit(bins)?;
        self.total.scale_x(factor);
        self.underflow.scale_x(factor);
        self.overflow.scale_x(factor);
        if factor < 0.0 {
            std::mem::swap(&mut self.underflow, &mut self.overflow);
        }
        Ok(())
    }

    /// Rescale all fill weights by `factor`, summaries included.
    pub fn scale_w(&mut self, factor: f64) {
        for b in &mut self.bins {
            b.scale_w(factor);
        }
        self.total.scale_w(factor);
        self.underflow.scale_w(factor);
        self.overflow.scale_w(factor);
    }

    /// Zero every statistic and release the lock, keeping the binning.
    pub fn reset(&mut self) {
        for b in &mut self.bins {
            b.reset();
        }
        self.total.reset();
        self.underflow.reset();
        self.overflow.reset();
        self.locked = false;
    }

    /// True when both axes have fuzzy-identical bin edges and the same
    /// gap pattern, so their statistics combine bin by bin.
    pub fn same_binning(&self, other: &Self) -> bool {
        self.bins.len() == other.bins.len()
            && self.indexes == other.indexes
            && self
                .bins
                .iter()
                .zip(&other.bins)
                .all(|(a, b)| fuzzy_eq(a.x_low(), b.x_low()) && fuzzy_eq(a.x_high(), b.x_high()))
    }

    /// Termwise-add another axis's statistics. Fails with
    /// [`Error::Logic`] unless the binnings match, leaving `self`
    /// untouched.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_same_binning(other, "add")?;
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            a.add(b)?;
        }
        self.total.add(&other.total);
        self.underflow.add(&other.underflow);
        self.overflow.add(&other.overflow);
        Ok(())
    }

    /// Termwise-subtract another axis's statistics, exactly reversing a
    /// previous [`Axis1D::add`] of the same axis.
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        self.check_same_binning(other, "subtract")?;
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            a.subtract(b)?;
        }
        self.total.subtract(&other.total);
        self.underflow.subtract(&other.underflow);
        self.overflow.subtract(&other.overflow);
        Ok(())
    }

    /// Whole-axis mean fill coordinate, from the total distribution
    /// (`include_flows`) or the sum of the in-range bins.
    pub fn mean(&self, include_flows: bool) -> Result<f64> {
        let d = self.fill_dbn(include_flows);
        if d.sum_w() == 0.0 {
            return Err(Error::LowStats("mean requested of an unfilled axis".into()));
        }
        Ok(d.sum_wx() / d.sum_w())
    }

    /// Whole-axis variance of the fill coordinate, as the population
    /// estimator `Σwx²/Σw − mean²`.
    pub fn variance(&self, include_flows: bool) -> Result<f64> {
        let d = self.fill_dbn(include_flows);
        if d.sum_w() == 0.0 {
            return Err(Error::LowStats("variance requested of an unfilled axis".into()));
        }
        let mean = d.sum_wx() / d.sum_w();
        Ok(d.sum_wx2() / d.sum_w() - mean * mean)
    }

    /// Whole-axis standard deviation of the fill coordinate.
    pub fn std_dev(&self, include_flows: bool) -> Result<f64> {
        Ok(self.variance(include_flows)?.sqrt())
    }

    fn fill_dbn(&self, include_flows: bool) -> Dbn1 {
        if include_flows {
            self.total.x_dbn()
        } else {
            let mut d = Dbn1::new();
            for b in &self.bins {
                d.add(&b.x_dbn());
            }
            d
        }
    }

    /// Swap in a candidate bin set; on validation failure nothing
    /// changes.
    fn commit(&mut self, bins: Vec<Bin1D<D>>) -> Result<()> {
        let (bins, searcher, indexes) = rebuild(bins)?;
        self.bins = bins;
        self.searcher = searcher;
        self.indexes = indexes;
        Ok(())
    }

    fn check_unlocked(&self, op: &str) -> Result<()> {
        if self.locked {
            return Err(Error::Locked(format!("cannot {op} on a filled axis")));
        }
        Ok(())
    }

    fn check_span(&self, from: usize, to: usize) -> Result<()> {
        if from > to || to >= self.bins.len() {
            return Err(Error::Range(format!(
                "bin span {from}..={to} invalid for an axis of {} bins",
                self.bins.len()
            )));
        }
        Ok(())
    }

    /// A gap strictly inside `from..=to` shows up as a `-1` cell between
    /// the two bins' cells in the indirection table.
    fn check_no_gap(&self, from: usize, to: usize) -> Result<()> {
        let q_from = self.cell_of(from);
        let q_to = self.cell_of(to);
        for q in q_from..=q_to {
            if self.indexes[q] == -1 {
                return Err(Error::Range(format!(
                    "cannot merge bins {from}..={to} across a gap"
                )));
            }
        }
        Ok(())
    }

    fn cell_of(&self, bin: usize) -> usize {
        self.indexes
            .iter()
            .position(|&v| v == bin as i64)
            .unwrap_or(0)
    }

    fn check_same_binning(&self, other: &Self, op: &str) -> Result<()> {
        if !self.same_binning(other) {
            return Err(Error::Logic(format!("cannot {op} axes with different binnings")));
        }
        Ok(())
    }

    fn index_error(&self, i: usize) -> Error {
        Error::Range(format!("bin index {i} out of range for an axis of {} bins", self.bins.len()))
    }
}

/// Contiguous bins from a strictly increasing edge list.
fn edge_run<D: Fill1>(edges: &[f64]) -> Result<Vec<Bin1D<D>>> {
    if edges.len() < 2 {
        return Err(Error::Range("an edge list needs at least two edges".into()));
    }
    edges.windows(2).map(|w| Bin1D::new(w[0], w[1])).collect()
}

type Rebuilt<D> = (Vec<Bin1D<D>>, BinSearcher, Vec<i64>);

/// Validate a candidate bin set and build its lookup tables.
///
/// Bins are sorted by low edge; each joint between neighbours is
/// classified by the relative difference `(low - last_high) / width`:
/// below `-REL_EPS` is an overlap and rejects the whole set, above
/// `+REL_EPS` opens a gap cell, anything in between is contiguous.
fn rebuild<D: Fill1>(mut bins: Vec<Bin1D<D>>) -> Result<Rebuilt<D>> {
    bins.sort_by(|a, b| a.x_low().total_cmp(&b.x_low()));

    let mut cuts: Vec<f64> = Vec::with_capacity(2 * bins.len());
    let mut cell_bins: Vec<(usize, usize)> = Vec::with_capacity(bins.len());
    let mut last_high = f64::NEG_INFINITY;
    for (i, b) in bins.iter().enumerate() {
        if cuts.is_empty() {
            cuts.push(b.x_low());
        } else {
            let reldiff = (b.x_low() - last_high) / b.x_width();
            if reldiff < -REL_EPS {
                return Err(Error::Range(format!(
                    "bin [{}, {}) overlaps the previous bin ending at {}",
                    b.x_low(),
                    b.x_high(),
                    last_high
                )));
            }
            if reldiff > REL_EPS {
                cuts.push(b.x_low());
            }
        }
        cuts.push(b.x_high());
        cell_bins.push((cuts.len() - 1, i));
        last_high = b.x_high();
    }

    let mut indexes = vec![-1i64; cuts.len() + 1];
    for (cell, bin) in cell_bins {
        indexes[cell] = bin as i64;
    }
    let searcher = BinSearcher::new(&cuts);
    debug!(
        "axis rebuilt: {} bins over {} cuts, {} gap cells",
        bins.len(),
        cuts.len(),
        indexes[1..cuts.len().max(1)].iter().filter(|&&v| v == -1).count()
    );
    Ok((bins, searcher, indexes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbn1::Dbn1;
    use crate::dbn2::Dbn2;

    fn histo(edges: &[f64]) -> Axis1D<Dbn1> {
        Axis1D::new(edges).unwrap()
    }

    #[test]
    fn construction_rejects_bad_edges() {
        assert!(matches!(Axis1D::<Dbn1>::new(&[1.0]), Err(Error::Range(_))));
        assert!(matches!(Axis1D::<Dbn1>::new(&[0.0, 0.0, 1.0]), Err(Error::Range(_))));
        assert!(matches!(Axis1D::<Dbn1>::new(&[0.0, 2.0, 1.0]), Err(Error::Range(_))));
        assert!(matches!(Axis1D::<Dbn1>::with_range(0, 0.0, 1.0), Err(Error::Range(_))));
        assert!(matches!(Axis1D::<Dbn1>::with_range(5, 1.0, 1.0), Err(Error::Range(_))));
    }

    #[test]
    fn with_range_has_exact_outer_edges() {
        let a = Axis1D::<Dbn1>::with_range(7, 0.1, 0.8).unwrap();
        assert_eq!(a.num_bins(), 7);
        assert_eq!(a.low_edge().unwrap(), 0.1);
        assert_eq!(a.high_edge().unwrap(), 0.8);
    }

    #[test]
    fn fill_routes_to_bins_and_flows() {
        let mut a = histo(&linspace(100, 0.0, 100.0));
        assert_eq!(a.fill(0.5, (), 2.0).unwrap(), Some(0));
        let b = a.bin(0).unwrap();
        assert_eq!(b.sum_w(), 2.0);
        assert_eq!(b.sum_w2(), 4.0);

        assert_eq!(a.fill(-1.0, (), 1.0).unwrap(), None);
        assert_eq!(a.fill(100.0, (), 1.0).unwrap(), None);
        assert_eq!(a.underflow().sum_w(), 1.0);
        assert_eq!(a.overflow().sum_w(), 1.0);
        assert_eq!(a.total_dbn().num_fills(), 3);
    }

    #[test]
    fn low_edge_is_inclusive_high_exclusive() {
        let mut a = histo(&[0.0, 1.0, 2.0]);
        assert_eq!(a.fill(1.0, (), 1.0).unwrap(), Some(1));
        assert_eq!(a.fill(2.0, (), 1.0).unwrap(), None);
        assert_eq!(a.overflow().num_fills(), 1);
    }

    #[test]
    fn nan_fill_is_rejected_before_recording() {
        let mut a = histo(&[0.0, 1.0]);
        assert!(matches!(a.fill(f64::NAN, (), 1.0), Err(Error::Range(_))));
        assert_eq!(a.total_dbn().num_fills(), 0);
        assert!(!a.locked());
    }

    #[test]
    fn gap_fill_updates_total_only() {
        let mut bins = vec![
            Bin1D::<Dbn1>::new(0.0, 1.0).unwrap(),
            Bin1D::<Dbn1>::new(2.0, 3.0).unwrap(),
        ];
        bins.reverse();
        let mut a = Axis1D::from_bins(bins).unwrap();
        assert_eq!(a.fill(1.5, (), 1.0).unwrap(), None);
        assert_eq!(a.total_dbn().num_fills(), 1);
        assert_eq!(a.underflow().num_fills(), 0);
        assert_eq!(a.overflow().num_fills(), 0);
        assert_eq!(a.bin(0).unwrap().num_fills() + a.bin(1).unwrap().num_fills(), 0);
        assert!(matches!(a.bin_by_coord(1.5), Err(Error::Range(_))));
        assert_eq!(a.bin_by_coord(2.5).unwrap().x_low(), 2.0);
    }

    #[test]
    fn overlapping_bins_rejected_and_axis_unchanged() {
        let mut a = histo(&[0.0, 1.0, 2.0]);
        let err = a.add_bin(0.5, 1.5);
        assert!(matches!(err, Err(Error::Range(_))));
        assert_eq!(a.num_bins(), 2);
        assert_eq!(a.fill(0.5, (), 1.0).unwrap(), Some(0));
    }

    #[test]
    fn fill_locks_against_adding() {
        let mut a = histo(&[0.0, 1.0]);
        a.add_bin(1.0, 2.0).unwrap();
        a.fill(0.5, (), 1.0).unwrap();
        assert!(a.locked());
        assert!(matches!(a.add_bin(2.0, 3.0), Err(Error::Locked(_))));
        assert!(matches!(a.add_bins(&[2.0, 3.0, 4.0]), Err(Error::Locked(_))));
    }

    #[test]
    fn erase_is_privileged_and_keeps_the_lock() {
        let mut a = histo(&[0.0, 1.0, 2.0, 3.0]);
        a.fill(0.5, (), 1.0).unwrap();
        a.erase_bin(1).unwrap();
        assert_eq!(a.num_bins(), 2);
        assert!(a.locked());
        // the erased range is now a hole, not a flow region
        assert_eq!(a.fill(1.5, (), 1.0).unwrap(), None);
        assert_eq!(a.overflow().num_fills(), 0);
        assert_eq!(a.underflow().num_fills(), 0);
        assert_eq!(a.fill(2.5, (), 1.0).unwrap(), Some(1));
    }

    #[test]
    fn erase_bins_drops_a_range() {
        let mut a = histo(&linspace(10, 0.0, 10.0));
        a.erase_bins(3, 6).unwrap();
        assert_eq!(a.num_bins(), 6);
        assert!(matches!(a.erase_bins(4, 7), Err(Error::Range(_))));
    }

    #[test]
    fn merge_bins_folds_statistics() {
        let mut a = histo(&[0.0, 1.0, 2.0, 4.0]);
        a.fill(0.5, (), 1.0).unwrap();
        a.fill(1.5, (), 2.0).unwrap();
        a.fill(3.0, (), 4.0).unwrap();
        a.merge_bins(0, 1).unwrap();
        assert_eq!(a.num_bins(), 2);
        let merged = a.bin(0).unwrap();
        assert_eq!((merged.x_low(), merged.x_high()), (0.0, 2.0));
        assert_eq!(merged.sum_w(), 3.0);
        assert_eq!(merged.num_fills(), 2);
        assert_eq!(a.bin(1).unwrap().sum_w(), 4.0);
    }

    #[test]
    fn merge_across_a_gap_fails() {
        let mut a = histo(&[0.0, 1.0, 2.0, 3.0]);
        a.erase_bin(1).unwrap();
        assert!(matches!(a.merge_bins(0, 1), Err(Error::Range(_))));
        assert_eq!(a.num_bins(), 2);
    }

    #[test]
    fn rebin_merges_runs_with_a_short_tail() {
        let mut a = histo(&linspace(7, 0.0, 7.0));
        for i in 0..7 {
            a.fill(i as f64 + 0.5, (), 1.0).unwrap();
        }
        a.rebin(3).unwrap();
        assert_eq!(a.num_bins(), 3);
        assert_eq!(a.bin(0).unwrap().sum_w(), 3.0);
        assert_eq!(a.bin(1).unwrap().sum_w(), 3.0);
        assert_eq!(a.bin(2).unwrap().sum_w(), 1.0);
        assert_eq!((a.bin(2).unwrap().x_low(), a.bin(2).unwrap().x_high()), (6.0, 7.0));
    }

    #[test]
    fn whole_axis_mean_and_variance() {
        let mut a = histo(&linspace(100, 0.0, 100.0));
        a.fill(0.5, (), 2.0).unwrap();
        a.fill(10.0, (), 1.0).unwrap();
        assert!((a.mean(false).unwrap() - 11.0 / 3.0).abs() < 1e-12);
        assert!((a.variance(false).unwrap() - 20.0556).abs() < 1e-3);

        // an overflow fill moves the flow-inclusive statistics only
        a.fill(1000.0, (), 1.0).unwrap();
        assert!((a.mean(false).unwrap() - 11.0 / 3.0).abs() < 1e-12);
        assert!((a.mean(true).unwrap() - 1011.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn add_then_subtract_recovers_everything() {
        let mut a = histo(&[0.0, 1.0, 2.0, 4.0]);
        a.fill(0.5, (), 2.0).unwrap();
        a.fill(3.0, (), 0.25).unwrap();
        let mut b = histo(&[0.0, 1.0, 2.0, 4.0]);
        b.fill(1.5, (), 1.0).unwrap();
        b.fill(-1.0, (), 5.0).unwrap();

        let before: Vec<f64> = a.bins().iter().map(Bin1D::sum_w).collect();
        let total_before = a.total_dbn().sum_w();
        a.add(&b).unwrap();
        a.subtract(&b).unwrap();
        let after: Vec<f64> = a.bins().iter().map(Bin1D::sum_w).collect();
        assert_eq!(before, after);
        assert_eq!(a.total_dbn().sum_w(), total_before);
        assert_eq!(a.underflow().sum_w(), 0.0);
    }

    #[test]
    fn combining_different_binnings_fails() {
        let mut a = histo(&[0.0, 1.0, 2.0]);
        let b = histo(&[0.0, 1.0, 3.0]);
        assert!(matches!(a.add(&b), Err(Error::Logic(_))));
        let c = histo(&[0.0, 1.0, 2.0, 3.0]);
        assert!(matches!(a.subtract(&c), Err(Error::Logic(_))));
    }

    #[test]
    fn gap_pattern_is_part_of_binning_identity() {
        let mut a = histo(&[0.0, 1.0, 2.0, 3.0]);
        a.erase_bin(1).unwrap();
        let b = Axis1D::from_bins(vec![
            Bin1D::<Dbn1>::new(0.0, 1.0).unwrap(),
            Bin1D::<Dbn1>::new(2.0, 3.0).unwrap(),
        ])
        .unwrap();
        assert!(a.same_binning(&b));
        let c = histo(&[0.0, 1.0, 2.0]);
        assert!(!a.same_binning(&c));
    }

    #[test]
    fn scale_x_moves_bins_and_flows() {
        let mut a = histo(&[0.0, 1.0, 2.0]);
        a.fill(0.5, (), 1.0).unwrap();
        a.fill(-1.0, (), 1.0).unwrap();
        a.scale_x(2.0).unwrap();
        assert_eq!(a.high_edge().unwrap(), 4.0);
        assert_eq!(a.bin_index_at(1.0), Some(0));
        assert!((a.underflow().x_dbn().mean().unwrap() + 2.0).abs() < 1e-12);
        assert!(matches!(a.scale_x(0.0), Err(Error::Range(_))));
    }

    #[test]
    fn negative_scale_mirrors_the_axis() {
        let mut a = histo(&[0.0, 1.0, 2.0]);
        a.fill(-1.0, (), 1.0).unwrap();
        a.scale_x(-1.0).unwrap();
        assert_eq!(a.low_edge().unwrap(), -2.0);
        assert_eq!(a.high_edge().unwrap(), 0.0);
        // the old underflow is now above the axis
        assert_eq!(a.overflow().num_fills(), 1);
        assert_eq!(a.bin_index_at(-1.5), Some(0));
    }

    #[test]
    fn reset_clears_statistics_and_lock() {
        let mut a = histo(&[0.0, 1.0]);
        a.fill(0.5, (), 1.0).unwrap();
        a.reset();
        assert!(!a.locked());
        assert_eq!(a.total_dbn().num_fills(), 0);
        assert_eq!(a.bin(0).unwrap().sum_w(), 0.0);
        a.add_bin(1.0, 2.0).unwrap();
    }

    #[test]
    fn profile_axis_carries_sampled_means() {
        let mut a = Axis1D::<Dbn2>::new(&[0.0, 1.0, 2.0]).unwrap();
        a.fill(0.5, 10.0, 1.0).unwrap();
        a.fill(0.6, 30.0, 1.0).unwrap();
        a.fill(1.5, 7.0, 2.0).unwrap();
        assert_eq!(a.bin(0).unwrap().dbn().y_mean().unwrap(), 20.0);
        assert_eq!(a.bin(1).unwrap().dbn().y_mean().unwrap(), 7.0);
    }

    #[test]
    fn from_raw_restores_lock_and_summaries() {
        let mut src = histo(&[0.0, 1.0, 2.0]);
        src.fill(0.5, (), 1.5).unwrap();
        src.fill(-3.0, (), 1.0).unwrap();
        let restored = Axis1D::from_raw(
            src.bins().to_vec(),
            src.total_dbn().clone(),
            src.underflow().clone(),
            src.overflow().clone(),
            src.locked(),
        )
        .unwrap();
        assert!(restored.locked());
        assert_eq!(restored.total_dbn(), src.total_dbn());
        assert_eq!(restored.bin(0).unwrap(), src.bin(0).unwrap());
    }
}
