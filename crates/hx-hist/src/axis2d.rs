//! 2D binning axis over rectangular bins.
//!
//! Bins are axis-aligned rectangles that must not overlap but need not
//! tile a grid; holes are allowed. Classification uses a two-level
//! sorted lookup (x low edge, then y low edge within a column), scanned
//! right-to-left within width bounds so wide bins are still found, with
//! containment verified against the actual bin before a hit is
//! reported.
//!
//! Fills outside the covered bounding box land in one of eight
//! directional outflow buckets; fills inside the box but in a hole
//! update only the total distribution.

use hx_core::{fuzzy_eq, linspace, Error, Result};
use log::debug;

use crate::bin2d::Bin2D;
use crate::fill::{Distribution, Fill2};

/// Relative tolerance for overlap detection between rectangles.
const REL_EPS: f64 = 1e-10;

/// Bins sharing one x low edge, sorted by y low edge.
#[derive(Debug, Clone)]
struct Column {
    x_low: f64,
    max_y_width: f64,
    cells: Vec<(f64, usize)>,
}

/// A sorted set of non-overlapping rectangular bins with directional
/// flow accounting.
///
/// Same lock rules as the 1D axis: the first fill locks, adding bins
/// then fails with [`Error::Locked`], erasing and merging stay
/// available.
#[derive(Debug, Clone)]
pub struct Axis2D<D> {
    bins: Vec<Bin2D<D>>,
    total: D,
    /// Directional buckets in `(ix, iy)` slot order, `(0, 0)` excluded.
    outflows: [D; 8],
    columns: Vec<Column>,
    max_x_width: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
    locked: bool,
}

/// Bucket slot for a flow direction; `None` for `(0, 0)` or anything
/// outside `{-1, 0, 1}`.
fn flow_slot(ix: i32, iy: i32) -> Option<usize> {
    if !(-1..=1).contains(&ix) || !(-1..=1).contains(&iy) || (ix == 0 && iy == 0) {
        return None;
    }
    let raw = ((ix + 1) * 3 + (iy + 1)) as usize;
    Some(if raw > 4 { raw - 1 } else { raw })
}

impl<D: Fill2> Axis2D<D> {
    /// New full-grid axis from two strictly increasing edge lists.
    pub fn new(x_edges: &[f64], y_edges: &[f64]) -> Result<Self> {
        check_edges(x_edges, "x")?;
        check_edges(y_edges, "y")?;
        let mut bins = Vec::with_capacity((x_edges.len() - 1) * (y_edges.len() - 1));
        for wx in x_edges.windows(2) {
            for wy in y_edges.windows(2) {
                bins.push(Bin2D::new(wx[0], wx[1], wy[0], wy[1])?);
            }
        }
        Self::from_bins(bins)
    }

    /// New grid axis of `nx × ny` equal-width bins.
    pub fn with_ranges(
        nx: usize,
        xlow: f64,
        xhigh: f64,
        ny: usize,
        ylow: f64,
        yhigh: f64,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err(Error::Range("axis needs at least one bin per dimension".into()));
        }
        if !(xlow < xhigh) || !(ylow < yhigh) {
            return Err(Error::Range(format!(
                "axis ranges must be increasing, got [{xlow}, {xhigh}] x [{ylow}, {yhigh}]"
            )));
        }
        Self::new(&linspace(nx, xlow, xhigh), &linspace(ny, ylow, yhigh))
    }

    /// New axis from pre-built rectangles, which may leave holes but
    /// must not overlap.
    pub fn from_bins(bins: Vec<Bin2D<D>>) -> Result<Self> {
        Self::from_raw(bins, D::default(), std::array::from_fn(|_| D::default()), false)
    }

    /// Rebuild an axis from persisted state.
    pub fn from_raw(bins: Vec<Bin2D<D>>, total: D, outflows: [D; 8], locked: bool) -> Result<Self> {
        let parts = rebuild(bins)?;
        Ok(Self {
            bins: parts.bins,
            total,
            outflows,
            columns: parts.columns,
            max_x_width: parts.max_x_width,
            x_range: parts.x_range,
            y_range: parts.y_range,
            locked,
        })
    }

    /// Contribute a sample at `(x, y)`, locking the axis.
    ///
    /// The total always receives the fill; additionally exactly one of
    /// {bin, outflow bucket, nothing} does, the last for holes. NaN
    /// coordinates fail with [`Error::Range`] before anything is
    /// recorded.
    pub fn fill(&mut self, x: f64, y: f64, extra: D::Extra, weight: f64) -> Result<Option<usize>> {
        if x.is_nan() || y.is_nan() {
            return Err(Error::Range("cannot fill with a NaN coordinate".into()));
        }
        self.locked = true;
        self.total.fill2(x, y, extra, weight);
        if self.bins.is_empty() {
            return Ok(None);
        }
        let ix = direction(x, self.x_range);
        let iy = direction(y, self.y_range);
        match flow_slot(ix, iy) {
            Some(slot) => {
                self.outflows[slot].fill2(x, y, extra, weight);
                Ok(None)
            }
            None => match self.lookup(x, y) {
                Some(i) => {
                    self.bins[i].fill(x, y, extra, weight);
                    Ok(Some(i))
                }
                None => Ok(None),
            },
        }
    }

    /// Index of the bin containing `(x, y)`, or `None` for flows and
    /// holes.
    pub fn bin_index_at(&self, x: f64, y: f64) -> Option<usize> {
        self.lookup(x, y)
    }

    /// The bin containing `(x, y)`, failing with [`Error::Range`] when
    /// no bin covers the point.
    pub fn bin_by_coord(&self, x: f64, y: f64) -> Result<&Bin2D<D>> {
        self.lookup(x, y)
            .map(|i| &self.bins[i])
            .ok_or_else(|| Error::Range(format!("no bin covers ({x}, {y})")))
    }

    /// The bin at sorted position `i`.
    pub fn bin(&self, i: usize) -> Result<&Bin2D<D>> {
        self.bins.get(i).ok_or_else(|| self.index_error(i))
    }

    /// Mutable access to the bin at sorted position `i`.
    pub fn bin_mut(&mut self, i: usize) -> Result<&mut Bin2D<D>> {
        if i >= self.bins.len() {
            return Err(self.index_error(i));
        }
        Ok(&mut self.bins[i])
    }

    /// All bins, sorted by (x low, y low).
    pub fn bins(&self) -> &[Bin2D<D>] {
        &self.bins
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Lowest covered x edge.
    pub fn low_edge_x(&self) -> Result<f64> {
        self.covered_edge(self.x_range.0)
    }

    /// Highest covered x edge.
    pub fn high_edge_x(&self) -> Result<f64> {
        self.covered_edge(self.x_range.1)
    }

    /// Lowest covered y edge.
    pub fn low_edge_y(&self) -> Result<f64> {
        self.covered_edge(self.y_range.0)
    }

    /// Highest covered y edge.
    pub fn high_edge_y(&self) -> Result<f64> {
        self.covered_edge(self.y_range.1)
    }

    /// Summary distribution of every fill, flows and holes included.
    pub fn total_dbn(&self) -> &D {
        &self.total
    }

    /// Mutable total distribution.
    pub fn total_dbn_mut(&mut self) -> &mut D {
        &mut self.total
    }

    /// The outflow bucket in direction `(ix, iy)`, each in `{-1, 0, 1}`
    /// and not both zero; [`Error::Range`] otherwise.
    pub fn outflow(&self, ix: i32, iy: i32) -> Result<&D> {
        flow_slot(ix, iy)
            .map(|s| &self.outflows[s])
            .ok_or_else(|| Error::Range(format!("no outflow bucket in direction ({ix}, {iy})")))
    }

    /// Mutable outflow bucket.
    pub fn outflow_mut(&mut self, ix: i32, iy: i32) -> Result<&mut D> {
        match flow_slot(ix, iy) {
            Some(s) => Ok(&mut self.outflows[s]),
            None => Err(Error::Range(format!("no outflow bucket in direction ({ix}, {iy})"))),
        }
    }

    /// True once the axis has been filled.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Add one rectangular bin. Fails with [`Error::Locked`] on a
    /// filled axis and [`Error::Range`] on overlap; a failed add leaves
    /// the axis untouched.
    pub fn add_bin(&mut self, xlow: f64, xhigh: f64, ylow: f64, yhigh: f64) -> Result<()> {
        if self.locked {
            return Err(Error::Locked("cannot add_bin on a filled axis".into()));
        }
        let mut bins = self.bins.clone();
        bins.push(Bin2D::new(xlow, xhigh, ylow, yhigh)?);
        self.commit(bins)
    }

    /// Remove the bin at position `i`, statistics included. Privileged:
    /// works on a locked axis and preserves the lock.
    pub fn erase_bin(&mut self, i: usize) -> Result<()> {
        if i >= self.bins.len() {
            return Err(self.index_error(i));
        }
        let mut bins = self.bins.clone();
        bins.remove(i);
        self.commit(bins)
    }

    /// Fold every bin inside the bounding rectangle of bins `from` and
    /// `to` into one bin covering that rectangle.
    ///
    /// Fails with [`Error::Range`] when a bin straddles the rectangle's
    /// border or the contained bins do not tile it exactly (a hole
    /// inside would silently become covered). Works on a locked axis.
    pub fn merge_bins(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.bins.len() || to >= self.bins.len() {
            return Err(Error::Range(format!(
                "bin span {from}..{to} invalid for an axis of {} bins",
                self.bins.len()
            )));
        }
        let (a, b) = (&self.bins[from], &self.bins[to]);
        let xlow = a.x_low().min(b.x_low());
        let xhigh = a.x_high().max(b.x_high());
        let ylow = a.y_low().min(b.y_low());
        let yhigh = a.y_high().max(b.y_high());

        let mut inside = Vec::new();
        let mut covered = 0.0;
        for (i, bin) in self.bins.iter().enumerate() {
            let ox = overlap_len(bin.x_low(), bin.x_high(), xlow, xhigh);
            let oy = overlap_len(bin.y_low(), bin.y_high(), ylow, yhigh);
            if ox <= REL_EPS * bin.x_width() || oy <= REL_EPS * bin.y_width() {
                continue;
            }
            let contained = bin.x_low() >= xlow - REL_EPS * bin.x_width()
                && bin.x_high() <= xhigh + REL_EPS * bin.x_width()
                && bin.y_low() >= ylow - REL_EPS * bin.y_width()
                && bin.y_high() <= yhigh + REL_EPS * bin.y_width();
            if !contained {
                return Err(Error::Range(format!(
                    "bin {i} straddles the border of the merge rectangle"
                )));
            }
            covered += bin.area();
            inside.push(i);
        }
        let rect_area = (xhigh - xlow) * (yhigh - ylow);
        if !fuzzy_eq(covered, rect_area) {
            return Err(Error::Range(
                "bins inside the merge rectangle do not tile it exactly".into(),
            ));
        }

        let mut merged = self.bins[inside[0]].clone();
        for &i in &inside[1..] {
            merged.merge(&self.bins[i]);
        }
        let mut bins: Vec<Bin2D<D>> = Vec::with_capacity(self.bins.len() - inside.len() + 1);
        for (i, bin) in self.bins.iter().enumerate() {
            if !inside.contains(&i) {
                bins.push(bin.clone());
            }
        }
        bins.push(merged);
        self.commit(bins)
    }

    /// Rescale both coordinate axes: every edge and moment, summaries
    /// and bucket directions included. Negative factors mirror the
    /// corresponding axis and re-aim the outflow buckets.
    pub fn scale_xy(&mut self, fx: f64, fy: f64) -> Result<()> {
        if fx == 0.0 || fy == 0.0 || !fx.is_finite() || !fy.is_finite() {
            return Err(Error::Range(format!("cannot scale an axis by ({fx}, {fy})")));
        }
        let mut bins = self.bins.clone();
        for b in &mut bins {
            b.scale_xy(fx, fy);
        }
        self.commit(bins)?;
        self.total.scale_x(fx);
        self.total.scale_y(fy);
        for d in &mut self.outflows {
            d.scale_x(fx);
            d.scale_y(fy);
        }
        if fx < 0.0 || fy < 0.0 {
            let old = self.outflows.clone();
            for ix in -1..=1 {
                for iy in -1..=1 {
                    let Some(src) = flow_slot(ix, iy) else { continue };
                    let nix = if fx < 0.0 { -ix } else { ix };
                    let niy = if fy < 0.0 { -iy } else { iy };
                    if let Some(dst) = flow_slot(nix, niy) {
                        self.outflows[dst] = old[src].clone();
                    }
                }
            }
        }
        Ok(())
    }

    /// Rescale all fill weights by `factor`, summaries included.
    pub fn scale_w(&mut self, factor: f64) {
        for b in &mut self.bins {
            b.scale_w(factor);
        }
        self.total.scale_w(factor);
        for d in &mut self.outflows {
            d.scale_w(factor);
        }
    }

    /// Zero every statistic and release the lock, keeping the binning.
    pub fn reset(&mut self) {
        for b in &mut self.bins {
            b.reset();
        }
        self.total.reset();
        for d in &mut self.outflows {
            d.reset();
        }
        self.locked = false;
    }

    /// True when both axes have fuzzy-identical rectangles, so their
    /// statistics combine bin by bin.
    pub fn same_binning(&self, other: &Self) -> bool {
        self.bins.len() == other.bins.len()
            && self.bins.iter().zip(&other.bins).all(|(a, b)| {
                fuzzy_eq(a.x_low(), b.x_low())
                    && fuzzy_eq(a.x_high(), b.x_high())
                    && fuzzy_eq(a.y_low(), b.y_low())
                    && fuzzy_eq(a.y_high(), b.y_high())
            })
    }

    /// Termwise-add another axis's statistics; [`Error::Logic`] unless
    /// the binnings match.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_same_binning(other, "add")?;
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            a.add(b)?;
        }
        self.total.add(&other.total);
        for (a, b) in self.outflows.iter_mut().zip(&other.outflows) {
            a.add(b);
        }
        Ok(())
    }

    /// Termwise-subtract another axis's statistics, exactly reversing a
    /// previous [`Axis2D::add`] of the same axis.
    pub fn subtract(&mut self, other: &Self) -> Result<()> {
        self.check_same_binning(other, "subtract")?;
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            a.subtract(b)?;
        }
        self.total.subtract(&other.total);
        for (a, b) in self.outflows.iter_mut().zip(&other.outflows) {
            a.subtract(b);
        }
        Ok(())
    }

    fn lookup(&self, x: f64, y: f64) -> Option<usize> {
        let end = self.columns.partition_point(|c| c.x_low <= x);
        for c in self.columns[..end].iter().rev() {
            if c.x_low + self.max_x_width <= x {
                break;
            }
            let cend = c.cells.partition_point(|&(ylow, _)| ylow <= y);
            for &(ylow, i) in c.cells[..cend].iter().rev() {
                if ylow + c.max_y_width <= y {
                    break;
                }
                if self.bins[i].contains(x, y) {
                    return Some(i);
                }
            }
        }
        None
    }

    fn commit(&mut self, bins: Vec<Bin2D<D>>) -> Result<()> {
        let parts = rebuild(bins)?;
        self.bins = parts.bins;
        self.columns = parts.columns;
        self.max_x_width = parts.max_x_width;
        self.x_range = parts.x_range;
        self.y_range = parts.y_range;
        Ok(())
    }

    fn check_same_binning(&self, other: &Self, op: &str) -> Result<()> {
        if !self.same_binning(other) {
            return Err(Error::Logic(format!("cannot {op} axes with different binnings")));
        }
        Ok(())
    }

    fn covered_edge(&self, edge: f64) -> Result<f64> {
        if self.bins.is_empty() {
            return Err(Error::Range("edge requested of an empty axis".into()));
        }
        Ok(edge)
    }

    fn index_error(&self, i: usize) -> Error {
        Error::Range(format!("bin index {i} out of range for an axis of {} bins", self.bins.len()))
    }
}

/// -1 below the covered interval, +1 at or above its top, 0 inside.
fn direction(v: f64, range: (f64, f64)) -> i32 {
    if v < range.0 {
        -1
    } else if v >= range.1 {
        1
    } else {
        0
    }
}

fn overlap_len(lo: f64, hi: f64, rlo: f64, rhi: f64) -> f64 {
    hi.min(rhi) - lo.max(rlo)
}

fn check_edges(edges: &[f64], axis: &str) -> Result<()> {
    if edges.len() < 2 {
        return Err(Error::Range(format!("{axis} edge list needs at least two edges")));
    }
    for w in edges.windows(2) {
        if !(w[0] < w[1]) {
            return Err(Error::Range(format!(
                "{axis} edges must be strictly increasing, got {} then {}",
                w[0], w[1]
            )));
        }
    }
    Ok(())
}

struct Rebuilt<D> {
    bins: Vec<Bin2D<D>>,
    columns: Vec<Column>,
    max_x_width: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

/// Validate a candidate rectangle set and build the column lookup.
///
/// Overlap detection sweeps the x-sorted bins: only pairs whose x
/// intervals overlap beyond tolerance are checked for y overlap.
fn rebuild<D: Fill2>(mut bins: Vec<Bin2D<D>>) -> Result<Rebuilt<D>> {
    bins.sort_by(|a, b| {
        a.x_low().total_cmp(&b.x_low()).then_with(|| a.y_low().total_cmp(&b.y_low()))
    });

    for (i, a) in bins.iter().enumerate() {
        for b in bins[i + 1..].iter() {
            if b.x_low() >= a.x_high() {
                break;
            }
            let ox = overlap_len(a.x_low(), a.x_high(), b.x_low(), b.x_high());
            let oy = overlap_len(a.y_low(), a.y_high(), b.y_low(), b.y_high());
            let tol_x = REL_EPS * a.x_width().min(b.x_width());
            let tol_y = REL_EPS * a.y_width().min(b.y_width());
            if ox > tol_x && oy > tol_y {
                return Err(Error::Range(format!(
                    "bins [{}, {}) x [{}, {}) and [{}, {}) x [{}, {}) overlap",
                    a.x_low(),
                    a.x_high(),
                    a.y_low(),
                    a.y_high(),
                    b.x_low(),
                    b.x_high(),
                    b.y_low(),
                    b.y_high()
                )));
            }
        }
    }

    let mut columns: Vec<Column> = Vec::new();
    let mut max_x_width: f64 = 0.0;
    let mut x_range = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y_range = (f64::INFINITY, f64::NEG_INFINITY);
    for (i, b) in bins.iter().enumerate() {
        max_x_width = max_x_width.max(b.x_width());
        x_range = (x_range.0.min(b.x_low()), x_range.1.max(b.x_high()));
        y_range = (y_range.0.min(b.y_low()), y_range.1.max(b.y_high()));
        match columns.last_mut() {
            Some(c) if c.x_low == b.x_low() => {
                c.max_y_width = c.max_y_width.max(b.y_width());
                c.cells.push((b.y_low(), i));
            }
            _ => columns.push(Column {
                x_low: b.x_low(),
                max_y_width: b.y_width(),
                cells: vec![(b.y_low(), i)],
            }),
        }
    }
    debug!("axis rebuilt: {} bins in {} columns", bins.len(), columns.len());
    Ok(Rebuilt { bins, columns, max_x_width, x_range, y_range })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbn2::Dbn2;
    use crate::dbn3::Dbn3;

    fn grid() -> Axis2D<Dbn2> {
        Axis2D::with_ranges(4, 0.0, 4.0, 4, 0.0, 4.0).unwrap()
    }

    #[test]
    fn grid_construction() {
        let a = grid();
        assert_eq!(a.num_bins(), 16);
        assert_eq!(a.low_edge_x().unwrap(), 0.0);
        assert_eq!(a.high_edge_y().unwrap(), 4.0);
        assert!(matches!(Axis2D::<Dbn2>::new(&[0.0, 1.0], &[1.0]), Err(Error::Range(_))));
        assert!(matches!(
            Axis2D::<Dbn2>::new(&[0.0, 1.0, 1.0], &[0.0, 1.0]),
            Err(Error::Range(_))
        ));
    }

    #[test]
    fn fill_routes_to_the_containing_bin() {
        let mut a = grid();
        let i = a.fill(1.5, 2.5, (), 2.0).unwrap().unwrap();
        let b = a.bin(i).unwrap();
        assert!(b.contains(1.5, 2.5));
        assert_eq!(b.sum_w(), 2.0);
        assert_eq!(a.total_dbn().num_fills(), 1);
        assert_eq!(a.bin_index_at(1.5, 2.5), Some(i));
    }

    #[test]
    fn every_outflow_bucket_gets_its_direction() {
        let mut a = grid();
        let probes = [
            (-1.0, -1.0, (-1, -1)),
            (-1.0, 2.0, (-1, 0)),
            (-1.0, 5.0, (-1, 1)),
            (2.0, -1.0, (0, -1)),
            (2.0, 5.0, (0, 1)),
            (5.0, -1.0, (1, -1)),
            (5.0, 2.0, (1, 0)),
            (5.0, 5.0, (1, 1)),
        ];
        for &(x, y, _) in &probes {
            assert_eq!(a.fill(x, y, (), 1.0).unwrap(), None);
        }
        for &(_, _, (ix, iy)) in &probes {
            assert_eq!(a.outflow(ix, iy).unwrap().num_fills(), 1, "bucket ({ix}, {iy})");
        }
        assert_eq!(a.total_dbn().num_fills(), 8);
        assert!(matches!(a.outflow(0, 0), Err(Error::Range(_))));
        assert!(matches!(a.outflow(2, 0), Err(Error::Range(_))));
    }

    #[test]
    fn top_edges_overflow_bottom_edges_fill() {
        let mut a = grid();
        assert!(a.fill(0.0, 0.0, (), 1.0).unwrap().is_some());
        assert_eq!(a.fill(4.0, 2.0, (), 1.0).unwrap(), None);
        assert_eq!(a.outflow(1, 0).unwrap().num_fills(), 1);
    }

    #[test]
    fn hole_swallows_into_total_only() {
        let mut a = grid();
        let hole = a.bin_index_at(1.5, 1.5).unwrap();
        a.erase_bin(hole).unwrap();
        assert_eq!(a.fill(1.5, 1.5, (), 1.0).unwrap(), None);
        assert_eq!(a.total_dbn().num_fills(), 1);
        for ix in -1..=1 {
            for iy in -1..=1 {
                if ix != 0 || iy != 0 {
                    assert_eq!(a.outflow(ix, iy).unwrap().num_fills(), 0);
                }
            }
        }
        assert!(matches!(a.bin_by_coord(1.5, 1.5), Err(Error::Range(_))));
    }

    #[test]
    fn wide_bin_is_found_from_distant_columns() {
        let bins = vec![
            Bin2D::<Dbn2>::new(0.0, 10.0, 0.0, 1.0).unwrap(),
            Bin2D::<Dbn2>::new(5.0, 6.0, 1.0, 2.0).unwrap(),
            Bin2D::<Dbn2>::new(9.0, 10.0, 1.0, 2.0).unwrap(),
        ];
        let a = Axis2D::from_bins(bins).unwrap();
        assert_eq!(a.bin_by_coord(9.5, 0.5).unwrap().x_low(), 0.0);
        assert_eq!(a.bin_by_coord(5.5, 1.5).unwrap().x_low(), 5.0);
        assert_eq!(a.bin_index_at(7.0, 1.5), None);
    }

    #[test]
    fn overlap_rejected_and_axis_unchanged() {
        let mut a = grid();
        assert!(matches!(a.add_bin(3.5, 4.5, 0.5, 1.5), Err(Error::Range(_))));
        assert_eq!(a.num_bins(), 16);
        assert!(a.fill(3.9, 0.9, (), 1.0).unwrap().is_some());
    }

    #[test]
    fn lock_rules_match_the_1d_axis() {
        let mut a = grid();
        a.fill(0.5, 0.5, (), 1.0).unwrap();
        assert!(a.locked());
        assert!(matches!(a.add_bin(4.0, 5.0, 0.0, 1.0), Err(Error::Locked(_))));
        a.erase_bin(0).unwrap();
        assert!(a.locked());
        a.reset();
        assert!(!a.locked());
        a.add_bin(10.0, 11.0, 0.0, 1.0).unwrap();
    }

    #[test]
    fn merge_folds_an_exact_tile() {
        let mut a = grid();
        a.fill(0.5, 0.5, (), 1.0).unwrap();
        a.fill(1.5, 1.5, (), 3.0).unwrap();
        let from = a.bin_index_at(0.5, 0.5).unwrap();
        let to = a.bin_index_at(1.5, 1.5).unwrap();
        a.merge_bins(from, to).unwrap();
        assert_eq!(a.num_bins(), 13);
        let merged = a.bin_by_coord(0.5, 1.5).unwrap();
        assert_eq!((merged.x_low(), merged.x_high()), (0.0, 2.0));
        assert_eq!((merged.y_low(), merged.y_high()), (0.0, 2.0));
        assert_eq!(merged.sum_w(), 4.0);
    }

    #[test]
    fn merge_rejects_straddling_bins() {
        // the middle bin pokes out of the [0,1) x [0,3) merge rectangle
        let bins = vec![
            Bin2D::<Dbn2>::new(0.0, 1.0, 0.0, 1.0).unwrap(),
            Bin2D::<Dbn2>::new(0.0, 2.0, 1.0, 2.0).unwrap(),
            Bin2D::<Dbn2>::new(0.0, 1.0, 2.0, 3.0).unwrap(),
        ];
        let mut a = Axis2D::from_bins(bins).unwrap();
        let from = a.bin_index_at(0.5, 0.5).unwrap();
        let to = a.bin_index_at(0.5, 2.5).unwrap();
        assert!(matches!(a.merge_bins(from, to), Err(Error::Range(_))));
        assert_eq!(a.num_bins(), 3);
    }

    #[test]
    fn merge_rejects_a_hole_inside_the_rectangle() {
        let mut a = grid();
        let hole = a.bin_index_at(0.5, 1.5).unwrap();
        a.erase_bin(hole).unwrap();
        let from = a.bin_index_at(0.5, 0.5).unwrap();
        let to = a.bin_index_at(1.5, 1.5).unwrap();
        assert!(matches!(a.merge_bins(from, to), Err(Error::Range(_))));
    }

    #[test]
    fn add_then_subtract_recovers_everything() {
        let mut a = grid();
        a.fill(0.5, 0.5, (), 2.0).unwrap();
        a.fill(-1.0, 5.0, (), 1.0).unwrap();
        let mut b = grid();
        b.fill(3.5, 3.5, (), 4.0).unwrap();
        b.fill(0.5, 0.5, (), 0.5).unwrap();

        let before: Vec<f64> = a.bins().iter().map(Bin2D::sum_w).collect();
        a.add(&b).unwrap();
        a.subtract(&b).unwrap();
        let after: Vec<f64> = a.bins().iter().map(Bin2D::sum_w).collect();
        assert_eq!(before, after);
        assert_eq!(a.outflow(-1, 1).unwrap().num_fills(), 1);

        let c = Axis2D::<Dbn2>::with_ranges(2, 0.0, 4.0, 4, 0.0, 4.0).unwrap();
        assert!(matches!(a.add(&c), Err(Error::Logic(_))));
    }

    #[test]
    fn scale_xy_moves_edges_and_buckets() {
        let mut a = grid();
        a.fill(5.0, 2.0, (), 1.0).unwrap();
        a.scale_xy(2.0, 1.0).unwrap();
        assert_eq!(a.high_edge_x().unwrap(), 8.0);
        assert!(a.bin_index_at(7.5, 2.0).is_some());
        assert_eq!(a.outflow(1, 0).unwrap().num_fills(), 1);

        // mirroring x re-aims the east bucket west
        a.scale_xy(-1.0, 1.0).unwrap();
        assert_eq!(a.outflow(-1, 0).unwrap().num_fills(), 1);
        assert_eq!(a.outflow(1, 0).unwrap().num_fills(), 0);
        assert_eq!(a.low_edge_x().unwrap(), -8.0);
    }

    #[test]
    fn profile_axis_carries_sampled_means() {
        let mut a = Axis2D::<Dbn3>::with_ranges(2, 0.0, 2.0, 2, 0.0, 2.0).unwrap();
        a.fill(0.5, 0.5, 10.0, 1.0).unwrap();
        a.fill(0.5, 0.5, 20.0, 3.0).unwrap();
        let b = a.bin_by_coord(0.5, 0.5).unwrap();
        assert_eq!(b.dbn().z_mean().unwrap(), 17.5);
    }

    #[test]
    fn nan_fill_is_rejected_before_recording() {
        let mut a = grid();
        assert!(matches!(a.fill(f64::NAN, 1.0, (), 1.0), Err(Error::Range(_))));
        assert!(matches!(a.fill(1.0, f64::NAN, (), 1.0), Err(Error::Range(_))));
        assert_eq!(a.total_dbn().num_fills(), 0);
        assert!(!a.locked());
    }
}
