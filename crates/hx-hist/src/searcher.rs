//! Adaptive bin lookup over a fixed sorted edge list.
//!
//! Lookup is a hybrid of estimation, linear probing and bisection:
//! linear search beats bisection below a few dozen elements, so an index
//! estimate followed by a short linear scan gives constant-time lookups
//! for regular and near-regular binnings, and the bisection fallback for
//! irregular ones finishes with a linear tail instead of bisecting all
//! the way down.

/// Number of linear probes tried from the estimated position before
/// falling back to bisection.
const SEARCH_SIZE: usize = 16;

/// Interval length below which bisection hands over to a linear scan.
const BISECT_LINEAR_THRESHOLD: usize = 32;

/// Index predictor for edges laid out on a linear scale.
#[derive(Debug, Clone, Copy)]
struct LinEstimator {
    c: f64,
    m: f64,
}

impl LinEstimator {
    fn new(xlow: f64, xhigh: f64, n: usize) -> Self {
        Self { c: xlow, m: n as f64 / (xhigh - xlow) }
    }

    fn estimate(&self, x: f64) -> f64 {
        self.m * (x - self.c)
    }
}

/// Index predictor for edges laid out on a logarithmic scale.
#[derive(Debug, Clone, Copy)]
struct LogEstimator {
    c: f64,
    m: f64,
}

impl LogEstimator {
    fn new(xlow: f64, xhigh: f64, n: usize) -> Self {
        let c = xlow.log2();
        Self { c, m: n as f64 / (xhigh.log2() - c) }
    }

    fn estimate(&self, x: f64) -> f64 {
        1.0 + self.m * (x.log2() - self.c)
    }
}

#[derive(Debug, Clone, Copy)]
enum Estimator {
    Lin(LinEstimator),
    Log(LogEstimator),
}

impl Estimator {
    fn estimate(&self, x: f64) -> f64 {
        match self {
            Estimator::Lin(e) => e.estimate(x),
            Estimator::Log(e) => e.estimate(x),
        }
    }
}

/// Classifies a coordinate against a fixed, sorted edge list.
///
/// The edges are stored with ±∞ sentinels appended, so out-of-range
/// lookups resolve to the boundary cells without a separate check.
/// [`BinSearcher::index`] never fails; interpreting the boundary cells
/// (underflow/overflow/gap) is the caller's responsibility.
///
/// A searcher is immutable: axes rebuild it wholesale on every structural
/// mutation.
#[derive(Debug, Clone)]
pub struct BinSearcher {
    /// Sorted edges, with `-inf` prepended and `+inf` appended.
    lows: Vec<f64>,
    est: Estimator,
}

impl BinSearcher {
    /// Build a searcher over a sorted edge list, picking whichever index
    /// estimator (linear or logarithmic) predicts the true edge positions
    /// with the smaller mean absolute error.
    ///
    /// The logarithmic estimator is only a candidate when all edges are
    /// positive; a NaN error sum loses the comparison, so degenerate
    /// inputs fall back to the linear estimator.
    pub fn new(edges: &[f64]) -> Self {
        let mut lows = Vec::with_capacity(edges.len() + 2);
        lows.push(f64::NEG_INFINITY);
        lows.extend_from_slice(edges);
        lows.push(f64::INFINITY);

        let est = if edges.len() < 2 {
            Estimator::Lin(LinEstimator::new(0.0, 1.0, 1))
        } else {
            let n = edges.len() - 1;
            let (first, last) = (edges[0], edges[edges.len() - 1]);
            let lin = LinEstimator::new(first, last, n);
            let mut chosen = Estimator::Lin(lin);
            if first > 0.0 {
                let log = LogEstimator::new(first, last, n);
                let mut lin_err = 0.0;
                let mut log_err = 0.0;
                for (i, &e) in edges.iter().enumerate() {
                    lin_err += (lin.estimate(e) - i as f64).abs();
                    log_err += (log.estimate(e) - i as f64).abs();
                }
                if log_err < lin_err {
                    chosen = Estimator::Log(log);
                }
            }
            chosen
        };

        Self { lows, est }
    }

    /// Number of edges the searcher was built over.
    pub fn n_edges(&self) -> usize {
        self.lows.len() - 2
    }

    /// Cell index of `x` in sentinel coordinates: the `q` such that
    /// `edge[q-1] <= x < edge[q]` counting edges from 1, i.e. 0 for `x`
    /// below every edge and [`BinSearcher::n_edges`] for `x` at or above
    /// the last edge.
    pub fn index(&self, x: f64) -> usize {
        let mut i = self.estimate(x);
        if x >= self.lows[i] {
            match scan_forward(&self.lows[i..], x, SEARCH_SIZE) {
                Some(di) => i += di,
                None => i = self.bisect(x, i + SEARCH_SIZE),
            }
        } else {
            match scan_backward(&self.lows[..i], x, SEARCH_SIZE) {
                Some(di) => i -= di,
                None => i = self.bisect(x, 0),
            }
        }
        i - 1
    }

    /// The edge pair bounding cell `q` (in sentinel coordinates).
    pub fn cell_range(&self, q: usize) -> (f64, f64) {
        (self.lows[q], self.lows[q + 1])
    }

    /// Clamped estimator guess, in sentinel coordinates.
    fn estimate(&self, x: f64) -> usize {
        let y = self.est.estimate(x);
        let yi = if y.is_nan() || y < 0.0 { 0.0 } else { y };
        (yi as usize).min(self.lows.len() - 1)
    }

    /// Position of the first edge greater than `x`, searching from `min`.
    fn bisect(&self, x: f64, mut min: usize) -> usize {
        let mut len = self.lows.len() - min;
        while len > BISECT_LINEAR_THRESHOLD {
            let half = len >> 1;
            let middle = min + half;
            if self.lows[middle] <= x {
                min = middle + 1;
                len = len - half - 1;
            } else {
                len = half;
            }
        }
        min + scan_forward(&self.lows[min..], x, BISECT_LINEAR_THRESHOLD)
            .unwrap_or(BISECT_LINEAR_THRESHOLD)
    }
}

/// Offset of the first element greater than `key` within the first `n`
/// elements of `arr`; `None` if all `n` probes were spent.
fn scan_forward(arr: &[f64], key: f64, n: usize) -> Option<usize> {
    let m = n.min(arr.len());
    (0..m).find(|&i| arr[i] > key).or(if m < n { Some(m) } else { None })
}

/// Number of backward steps from the end of `arr` to the first element
/// `<= key`, probing at most `n` elements; `None` if all were spent.
fn scan_backward(arr: &[f64], key: f64, n: usize) -> Option<usize> {
    let m = n.min(arr.len());
    (0..m).find(|&i| arr[arr.len() - 1 - i] <= key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hx_core::linspace;

    /// Reference implementation: position of first edge > x, minus 1.
    fn index_by_scan(edges: &[f64], x: f64) -> usize {
        let mut q = 0;
        for &e in edges {
            if e > x {
                break;
            }
            q += 1;
        }
        q
    }

    fn check_all(edges: &[f64], probes: &[f64]) {
        let s = BinSearcher::new(edges);
        for &x in probes {
            assert_eq!(s.index(x), index_by_scan(edges, x), "x = {x}");
        }
    }

    #[test]
    fn linear_edges_in_and_out_of_range() {
        let edges = linspace(100, 0.0, 100.0);
        let s = BinSearcher::new(&edges);
        assert_eq!(s.index(-0.5), 0);
        assert_eq!(s.index(0.0), 1);
        assert_eq!(s.index(0.5), 1);
        assert_eq!(s.index(50.0), 51);
        assert_eq!(s.index(99.999), 100);
        assert_eq!(s.index(100.0), 101);
        assert_eq!(s.index(1e9), 101);
    }

    #[test]
    fn every_cell_of_a_linear_binning() {
        let edges = linspace(64, -3.0, 5.0);
        let s = BinSearcher::new(&edges);
        for (i, w) in edges.windows(2).enumerate() {
            let mid = 0.5 * (w[0] + w[1]);
            assert_eq!(s.index(w[0]), i + 1);
            assert_eq!(s.index(mid), i + 1);
        }
    }

    #[test]
    fn log_edges_select_log_estimator() {
        let edges: Vec<f64> = (0..=60).map(|i| 1e-3 * 10f64.powf(i as f64 / 10.0)).collect();
        let s = BinSearcher::new(&edges);
        assert!(matches!(s.est, Estimator::Log(_)));
        let probes: Vec<f64> = (0..600).map(|i| 1e-3 * 10f64.powf(i as f64 / 100.0)).collect();
        check_all(&edges, &probes);
    }

    #[test]
    fn nonpositive_edges_never_use_log() {
        let edges = linspace(10, -5.0, 5.0);
        let s = BinSearcher::new(&edges);
        assert!(matches!(s.est, Estimator::Lin(_)));
        check_all(&edges, &[-6.0, -5.0, -0.1, 0.0, 0.1, 4.9, 5.0, 6.0]);
    }

    #[test]
    fn negative_probe_against_log_binning_is_underflow() {
        let edges: Vec<f64> = (0..=20).map(|i| 2f64.powi(i)).collect();
        let s = BinSearcher::new(&edges);
        // log2 of a negative number is NaN; the estimate clamps to zero
        assert_eq!(s.index(-3.0), 0);
        assert_eq!(s.index(0.0), 0);
    }

    #[test]
    fn clustered_edges_fall_back_to_bisection() {
        // 990 edges crammed into [0, 1] plus a handful far away: the linear
        // estimator is off by far more than the probe window.
        let mut edges: Vec<f64> = (0..990).map(|i| i as f64 / 990.0).collect();
        edges.extend((1..=10).map(|i| 1e6 * i as f64));
        let probes: Vec<f64> =
            vec![-1.0, 0.0, 0.5, 0.999, 1.0, 500.0, 1e6, 5.5e6, 9.99e6, 1e7, 2e7];
        check_all(&edges, &probes);
        for &x in &[0.123, 0.456, 0.789] {
            check_all(&edges, &[x]);
        }
    }

    #[test]
    fn irregular_edges_exhaustive() {
        let edges = vec![0.0, 0.1, 0.15, 0.7, 3.0, 3.1, 9.0, 50.0];
        let mut probes = vec![-1.0, 100.0];
        for w in edges.windows(2) {
            probes.push(w[0]);
            probes.push(0.5 * (w[0] + w[1]));
            probes.push(w[1] - 1e-9);
        }
        probes.push(*edges.last().unwrap());
        check_all(&edges, &probes);
    }

    #[test]
    fn two_edges() {
        let s = BinSearcher::new(&[1.0, 2.0]);
        assert_eq!(s.index(0.5), 0);
        assert_eq!(s.index(1.0), 1);
        assert_eq!(s.index(1.5), 1);
        assert_eq!(s.index(2.0), 2);
    }

    #[test]
    fn large_uniform_binning_hits_every_bin() {
        let edges = linspace(10_000, 0.0, 1.0);
        let s = BinSearcher::new(&edges);
        for i in 0..10_000 {
            let x = (i as f64 + 0.5) / 10_000.0;
            assert_eq!(s.index(x), index_by_scan(&edges, x));
        }
    }

    #[test]
    fn cell_range_brackets_lookup() {
        let edges = linspace(10, 0.0, 10.0);
        let s = BinSearcher::new(&edges);
        let q = s.index(3.5);
        let (lo, hi) = s.cell_range(q);
        assert!(lo <= 3.5 && 3.5 < hi);
    }
}
