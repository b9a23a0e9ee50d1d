//! Small numeric helpers shared across the workspace.

/// Default relative tolerance for [`fuzzy_eq`].
pub const FUZZY_TOLERANCE: f64 = 1e-5;

/// `n + 1` evenly spaced edges covering `[lower, upper]`.
///
/// The first edge is exactly `lower` and the last exactly `upper`, so axes
/// built from ranges have bit-exact outer bounds.
pub fn linspace(n: usize, lower: f64, upper: f64) -> Vec<f64> {
    let mut edges = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let frac = i as f64 / n as f64;
        edges.push(lower + (upper - lower) * frac);
    }
    if let Some(last) = edges.last_mut() {
        *last = upper;
    }
    edges
}

/// Compare two floats with a relative tolerance.
pub fn fuzzy_eq_tol(a: f64, b: f64, tolerance: f64) -> bool {
    let absavg = (a + b).abs() / 2.0;
    let absdiff = (a - b).abs();
    (absavg == 0.0 && absdiff == 0.0) || absdiff < tolerance * absavg
}

/// Compare two floats with the default relative tolerance.
pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    fuzzy_eq_tol(a, b, FUZZY_TOLERANCE)
}
