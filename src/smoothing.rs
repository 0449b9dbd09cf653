//! Smoothing, crossing and peak helpers applied to 1-D metric slices.

use crate::error::DataError;

/// Kernel half-width in standard deviations.
pub const TRUNCATE: f64 = 4.0;

/// Gaussian smoothing with half-sample symmetric ("reflect") boundaries.
///
/// The kernel radius is `round(TRUNCATE * sigma)` and the weights are
/// normalised to sum to one, so a constant signal comes back unchanged.
pub fn gaussian_filter1d(y: &[f64], sigma: f64) -> Vec<f64> {
    if y.is_empty() || !(sigma > 0.0) {
        return y.to_vec();
    }

    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let kernel = gaussian_kernel(sigma, radius);
    let n = y.len() as isize;

    (0..n)
        .map(|i| {
            kernel
                .iter()
                .zip(-radius..=radius)
                .map(|(w, offset)| w * y[reflect_index(i + offset, n)])
                .sum()
        })
        .collect()
}

fn gaussian_kernel(sigma: f64, radius: isize) -> Vec<f64> {
    let inv = -0.5 / (sigma * sigma);
    let raw: Vec<f64> = (-radius..=radius)
        .map(|x| (inv * (x * x) as f64).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// `d c b a | a b c d | d c b a`, repeated for offsets wider than the signal.
fn reflect_index(i: isize, n: isize) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m >= n { period - 1 - m } else { m }) as usize
}

/// First `x[i]` whose `y[i]` reaches `threshold`; `None` when nothing does.
pub fn first_crossing(x: &[f64], y: &[f64], threshold: f64) -> Option<f64> {
    x.iter()
        .zip(y.iter())
        .find(|(_, value)| **value >= threshold)
        .map(|(xv, _)| *xv)
}

/// Smooth `y`, then report where it first reaches `threshold`.
pub fn find_threshold(x: &[f64], y: &[f64], threshold: f64, sigma: f64) -> Option<f64> {
    first_crossing(x, &gaussian_filter1d(y, sigma), threshold)
}

/// Derivative of `y` with respect to a possibly non-uniform `x`.
///
/// Interior points use second-order central differences, the two ends use
/// one-sided first-order differences.
pub fn gradient(y: &[f64], x: &[f64]) -> Result<Vec<f64>, DataError> {
    if x.len() != y.len() {
        return Err(DataError::LengthMismatch {
            context: "gradient x",
            expected: y.len(),
            got: x.len(),
        });
    }
    let n = y.len();
    if n < 2 {
        return Err(DataError::TooFewSamples {
            context: "gradient",
            required: 2,
            got: n,
        });
    }

    let mut out = vec![0.0; n];
    out[0] = (y[1] - y[0]) / (x[1] - x[0]);
    out[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        out[i] = (hs * hs * y[i + 1] + (hd * hd - hs * hs) * y[i] - hd * hd * y[i - 1])
            / (hs * hd * (hd + hs));
    }
    Ok(out)
}

/// Indices of local maxima whose prominence is at least `min_prominence`.
///
/// Flat-topped maxima report the middle sample (rounded down); the first and
/// last samples are never peaks.
pub fn find_peaks(y: &[f64], min_prominence: f64) -> Vec<usize> {
    local_maxima(y)
        .into_iter()
        .filter(|&peak| prominence(y, peak) >= min_prominence)
        .collect()
}

fn local_maxima(y: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if y.len() < 3 {
        return peaks;
    }
    let last = y.len() - 1;
    let mut i = 1;
    while i < last {
        if y[i - 1] < y[i] {
            let mut ahead = i + 1;
            while ahead < last && y[ahead] == y[i] {
                ahead += 1;
            }
            if y[ahead] < y[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn prominence(y: &[f64], peak: usize) -> f64 {
    let height = y[peak];

    let mut left_min = height;
    for &v in y[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &y[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}
