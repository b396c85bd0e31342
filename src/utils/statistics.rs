//! Global and windowed intensity statistics
//!
//! All deviations are population deviations (divide by N). The global
//! deviation and the summed-area-table path work from exact integer
//! moments, so a flat region yields a deviation of exactly 0.0.

use crate::utils::padding::PaddedRaster;

/// Mean and standard deviation of a set of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl WindowStats {
    /// Statistics from count, sum and sum of squares
    ///
    /// Variance is formed as `(n * sum_sq - sum^2) / n^2` with the numerator
    /// in integer arithmetic, so it never goes negative.
    pub fn from_moments(n: u64, sum: u64, sum_sq: u64) -> Self {
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let numerator = n as u128 * sum_sq as u128 - sum as u128 * sum as u128;
        let n_f = n as f64;
        Self {
            mean: sum as f64 / n_f,
            std_dev: (numerator as f64 / (n_f * n_f)).sqrt(),
        }
    }
}

/// Mean and population standard deviation over every sample
pub fn global_stats(gray: &[u8]) -> WindowStats {
    let (sum, sum_sq) = gray.iter().fold((0u64, 0u64), |(s, sq), &v| {
        let v = v as u64;
        (s + v, sq + v * v)
    });
    WindowStats::from_moments(gray.len() as u64, sum, sum_sq)
}

/// Population standard deviation over every sample
pub fn global_std_dev(gray: &[u8]) -> f64 {
    global_stats(gray).std_dev
}

/// Window statistics by direct two-pass recomputation
///
/// `(x, y)` is the top-left corner in padded coordinates, which for a
/// padding depth of `size / 2` equals the source pixel the window is
/// centred on.
pub fn window_stats_naive(padded: &PaddedRaster, x: usize, y: usize, size: usize) -> WindowStats {
    let n = (size * size) as f64;

    let mut sum = 0.0f64;
    for wy in y..y + size {
        for &v in &padded.row(wy)[x..x + size] {
            sum += v as f64;
        }
    }
    let mean = sum / n;

    let mut sq_dev = 0.0f64;
    for wy in y..y + size {
        for &v in &padded.row(wy)[x..x + size] {
            let d = v as f64 - mean;
            sq_dev += d * d;
        }
    }

    WindowStats {
        mean,
        std_dev: (sq_dev / n).sqrt(),
    }
}

/// Summed-area tables of values and squared values over a padded raster
///
/// Entry `(x, y)` holds the sum over the rectangle `[0, x) x [0, y)`, so
/// the tables are one larger than the raster in each direction.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    /// Build both tables in one pass
    pub fn new(padded: &PaddedRaster) -> Self {
        let stride = padded.width() + 1;
        let rows = padded.height() + 1;
        let mut sum = vec![0u64; stride * rows];
        let mut sum_sq = vec![0u64; stride * rows];

        for y in 0..padded.height() {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            let above = y * stride;
            let here = (y + 1) * stride;
            for (x, &v) in padded.row(y).iter().enumerate() {
                let v = v as u64;
                row_sum += v;
                row_sq += v * v;
                sum[here + x + 1] = sum[above + x + 1] + row_sum;
                sum_sq[here + x + 1] = sum_sq[above + x + 1] + row_sq;
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// Sum and sum of squares over the `size x size` window at `(x, y)`
    #[inline]
    pub fn window_moments(&self, x: usize, y: usize, size: usize) -> (u64, u64) {
        let top = y * self.stride;
        let bottom = (y + size) * self.stride;
        let (left, right) = (x, x + size);
        let rect = |t: &[u64]| {
            (t[bottom + right] + t[top + left]) - (t[top + right] + t[bottom + left])
        };
        (rect(self.sum.as_slice()), rect(self.sum_sq.as_slice()))
    }

    /// Window statistics in constant time
    #[inline]
    pub fn window_stats(&self, x: usize, y: usize, size: usize) -> WindowStats {
        let (sum, sum_sq) = self.window_moments(x, y, size);
        WindowStats::from_moments((size * size) as u64, sum, sum_sq)
    }
}
