//! Wolf adaptive binarization
//!
//! For every pixel the threshold is
//!
//! ```text
//! T = m * (1 + k * (s / S - 1))
//! ```
//!
//! with `m`, `s` the mean and deviation of the `window_size x window_size`
//! neighbourhood (read from the reflect-padded image, never clipped) and `S`
//! the deviation of the whole image. A pixel is foreground (255) when it is
//! strictly brighter than `T`; ties are background (0).
//!
//! On a flat image `S` is zero and the formula divides by zero. In that case
//! `s / S` is taken as 1, which makes `T` the local mean, and because the
//! comparison is strict a flat image comes out entirely background. This
//! guard is a deliberate departure from the bare formula.
//!
//! Re-binarizing a binary output is not expected to reproduce it.

use crate::config;
use crate::error::{Error, Result};
use crate::models::Raster;
use crate::utils::padding::{PaddedRaster, reflect_pad};
use crate::utils::statistics::{IntegralImage, WindowStats, global_stats, window_stats_naive};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Output value for pixels above their threshold
pub const FOREGROUND: u8 = 255;
/// Output value for pixels at or below their threshold
pub const BACKGROUND: u8 = 0;

/// How window statistics are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowStrategy {
    /// Recompute every window from its samples, O(window_size^2) per pixel
    Naive,
    /// Constant-time lookups in summed-area tables
    #[default]
    Integral,
}

/// Parameters for Wolf binarization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WolfConfig {
    /// Odd side length of the square window
    pub window_size: usize,
    /// Weight of the local contrast term
    pub k: f64,
    /// Window statistics backend
    pub strategy: WindowStrategy,
    /// Spread rows across the rayon pool
    pub parallel: bool,
    /// Rows between cancellation checks
    pub row_batch: usize,
}

impl Default for WolfConfig {
    fn default() -> Self {
        Self {
            window_size: config::DEFAULT_WINDOW_SIZE,
            k: config::DEFAULT_K,
            strategy: WindowStrategy::default(),
            parallel: false,
            row_batch: config::DEFAULT_ROW_BATCH,
        }
    }
}

impl WolfConfig {
    /// Config with the given window and `k`, other fields at their defaults
    pub fn new(window_size: usize, k: f64) -> Self {
        Self {
            window_size,
            k,
            ..Self::default()
        }
    }

    /// Defaults overridden by `WOLF_WINDOW_SIZE`, `WOLF_K` and `WOLF_ROW_BATCH`
    pub fn from_env() -> Self {
        Self {
            window_size: config::window_size(),
            k: config::k(),
            row_batch: config::row_batch(),
            ..Self::default()
        }
    }

    /// Turn on row parallelism when the image is large enough to benefit
    pub fn for_image(mut self, width: usize, height: usize) -> Self {
        self.parallel = width.saturating_mul(height) >= config::parallel_min_pixels();
        self
    }

    /// Replace the window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Replace `k`
    pub fn with_k(mut self, k: f64) -> Self {
        self.k = k;
        self
    }

    /// Select the window statistics backend
    pub fn with_strategy(mut self, strategy: WindowStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable row parallelism
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Rows between cancellation checks
    pub fn with_row_batch(mut self, row_batch: usize) -> Self {
        self.row_batch = row_batch;
        self
    }

    /// Padding depth on each side
    pub fn half(&self) -> usize {
        self.window_size / 2
    }

    /// Check the parameters against an image of the given size
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(Error::InvalidParameter(format!(
                "window size must be odd and positive, got {}",
                self.window_size
            )));
        }
        if !self.k.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "k must be finite, got {}",
                self.k
            )));
        }
        if self.row_batch == 0 {
            return Err(Error::InvalidParameter("row batch must be positive".into()));
        }
        if self.window_size > 1 && (width < 2 || height < 2) {
            return Err(Error::InvalidParameter(format!(
                "window size {} needs at least 2x2 pixels to mirror, image is {}x{}",
                self.window_size, width, height
            )));
        }
        let limit = config::max_window_size();
        if self.window_size > limit {
            return Err(Error::InvalidParameter(format!(
                "window size {} exceeds the limit of {}",
                self.window_size, limit
            )));
        }
        let pad = self.half() * 2;
        let padded_len = width
            .checked_add(pad)
            .zip(height.checked_add(pad))
            .and_then(|(w, h)| w.checked_mul(h));
        if padded_len.is_none() || self.window_size.checked_mul(self.window_size).is_none() {
            return Err(Error::InvalidParameter(format!(
                "window size {} overflows the padded {}x{} image",
                self.window_size, width, height
            )));
        }
        Ok(())
    }
}

/// Wolf threshold for one window
///
/// A zero global deviation is treated as `s / S == 1`.
#[inline]
pub fn wolf_threshold(stats: WindowStats, global_std: f64, k: f64) -> f64 {
    let ratio = if global_std == 0.0 {
        1.0
    } else {
        stats.std_dev / global_std
    };
    stats.mean * (1.0 + k * (ratio - 1.0))
}

/// Binarize a luminance raster with Wolf's method
///
/// # Arguments
/// * `gray` - Single-channel raster
/// * `window_size` - Odd window side length (7 in the reference usage)
/// * `k` - Contrast weight (0.3 in the reference usage)
///
/// # Returns
/// Raster of the same size holding only `FOREGROUND` and `BACKGROUND`
pub fn binarize(gray: &Raster, window_size: usize, k: f64) -> Result<Raster> {
    binarize_with(gray, &WolfConfig::new(window_size, k))
}

/// Binarize with full control over strategy and parallelism
pub fn binarize_with(gray: &Raster, config: &WolfConfig) -> Result<Raster> {
    run(gray, config, None)
}

/// Binarize, checking `cancel` before every batch of rows
///
/// Returns `Error::Cancelled` as soon as the flag is observed set; no
/// partial output is returned.
pub fn binarize_cancellable(
    gray: &Raster,
    config: &WolfConfig,
    cancel: &AtomicBool,
) -> Result<Raster> {
    run(gray, config, Some(cancel))
}

enum WindowSource<'a> {
    Naive(&'a PaddedRaster),
    Integral(IntegralImage),
}

impl WindowSource<'_> {
    #[inline]
    fn stats(&self, x: usize, y: usize, size: usize) -> WindowStats {
        match self {
            WindowSource::Naive(padded) => window_stats_naive(padded, x, y, size),
            WindowSource::Integral(integral) => integral.window_stats(x, y, size),
        }
    }
}

struct RowContext<'a> {
    gray: &'a Raster,
    source: WindowSource<'a>,
    window_size: usize,
    global_std: f64,
    k: f64,
}

impl RowContext<'_> {
    fn fill_row(&self, y: usize, out: &mut [u8]) {
        let width = out.len();
        let src = &self.gray.as_bytes()[y * width..(y + 1) * width];
        for (x, (dst, &value)) in out.iter_mut().zip(src).enumerate() {
            let stats = self.source.stats(x, y, self.window_size);
            let threshold = wolf_threshold(stats, self.global_std, self.k);
            *dst = if value as f64 > threshold {
                FOREGROUND
            } else {
                BACKGROUND
            };
        }
    }
}

fn run(gray: &Raster, config: &WolfConfig, cancel: Option<&AtomicBool>) -> Result<Raster> {
    gray.expect_channels(1)?;
    let (width, height) = (gray.width(), gray.height());
    config.validate(width, height)?;

    let global = global_stats(gray.as_bytes());
    if global.std_dev == 0.0 {
        log::debug!(
            "flat {}x{} image (value {}), thresholding against the local mean",
            width,
            height,
            global.mean
        );
    }

    let padded = reflect_pad(gray, config.half())?;
    let source = match config.strategy {
        WindowStrategy::Naive => WindowSource::Naive(&padded),
        WindowStrategy::Integral => WindowSource::Integral(IntegralImage::new(&padded)),
    };
    let ctx = RowContext {
        gray,
        source,
        window_size: config.window_size,
        global_std: global.std_dev,
        k: config.k,
    };

    let mut output = vec![BACKGROUND; width * height];
    let batch_len = width.saturating_mul(config.row_batch);
    for (batch_idx, batch) in output.chunks_mut(batch_len).enumerate() {
        let first_row = batch_idx * config.row_batch;
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            log::debug!("binarization cancelled at row {}/{}", first_row, height);
            return Err(Error::Cancelled {
                rows_done: first_row,
                rows_total: height,
            });
        }

        if config.parallel {
            batch
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(i, row)| ctx.fill_row(first_row + i, row));
        } else {
            for (i, row) in batch.chunks_mut(width).enumerate() {
                ctx.fill_row(first_row + i, row);
            }
        }
        log::trace!(
            "rows {}..{} of {} done",
            first_row,
            first_row.saturating_add(config.row_batch).min(height),
            height
        );
    }

    let foreground = output.iter().filter(|&&v| v == FOREGROUND).count();
    log::debug!(
        "wolf binarize {}x{} window={} k={} S={:.3} strategy={:?} parallel={}: {} foreground pixels",
        width,
        height,
        config.window_size,
        config.k,
        global.std_dev,
        config.strategy,
        config.parallel,
        foreground
    );

    Raster::gray(width, height, output)
}
