//! wolf_threshold - adaptive binarization with Wolf's local thresholding
//!
//! RGB input is reduced to luminance with fixed 0.299/0.587/0.114 weights,
//! then every pixel is compared against a threshold built from the mean and
//! deviation of its reflect-padded neighbourhood and the deviation of the
//! whole image.
//!
//! ```
//! use wolf_threshold::{Raster, WolfConfig, binarize_rgb};
//!
//! let rgb = Raster::rgb(2, 2, vec![0, 0, 0, 255, 255, 255, 255, 255, 255, 0, 0, 0]).unwrap();
//! let binary = binarize_rgb(&rgb, &WolfConfig::new(3, 0.3)).unwrap();
//! assert_eq!(binary.width(), 2);
//! assert!(binary.as_bytes().iter().all(|&v| v == 0 || v == 255));
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Environment overrides for default parameters
pub mod config;
/// Error and result types
pub mod error;
/// Core data structures (Raster)
pub mod models;
/// Image file loading, saving and summary statistics
pub mod tools;
/// Grayscale reduction, padding, window statistics and binarization
pub mod utils;

pub use error::{Error, Result};
pub use models::Raster;
pub use utils::binarization::{
    BACKGROUND, FOREGROUND, WindowStrategy, WolfConfig, binarize, binarize_cancellable,
    binarize_with,
};
pub use utils::grayscale::to_grayscale;

use std::sync::atomic::AtomicBool;
use utils::grayscale::to_grayscale_parallel;

/// Reduce an RGB raster to luminance and binarize it
///
/// # Arguments
/// * `rgb` - Interleaved RGB raster
/// * `config` - Wolf parameters; `parallel` also applies to the reduction
///
/// # Returns
/// Single-channel raster of `FOREGROUND` / `BACKGROUND` samples
pub fn binarize_rgb(rgb: &Raster, config: &WolfConfig) -> Result<Raster> {
    // Reject bad parameters before spending time on the reduction
    config.validate(rgb.width(), rgb.height())?;
    let gray = reduce(rgb, config)?;
    binarize_with(&gray, config)
}

fn reduce(rgb: &Raster, config: &WolfConfig) -> Result<Raster> {
    if config.parallel {
        to_grayscale_parallel(rgb)
    } else {
        to_grayscale(rgb)
    }
}

/// Reusable binarizer holding a configuration and a cancellation flag
///
/// The flag can be raised from another thread through [`Binarizer::cancel`];
/// a running call stops at its next row batch.
pub struct Binarizer {
    config: WolfConfig,
    cancel: AtomicBool,
}

impl Binarizer {
    /// Create a binarizer with default settings (window 7, k 0.3)
    pub fn new() -> Self {
        Self::with_config(WolfConfig::default())
    }

    /// Create a binarizer with explicit settings
    pub fn with_config(config: WolfConfig) -> Self {
        Self {
            config,
            cancel: AtomicBool::new(false),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &WolfConfig {
        &self.config
    }

    /// Binarize a luminance raster
    pub fn binarize(&self, gray: &Raster) -> Result<Raster> {
        binarize_cancellable(gray, &self.config, &self.cancel)
    }

    /// Reduce and binarize an RGB raster
    pub fn binarize_rgb(&self, rgb: &Raster) -> Result<Raster> {
        self.config.validate(rgb.width(), rgb.height())?;
        let gray = reduce(rgb, &self.config)?;
        self.binarize(&gray)
    }

    /// Ask in-flight and future calls to stop
    pub fn cancel(&self) {
        self.cancel.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    /// Clear a previous cancellation
    pub fn reset(&self) {
        self.cancel.store(false, std::sync::atomic::Ordering::Relaxed);
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new()
    }
}
