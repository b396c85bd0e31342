//! Error types for wolf_threshold

use thiserror::Error;

/// Errors reported by grayscale reduction, binarization and the image tools
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed raster: wrong channel count, zero dimension or a buffer
    /// whose length does not match its dimensions
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Window size, `k` or batching parameters that cannot be used
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The caller raised the cancellation flag between row batches
    #[error("binarization cancelled after {rows_done} of {rows_total} rows")]
    Cancelled {
        /// Rows fully written before the flag was observed
        rows_done: usize,
        /// Rows in the requested output
        rows_total: usize,
    },

    /// Image decoding or encoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for wolf_threshold operations
pub type Result<T> = std::result::Result<T, Error>;
