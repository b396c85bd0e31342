//! Image processing building blocks
//!
//! - Grayscale conversion (RGB to truncated luminance)
//! - Reflect padding (mirror without repeating the edge)
//! - Window statistics (naive and summed-area tables)
//! - Binarization (Wolf's method)

pub mod binarization;
pub mod grayscale;
pub mod padding;
pub mod statistics;
